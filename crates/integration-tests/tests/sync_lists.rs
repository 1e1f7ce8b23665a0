//! Visited/wishlist semantics: the cross-list invariant and the
//! idempotence of every mutation, checked through full round trips.

use chrono::Utc;
use musafir_core::PlaceId;
use musafir_integration_tests::{Harness, place};
use musafir_places::SyncOutcome;

#[tokio::test]
async fn wishlist_add_then_remove_round_trip() {
    let h = Harness::signed_in("traveler-1");
    let id = PlaceId::new("jaisalmer-fort");

    assert!(h
        .service
        .add_wishlist(&place("jaisalmer-fort", "Jaisalmer Fort"))
        .await
        .applied());
    assert!(h.service.fetch_all().await.collection.is_wishlisted(&id));

    assert!(h.service.remove_wishlist(&id).await.applied());
    assert!(!h.service.fetch_all().await.collection.contains(&id));
}

#[tokio::test]
async fn visiting_a_wishlisted_place_moves_it() {
    let h = Harness::signed_in("traveler-1");
    let id = PlaceId::new("city-palace");

    h.service.add_wishlist(&place("city-palace", "City Palace")).await;
    h.service.add_visited(&place("city-palace", "City Palace"), None).await;

    let collection = h.service.fetch_all().await.collection;
    assert!(collection.is_visited(&id));
    assert!(!collection.is_wishlisted(&id));
    assert!(collection.invariant_holds());
}

#[tokio::test]
async fn visited_wins_over_a_later_wishlist_add() {
    let h = Harness::signed_in("traveler-1");
    let id = PlaceId::new("city-palace");

    h.service.add_visited(&place("city-palace", "City Palace"), None).await;
    assert_eq!(
        h.service.add_wishlist(&place("city-palace", "City Palace")).await,
        SyncOutcome::NoOp
    );

    let collection = h.service.fetch_all().await.collection;
    assert!(collection.is_visited(&id));
    assert!(collection.wishlist.is_empty());
}

#[tokio::test]
async fn repeat_adds_do_not_duplicate() {
    let h = Harness::signed_in("traveler-1");

    h.service.add_visited(&place("hawa-mahal", "Hawa Mahal"), None).await;
    assert_eq!(
        h.service.add_visited(&place("hawa-mahal", "Hawa Mahal"), None).await,
        SyncOutcome::NoOp
    );
    h.service.add_wishlist(&place("amber-fort", "Amber Fort")).await;
    assert_eq!(
        h.service.add_wishlist(&place("amber-fort", "Amber Fort")).await,
        SyncOutcome::NoOp
    );

    let collection = h.service.fetch_all().await.collection;
    assert_eq!(collection.visited.len(), 1);
    assert_eq!(collection.wishlist.len(), 1);
}

#[tokio::test]
async fn move_then_remove_leaves_neither_list() {
    let h = Harness::signed_in("traveler-1");
    let id = PlaceId::new("amber-fort");

    h.service.add_wishlist(&place("amber-fort", "Amber Fort")).await;
    assert!(h.service.move_wishlist_to_visited(&id, None).await.applied());
    assert!(h.service.remove_visited(&id).await.applied());

    assert!(!h.service.fetch_all().await.collection.contains(&id));
}

#[tokio::test]
async fn move_keeps_details_and_stamps_visit_date() {
    let h = Harness::signed_in("traveler-1");
    let id = PlaceId::new("amber-fort");

    h.service.add_wishlist(&place("amber-fort", "Amber Fort")).await;
    let visit = Utc::now();
    h.service.move_wishlist_to_visited(&id, Some(visit)).await;

    let collection = h.service.fetch_all().await.collection;
    let entry = collection.visited.first().expect("moved entry");
    assert_eq!(entry.place_name, "Amber Fort");
    assert_eq!(entry.state_name, "Rajasthan");
    assert_eq!(entry.visited_date, Some(visit));
}

#[tokio::test]
async fn mutations_decline_when_signed_out() {
    let h = Harness::signed_out();
    let id = PlaceId::new("hawa-mahal");

    assert_eq!(
        h.service.add_visited(&place("hawa-mahal", "Hawa Mahal"), None).await,
        SyncOutcome::Declined
    );
    assert_eq!(
        h.service.add_wishlist(&place("hawa-mahal", "Hawa Mahal")).await,
        SyncOutcome::Declined
    );
    assert_eq!(h.service.remove_visited(&id).await, SyncOutcome::Declined);
    assert_eq!(h.service.remove_wishlist(&id).await, SyncOutcome::Declined);
    assert_eq!(
        h.service.move_wishlist_to_visited(&id, None).await,
        SyncOutcome::Declined
    );
}
