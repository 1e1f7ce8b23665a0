//! End-to-end runs over the file-backed mirror store, including a
//! process-restart simulation: a fresh stack pointed at the same mirror
//! directory still serves the user's places while the remote is down.

use std::sync::Arc;

use musafir_core::{PlaceId, UserId};
use musafir_integration_tests::{FlakyRemote, place};
use musafir_places::{
    AuthProvider, FetchSource, JsonFileStore, LocalStore, RemoteStore, SessionAuth, SyncService,
};

fn file_backed_service(
    dir: &std::path::Path,
    remote: &Arc<FlakyRemote>,
) -> SyncService {
    let local = JsonFileStore::new(dir).expect("mirror dir");
    SyncService::new(
        Arc::clone(remote) as Arc<dyn RemoteStore>,
        Arc::new(local) as Arc<dyn LocalStore>,
        Arc::new(SessionAuth::signed_in(UserId::new("traveler-1"))) as Arc<dyn AuthProvider>,
    )
}

#[tokio::test]
async fn mirror_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = Arc::new(FlakyRemote::new());

    // First "process": sync a place and let the fetch refresh the mirror.
    let service = file_backed_service(dir.path(), &remote);
    service.add_visited(&place("hawa-mahal", "Hawa Mahal"), None).await;
    service.fetch_all().await;
    drop(service);

    // Second "process" over the same directory, with the remote down.
    remote.set_failing(true);
    let service = file_backed_service(dir.path(), &remote);
    let result = service.fetch_all().await;
    assert!(matches!(result.source, FetchSource::LocalFallback(_)));
    assert!(result.collection.is_visited(&PlaceId::new("hawa-mahal")));
}

#[tokio::test]
async fn offline_writes_land_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = Arc::new(FlakyRemote::new());
    remote.set_failing(true);

    let service = file_backed_service(dir.path(), &remote);
    assert!(service
        .add_wishlist(&place("amber-fort", "Amber Fort"))
        .await
        .applied());

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read mirror dir")
        .collect();
    assert!(!files.is_empty());

    let result = service.fetch_all().await;
    assert!(result.collection.is_wishlisted(&PlaceId::new("amber-fort")));
}

#[tokio::test]
async fn corrupt_mirror_file_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let remote = Arc::new(FlakyRemote::new());

    let service = file_backed_service(dir.path(), &remote);
    service.add_visited(&place("hawa-mahal", "Hawa Mahal"), None).await;
    service.fetch_all().await;

    // Corrupt every mirror file, then lose the remote.
    for entry in std::fs::read_dir(dir.path()).expect("read mirror dir") {
        let entry = entry.expect("dir entry");
        std::fs::write(entry.path(), b"{not json").expect("corrupt file");
    }
    remote.set_failing(true);

    // Degraded, but never an error: corrupt keys read as empty lists.
    let result = service.fetch_all().await;
    assert!(matches!(result.source, FetchSource::LocalFallback(_)));
    assert!(result.collection.visited.is_empty());
    assert!(result.collection.wishlist.is_empty());
}
