//! Place records and the per-user collection aggregate.
//!
//! Field names serialize in camelCase because the remote document store
//! holds these records in the shape the web client originally wrote them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timestamp;
use crate::types::PlaceId;

/// The two per-user lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceList {
    /// Places the user has physically visited.
    Visited,
    /// Places the user intends to visit.
    Wishlist,
}

impl PlaceList {
    /// Stable key fragment used by the local mirror store.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Visited => "visited",
            Self::Wishlist => "wishlist",
        }
    }
}

/// Catalogue data a caller supplies when adding a place to a list.
///
/// `place_id` is optional; when absent the id is derived from the state
/// name and place name so the same catalogue entry always maps to the
/// same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    /// Explicit place identifier, if the catalogue carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<PlaceId>,
    /// Display name of the place.
    pub place_name: String,
    /// Identifier of the state the place belongs to.
    pub state_id: String,
    /// Display name of the state.
    pub state_name: String,
    /// Catalogue image URL.
    #[serde(default)]
    pub image_url: String,
    /// Human-readable location (city / district).
    #[serde(default)]
    pub location: String,
}

impl PlaceDetails {
    /// Resolve the effective place id for this entry.
    #[must_use]
    pub fn resolved_id(&self) -> PlaceId {
        self.place_id
            .clone()
            .unwrap_or_else(|| PlaceId::derive(&self.state_name, &self.place_name))
    }
}

/// One place in a user's personal list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPlace {
    /// Stable place identifier.
    pub place_id: PlaceId,
    /// Display name of the place.
    pub place_name: String,
    /// Identifier of the state the place belongs to.
    pub state_id: String,
    /// Display name of the state.
    pub state_name: String,
    /// Catalogue image URL.
    #[serde(default)]
    pub image_url: String,
    /// Human-readable location.
    #[serde(default)]
    pub location: String,
    /// When the record was first created. Never mutated afterwards.
    #[serde(with = "timestamp")]
    pub added_on: DateTime<Utc>,
    /// Visit date; present only on visited-list entries.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub visited_date: Option<DateTime<Utc>>,
    /// Star rating attached later by the review subsystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_rating: Option<u8>,
    /// Review text attached later by the review subsystem.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_review: Option<String>,
}

impl UserPlace {
    /// Build a record from catalogue details, stamping `added_on` now.
    #[must_use]
    pub fn from_details(details: &PlaceDetails, visited_date: Option<DateTime<Utc>>) -> Self {
        Self {
            place_id: details.resolved_id(),
            place_name: details.place_name.clone(),
            state_id: details.state_id.clone(),
            state_name: details.state_name.clone(),
            image_url: details.image_url.clone(),
            location: details.location.clone(),
            added_on: Utc::now(),
            visited_date,
            user_rating: None,
            user_review: None,
        }
    }
}

/// The per-user aggregate: visited places and wishlist places.
///
/// Both lists keep insertion order; no sort is imposed by this layer.
/// A given place id appears in at most one of the two lists at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPlacesCollection {
    /// Visited places, each carrying a visit date.
    #[serde(default)]
    pub visited: Vec<UserPlace>,
    /// Wishlist places, each carrying only an added date.
    #[serde(default)]
    pub wishlist: Vec<UserPlace>,
}

impl UserPlacesCollection {
    /// An empty pair of lists.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the place is in the visited list.
    #[must_use]
    pub fn is_visited(&self, id: &PlaceId) -> bool {
        self.visited.iter().any(|p| &p.place_id == id)
    }

    /// Whether the place is in the wishlist.
    #[must_use]
    pub fn is_wishlisted(&self, id: &PlaceId) -> bool {
        self.wishlist.iter().any(|p| &p.place_id == id)
    }

    /// Whether the place is in either list.
    #[must_use]
    pub fn contains(&self, id: &PlaceId) -> bool {
        self.is_visited(id) || self.is_wishlisted(id)
    }

    /// Borrow one of the two lists.
    #[must_use]
    pub fn list(&self, which: PlaceList) -> &[UserPlace] {
        match which {
            PlaceList::Visited => &self.visited,
            PlaceList::Wishlist => &self.wishlist,
        }
    }

    /// Check the cross-list invariant: no place id in both lists, and no
    /// duplicate ids within a list.
    #[must_use]
    pub fn invariant_holds(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.visited
            .iter()
            .chain(self.wishlist.iter())
            .all(|p| seen.insert(&p.place_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str) -> UserPlace {
        UserPlace {
            place_id: PlaceId::new(id),
            place_name: "Taj Mahal".to_owned(),
            state_id: "up".to_owned(),
            state_name: "Uttar Pradesh".to_owned(),
            image_url: String::new(),
            location: "Agra".to_owned(),
            added_on: Utc::now(),
            visited_date: None,
            user_rating: None,
            user_review: None,
        }
    }

    #[test]
    fn test_resolved_id_prefers_explicit() {
        let details = PlaceDetails {
            place_id: Some(PlaceId::new("custom-id")),
            place_name: "Taj Mahal".to_owned(),
            state_id: "up".to_owned(),
            state_name: "Uttar Pradesh".to_owned(),
            image_url: String::new(),
            location: "Agra".to_owned(),
        };
        assert_eq!(details.resolved_id().as_str(), "custom-id");
    }

    #[test]
    fn test_resolved_id_derives_when_absent() {
        let details = PlaceDetails {
            place_id: None,
            place_name: "Taj Mahal".to_owned(),
            state_id: "up".to_owned(),
            state_name: "Uttar Pradesh".to_owned(),
            image_url: String::new(),
            location: "Agra".to_owned(),
        };
        assert_eq!(details.resolved_id().as_str(), "uttar-pradesh-taj-mahal");
    }

    #[test]
    fn test_invariant_detects_cross_list_duplicate() {
        let collection = UserPlacesCollection {
            visited: vec![place("p1")],
            wishlist: vec![place("p1")],
        };
        assert!(!collection.invariant_holds());
    }

    #[test]
    fn test_invariant_holds_for_disjoint_lists() {
        let collection = UserPlacesCollection {
            visited: vec![place("p1")],
            wishlist: vec![place("p2")],
        };
        assert!(collection.invariant_holds());
    }

    #[test]
    fn test_camel_case_wire_shape() {
        let json = serde_json::to_value(place("p1")).expect("serialize");
        assert!(json.get("placeId").is_some());
        assert!(json.get("stateName").is_some());
        assert!(json.get("addedOn").is_some());
        // Absent optionals are omitted, matching the original documents.
        assert!(json.get("visitedDate").is_none());
        assert!(json.get("userRating").is_none());
    }

    #[test]
    fn test_collection_tolerates_missing_fields() {
        let collection: UserPlacesCollection =
            serde_json::from_str("{\"visited\": []}").expect("deserialize");
        assert!(collection.wishlist.is_empty());
    }
}
