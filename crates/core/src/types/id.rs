//! Newtype IDs for type-safe entity references.
//!
//! Both the auth provider and the place catalogue use string identifiers,
//! so these wrappers exist to prevent accidentally mixing a user id with a
//! place id, not to impose any particular format.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use musafir_core::define_string_id;
/// define_string_id!(SessionId);
///
/// let id = SessionId::new("abc123");
/// assert_eq!(id.as_str(), "abc123");
/// ```
#[macro_export]
macro_rules! define_string_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_string_id!(UserId);

/// Stable identifier for a place in a user's lists.
///
/// Catalogue entries that carry an explicit id use it verbatim; entries
/// without one get a deterministic slug derived from the state name and
/// the place name, so the same place always maps to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceId(String);

impl PlaceId {
    /// Create a place ID from an explicit identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive a place ID from the state name and place name.
    ///
    /// Lowercases both names and collapses every run of non-alphanumeric
    /// characters to a single `-`, e.g. `("Uttar Pradesh", "Taj Mahal")`
    /// becomes `uttar-pradesh-taj-mahal`.
    #[must_use]
    pub fn derive(state_name: &str, place_name: &str) -> Self {
        let mut slug = String::with_capacity(state_name.len() + place_name.len() + 1);
        let mut pending_dash = false;

        for c in state_name.chars().chain("-".chars()).chain(place_name.chars()) {
            if c.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                for lower in c.to_lowercase() {
                    slug.push(lower);
                }
            } else {
                pending_dash = true;
            }
        }

        Self(slug)
    }

    /// Get the underlying string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PlaceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PlaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PlaceId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_basic() {
        let id = PlaceId::derive("Uttar Pradesh", "Taj Mahal");
        assert_eq!(id.as_str(), "uttar-pradesh-taj-mahal");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = PlaceId::derive("Kerala", "Munnar Tea Gardens");
        let b = PlaceId::derive("Kerala", "Munnar Tea Gardens");
        assert_eq!(a, b);
    }

    #[test]
    fn test_derive_collapses_punctuation() {
        let id = PlaceId::derive("Tamil Nadu", "Meenakshi  Amman -- Temple!");
        assert_eq!(id.as_str(), "tamil-nadu-meenakshi-amman-temple");
    }

    #[test]
    fn test_derive_no_leading_or_trailing_dash() {
        let id = PlaceId::derive("  Goa ", " Baga Beach ");
        assert_eq!(id.as_str(), "goa-baga-beach");
    }

    #[test]
    fn test_ids_do_not_mix() {
        let user = UserId::new("u1");
        let place = PlaceId::new("u1");
        // Different types with the same payload are only comparable as strings.
        assert_eq!(user.as_str(), place.as_str());
    }

    #[test]
    fn test_serde_transparent() {
        let id = PlaceId::new("goa-baga-beach");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"goa-baga-beach\"");
        let back: PlaceId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, id);
    }
}
