//! Core types for Musafir.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod place;

pub use id::{PlaceId, UserId};
pub use place::{PlaceDetails, PlaceList, UserPlace, UserPlacesCollection};
