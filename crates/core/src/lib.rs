//! Musafir Core - Shared types library.
//!
//! This crate provides common types used across all Musafir components:
//! - `places` - User-places sync layer (visited/wishlist tracker)
//! - `server` - Public JSON API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - IDs, place records, and the per-user collection aggregate
//! - [`timestamp`] - The canonical timestamp boundary for remote documents

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod timestamp;
pub mod types;

pub use types::*;
