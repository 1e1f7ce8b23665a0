//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness check
//!
//! # Places tracker (requires bearer token)
//! GET    /api/places                        - Current collection
//! POST   /api/places/refresh                - Force a refetch
//! POST   /api/places/visited                - Mark a place visited
//! DELETE /api/places/visited/{id}           - Remove from visited
//! POST   /api/places/wishlist               - Add to wishlist
//! DELETE /api/places/wishlist/{id}          - Remove from wishlist
//! POST   /api/places/wishlist/{id}/visited  - Move wishlist entry to visited
//!
//! # Travel utilities
//! GET  /api/currency/convert                - Currency conversion
//! ```

pub mod currency;
pub mod places;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/places", get(places::get_places))
        .route("/api/places/refresh", post(places::refresh))
        .route("/api/places/visited", post(places::add_visited))
        .route(
            "/api/places/visited/{id}",
            axum::routing::delete(places::remove_visited),
        )
        .route("/api/places/wishlist", post(places::add_wishlist))
        .route(
            "/api/places/wishlist/{id}",
            axum::routing::delete(places::remove_wishlist),
        )
        .route(
            "/api/places/wishlist/{id}/visited",
            post(places::move_to_visited),
        )
        .route("/api/currency/convert", get(currency::convert))
}
