//! Places tracker route handlers.
//!
//! Thin JSON wrappers over [`UserPlacesContext`]. Every mutation returns
//! the post-refetch collection plus the notices that operation produced,
//! handed back by value so concurrent requests against the same session
//! never see each other's toasts. Clients render the canonical state and
//! show the toasts without a second round-trip.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use musafir_core::{PlaceDetails, PlaceId, UserPlacesCollection};
use musafir_places::{Notice, UserPlacesContext};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Response envelope for every tracker endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacesResponse {
    /// The current collection, freshly refetched.
    pub places: UserPlacesCollection,
    /// Whether a fetch is still in flight.
    pub loading: bool,
    /// Transient notices produced by this request.
    pub notices: Vec<Notice>,
}

impl PlacesResponse {
    fn from_context(context: &UserPlacesContext, notices: Vec<Notice>) -> Self {
        Self {
            places: context.collection(),
            loading: context.loading(),
            notices,
        }
    }
}

/// Body for marking a place visited.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddVisitedRequest {
    /// Catalogue details of the place.
    pub place: PlaceDetails,
    /// Visit date; defaults to now.
    #[serde(default)]
    pub visited_date: Option<DateTime<Utc>>,
}

/// Body for adding a place to the wishlist.
#[derive(Debug, Deserialize)]
pub struct AddWishlistRequest {
    /// Catalogue details of the place.
    pub place: PlaceDetails,
}

/// Body for moving a wishlist entry to visited.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    /// Visit date; defaults to now.
    #[serde(default)]
    pub visited_date: Option<DateTime<Utc>>,
}

/// `GET /api/places`
#[instrument(skip_all, fields(user = %user.uid))]
pub async fn get_places(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    Ok(Json(PlacesResponse::from_context(&context, Vec::new())))
}

/// `POST /api/places/refresh`
#[instrument(skip_all, fields(user = %user.uid))]
pub async fn refresh(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let notices = context.refresh().await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}

/// `POST /api/places/visited`
#[instrument(skip_all, fields(user = %user.uid))]
pub async fn add_visited(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AddVisitedRequest>,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let notices = context.add_to_visited(body.place, body.visited_date).await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}

/// `DELETE /api/places/visited/{id}`
#[instrument(skip_all, fields(user = %user.uid, place = %id))]
pub async fn remove_visited(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let notices = context.remove_from_visited(PlaceId::new(id)).await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}

/// `POST /api/places/wishlist`
#[instrument(skip_all, fields(user = %user.uid))]
pub async fn add_wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(body): Json<AddWishlistRequest>,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let notices = context.add_to_wishlist(body.place).await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}

/// `DELETE /api/places/wishlist/{id}`
#[instrument(skip_all, fields(user = %user.uid, place = %id))]
pub async fn remove_wishlist(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let notices = context.remove_from_wishlist(PlaceId::new(id)).await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}

/// `POST /api/places/wishlist/{id}/visited`
#[instrument(skip_all, fields(user = %user.uid, place = %id))]
pub async fn move_to_visited(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    body: Option<Json<MoveRequest>>,
) -> Result<Json<PlacesResponse>> {
    let context = state.context_for(&user.uid).await;
    let visited_date = body.map(|Json(b)| b.visited_date).unwrap_or_default();
    let notices = context
        .move_from_wishlist_to_visited(PlaceId::new(id), visited_date)
        .await;
    Ok(Json(PlacesResponse::from_context(&context, notices)))
}
