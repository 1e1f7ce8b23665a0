//! Persistence seams for the sync layer.
//!
//! [`SyncService`](crate::sync::SyncService) only ever talks to these two
//! traits, so tests (and any future backend swap) plug in their own
//! implementations instead of the hosted document store.

use async_trait::async_trait;

use musafir_core::{PlaceList, UserId, UserPlace, UserPlacesCollection};

use crate::error::{LocalStoreError, RemoteStoreError};

/// The hosted, network-accessible per-user backend.
///
/// Authoritative whenever it is reachable.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Ensure a document exists for the user, creating an empty
    /// `{visited: [], wishlist: []}` one if absent, or adding a missing
    /// `places` field to an existing document.
    async fn ensure_document(&self, user: &UserId) -> Result<(), RemoteStoreError>;

    /// Read the user's collection.
    ///
    /// A missing `places` field or non-sequence list coerces to empty;
    /// entries that do not parse are an error (the caller falls back to
    /// the local mirror).
    async fn fetch(&self, user: &UserId) -> Result<UserPlacesCollection, RemoteStoreError>;

    /// Write both lists with a merge-write that leaves unrelated document
    /// fields untouched.
    async fn store(
        &self,
        user: &UserId,
        places: &UserPlacesCollection,
    ) -> Result<(), RemoteStoreError>;
}

/// The local mirror: a key-value shim shaped like browser local storage.
///
/// One string key per (user, list). Synchronous on purpose; the payloads
/// are two small JSON arrays.
pub trait LocalStore: Send + Sync {
    /// Read one list. Returns an empty sequence if the key is absent or
    /// its contents do not parse.
    fn read(&self, user: &UserId, list: PlaceList) -> Vec<UserPlace>;

    /// Overwrite one list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be serialized or written; the
    /// sync layer logs and swallows it.
    fn write(
        &self,
        user: &UserId,
        list: PlaceList,
        places: &[UserPlace],
    ) -> Result<(), LocalStoreError>;
}
