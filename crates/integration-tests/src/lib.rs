//! Integration tests for Musafir.
//!
//! These tests exercise the user-places sync layer end to end, in
//! process: a real [`SyncService`] and [`UserPlacesContext`] wired to a
//! controllable remote store, so the remote-first-with-mirror-fallback
//! behavior can be driven through outages and recoveries without a
//! network.
//!
//! # Test Categories
//!
//! - `sync_fallback` - Remote outage and recovery behavior
//! - `sync_lists` - Visited/wishlist semantics across both backends
//! - `context_session` - The session context: refetch, notices, auth
//! - `local_mirror` - End-to-end runs over the file-backed mirror
//!
//! Run with: cargo test -p musafir-integration-tests

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use musafir_core::{PlaceDetails, PlaceId, UserId, UserPlacesCollection};
use musafir_places::{
    AuthProvider, LocalStore, MemoryStore, RemoteStore, RemoteStoreError, SessionAuth,
    SyncService, UserPlacesContext,
};

/// In-memory document store with a failure switch.
///
/// Holds at most one user document, which is all a single-session test
/// needs. While `failing` is set every call returns a 503-shaped error
/// without touching the document.
#[derive(Default)]
pub struct FlakyRemote {
    document: std::sync::Mutex<Option<UserPlacesCollection>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the outage switch.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total store calls, including failed ones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the stored document, if one exists.
    #[must_use]
    pub fn document(&self) -> Option<UserPlacesCollection> {
        self.document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn check(&self) -> Result<(), RemoteStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteStoreError::Api {
                status: 503,
                message: "service unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FlakyRemote {
    async fn ensure_document(&self, _user: &UserId) -> Result<(), RemoteStoreError> {
        self.check()?;
        let mut doc = self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if doc.is_none() {
            *doc = Some(UserPlacesCollection::empty());
        }
        Ok(())
    }

    async fn fetch(&self, _user: &UserId) -> Result<UserPlacesCollection, RemoteStoreError> {
        self.check()?;
        Ok(self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
            .unwrap_or_default())
    }

    async fn store(
        &self,
        _user: &UserId,
        places: &UserPlacesCollection,
    ) -> Result<(), RemoteStoreError> {
        self.check()?;
        *self
            .document
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(places.clone());
        Ok(())
    }
}

/// One fully wired sync stack with handles to every collaborator.
pub struct Harness {
    pub remote: Arc<FlakyRemote>,
    pub local: Arc<MemoryStore>,
    pub auth: Arc<SessionAuth>,
    pub service: SyncService,
}

impl Harness {
    /// A stack with a signed-in user.
    #[must_use]
    pub fn signed_in(uid: &str) -> Self {
        Self::with_auth(SessionAuth::signed_in(UserId::new(uid)))
    }

    /// A stack with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::with_auth(SessionAuth::new())
    }

    fn with_auth(auth: SessionAuth) -> Self {
        let remote = Arc::new(FlakyRemote::new());
        let local = Arc::new(MemoryStore::new());
        let auth = Arc::new(auth);
        let service = SyncService::new(
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            Arc::clone(&local) as Arc<dyn LocalStore>,
            Arc::clone(&auth) as Arc<dyn AuthProvider>,
        );
        Self {
            remote,
            local,
            auth,
            service,
        }
    }

    /// A session context over this stack's service.
    #[must_use]
    pub fn context(&self) -> Arc<UserPlacesContext> {
        Arc::new(UserPlacesContext::new(self.service.clone()))
    }
}

/// A well-formed catalog entry for tests.
#[must_use]
pub fn place(id: &str, name: &str) -> PlaceDetails {
    PlaceDetails {
        place_id: Some(PlaceId::new(id)),
        place_name: name.to_owned(),
        state_id: "rj".to_owned(),
        state_name: "Rajasthan".to_owned(),
        image_url: format!("https://images.musafir.example/{id}.jpg"),
        location: "Jaipur".to_owned(),
    }
}
