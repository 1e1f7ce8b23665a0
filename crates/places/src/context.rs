//! Session-scoped reactive holder for the user's places.
//!
//! The UI layer depends on exactly this surface: five mutations, two
//! queries, a manual refresh, the collection snapshot, and the loading
//! flag. Mutations never patch state optimistically; every one ends in a
//! full refetch so the UI always reflects the sync service's own notion
//! of truth.
//!
//! Mutations are serialized behind a single in-flight gate per session.
//! The original UI disabled buttons ad hoc per call-site; the gate makes
//! the same guarantee in one place, so a rapid double-click becomes two
//! ordered operations (the second usually a no-op) instead of a race.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::sync::broadcast;

use musafir_core::{PlaceDetails, PlaceId, UserPlacesCollection};

use crate::notify::{Notice, NoticeHub};
use crate::sync::{FetchSource, SyncOutcome, SyncService};

/// The application-wide state holder for one authenticated session.
pub struct UserPlacesContext {
    service: SyncService,
    collection: RwLock<UserPlacesCollection>,
    loading: AtomicBool,
    mutation_gate: Mutex<()>,
    notices: NoticeHub,
}

impl UserPlacesContext {
    /// Create a context over a sync service. The collection starts empty
    /// until the first [`refresh`](Self::refresh).
    #[must_use]
    pub fn new(service: SyncService) -> Self {
        Self {
            service,
            collection: RwLock::new(UserPlacesCollection::empty()),
            loading: AtomicBool::new(false),
            mutation_gate: Mutex::new(()),
            notices: NoticeHub::new(),
        }
    }

    /// Snapshot of the current collection.
    #[must_use]
    pub fn collection(&self) -> UserPlacesCollection {
        self.collection
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Pure lookup over the in-memory collection; no IO.
    #[must_use]
    pub fn is_visited(&self, id: &PlaceId) -> bool {
        self.collection
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_visited(id)
    }

    /// Pure lookup over the in-memory collection; no IO.
    #[must_use]
    pub fn is_wishlisted(&self, id: &PlaceId) -> bool {
        self.collection
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .is_wishlisted(id)
    }

    /// Subscribe to the transient notices this context emits.
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Refetch the canonical collection and swap it in.
    ///
    /// A degraded read (remote unreachable, mirror served) surfaces one
    /// informational notice explaining the likely cause. Notices are
    /// returned by value so each caller gets exactly the notices its own
    /// operation produced; the broadcast channel carries the same notices
    /// for passive listeners.
    pub async fn refresh(&self) -> Vec<Notice> {
        self.loading.store(true, Ordering::SeqCst);
        let result = self.service.fetch_all().await;

        let mut notices = Vec::new();
        if let FetchSource::LocalFallback(err) = &result.source {
            let message = if err.is_permission_denied() {
                "You don't have permission to sync places right now"
            } else {
                "Couldn't reach the server; showing places saved on this device"
            };
            notices.push(self.notices.info(message));
        }

        *self
            .collection
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = result.collection;
        self.loading.store(false, Ordering::SeqCst);
        notices
    }

    /// Mark a place as visited.
    pub async fn add_to_visited(
        &self,
        details: PlaceDetails,
        visited_date: Option<DateTime<Utc>>,
    ) -> Vec<Notice> {
        let _gate = self.mutation_gate.lock().await;
        let outcome = self.service.add_visited(&details, visited_date).await;
        self.finish(outcome, "Added to visited places").await
    }

    /// Add a place to the wishlist.
    pub async fn add_to_wishlist(&self, details: PlaceDetails) -> Vec<Notice> {
        let _gate = self.mutation_gate.lock().await;
        let outcome = self.service.add_wishlist(&details).await;
        self.finish(outcome, "Added to wishlist").await
    }

    /// Remove a place from the visited list.
    pub async fn remove_from_visited(&self, id: PlaceId) -> Vec<Notice> {
        let _gate = self.mutation_gate.lock().await;
        let outcome = self.service.remove_visited(&id).await;
        self.finish(outcome, "Removed from visited places").await
    }

    /// Remove a place from the wishlist.
    pub async fn remove_from_wishlist(&self, id: PlaceId) -> Vec<Notice> {
        let _gate = self.mutation_gate.lock().await;
        let outcome = self.service.remove_wishlist(&id).await;
        self.finish(outcome, "Removed from wishlist").await
    }

    /// Move a place from the wishlist to the visited list.
    pub async fn move_from_wishlist_to_visited(
        &self,
        id: PlaceId,
        visited_date: Option<DateTime<Utc>>,
    ) -> Vec<Notice> {
        let _gate = self.mutation_gate.lock().await;
        let outcome = self
            .service
            .move_wishlist_to_visited(&id, visited_date)
            .await;
        self.finish(outcome, "Marked as visited").await
    }

    /// Shared mutation tail: emit the outcome toast, refetch, and hand
    /// back everything this operation produced, in order.
    async fn finish(&self, outcome: SyncOutcome, success_message: &str) -> Vec<Notice> {
        let mut notices: Vec<Notice> =
            self.notify(outcome, success_message).into_iter().collect();
        notices.extend(self.refresh().await);
        notices
    }

    /// Listen for auth-state transitions: refetch on sign-in or user
    /// change, revert to empty lists on sign-out.
    ///
    /// The task ends when the auth provider is dropped.
    pub fn spawn_auth_listener(self: &std::sync::Arc<Self>) -> tokio::task::JoinHandle<()> {
        let ctx = std::sync::Arc::clone(self);
        let mut rx = ctx.service.auth().subscribe();

        tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let signed_in = rx.borrow_and_update().is_some();
                if signed_in {
                    ctx.refresh().await;
                } else {
                    *ctx.collection
                        .write()
                        .unwrap_or_else(std::sync::PoisonError::into_inner) =
                        UserPlacesCollection::empty();
                    ctx.loading.store(false, Ordering::SeqCst);
                }
            }
        })
    }

    fn notify(&self, outcome: SyncOutcome, success_message: &str) -> Option<Notice> {
        match outcome {
            SyncOutcome::Applied(_) => Some(self.notices.success(success_message)),
            // No-ops stay silent; the state already says what the user asked for.
            SyncOutcome::NoOp => None,
            SyncOutcome::Declined => Some(self.notices.info("Sign in to save places")),
            SyncOutcome::Failed => Some(self.notices.error("Could not save your change")),
        }
    }
}
