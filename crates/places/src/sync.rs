//! The user-places sync service.
//!
//! Every operation follows the same policy: the remote document store is
//! authoritative when reachable, the local mirror covers for it when not,
//! and nothing here ever returns an error to the caller. Mutations are
//! read-current-state, compute-new-lists, write-whole-lists; the remote
//! store's atomic list-append cannot enforce the cross-list invariant, so
//! a little write amplification buys invariant simplicity.
//!
//! The fallback policy itself lives in exactly two places: [`load`] for
//! the read direction and [`persist`] for the write direction. The five
//! mutations only express list semantics.
//!
//! [`load`]: SyncService::load
//! [`persist`]: SyncService::persist

use std::sync::Arc;

use chrono::{DateTime, Utc};

use musafir_core::{PlaceDetails, PlaceId, PlaceList, UserId, UserPlace, UserPlacesCollection};

use crate::auth::AuthProvider;
use crate::error::RemoteStoreError;
use crate::store::{LocalStore, RemoteStore};

/// Which backend ended up serving a fetch.
#[derive(Debug)]
pub enum FetchSource {
    /// The remote store answered; the mirror was refreshed.
    Remote,
    /// The remote store failed; data came from the local mirror.
    LocalFallback(RemoteStoreError),
    /// No authenticated user; empty lists, no store IO at all.
    NoUser,
}

/// Result of [`SyncService::fetch_all`]. Never an error.
#[derive(Debug)]
pub struct FetchResult {
    /// The current collection, from whichever backend answered.
    pub collection: UserPlacesCollection,
    /// Where it came from, so the UI can explain degraded reads.
    pub source: FetchSource,
}

/// Which backend accepted a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// The remote document store.
    Remote,
    /// The local mirror only; the write will reconcile on a later
    /// successful remote round-trip.
    Local,
}

/// Outcome of a mutation. Never an error; the contract is best effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The mutation took effect on the given backend.
    Applied(Backend),
    /// The mutation was a no-op (already present, or already absent).
    NoOp,
    /// No authenticated user; silently declined.
    Declined,
    /// Both backends rejected the write; logged and swallowed.
    Failed,
}

impl SyncOutcome {
    /// Whether the mutation changed any state.
    #[must_use]
    pub const fn applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Orchestrates reads and writes across the remote document store and the
/// local mirror for the currently signed-in user.
#[derive(Clone)]
pub struct SyncService {
    remote: Arc<dyn RemoteStore>,
    local: Arc<dyn LocalStore>,
    auth: Arc<dyn AuthProvider>,
}

impl SyncService {
    /// Create a service over explicit store and auth collaborators.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        local: Arc<dyn LocalStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            remote,
            local,
            auth,
        }
    }

    /// The auth collaborator this service watches.
    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.auth
    }

    /// Ensure the signed-in user's remote document exists.
    ///
    /// Side effect only. Failures are logged and swallowed so callers can
    /// always proceed to a fallback path.
    pub async fn initialize(&self) {
        let Some(user) = self.auth.current_user() else {
            return;
        };
        if let Err(e) = self.remote.ensure_document(&user).await {
            tracing::warn!(user = %user, error = %e, "Could not ensure remote places document");
        }
    }

    /// Return the current collection.
    ///
    /// With no signed-in user this returns empty lists immediately, with
    /// zero store IO. Otherwise the remote store is tried first; on
    /// success the mirror is refreshed, on any failure the mirror answers.
    pub async fn fetch_all(&self) -> FetchResult {
        let Some(user) = self.auth.current_user() else {
            return FetchResult {
                collection: UserPlacesCollection::empty(),
                source: FetchSource::NoUser,
            };
        };

        self.initialize().await;

        match self.remote.fetch(&user).await {
            Ok(collection) => {
                self.refresh_mirror(&user, &collection);
                FetchResult {
                    collection,
                    source: FetchSource::Remote,
                }
            }
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "Remote fetch failed, using local mirror");
                FetchResult {
                    collection: self.read_mirror(&user),
                    source: FetchSource::LocalFallback(err),
                }
            }
        }
    }

    /// Append to the visited list, evicting any wishlist entry for the
    /// same place. No-op if already visited.
    pub async fn add_visited(
        &self,
        details: &PlaceDetails,
        visited_date: Option<DateTime<Utc>>,
    ) -> SyncOutcome {
        let Some(user) = self.signed_in_user("add_visited") else {
            return SyncOutcome::Declined;
        };
        let id = details.resolved_id();

        let mut collection = self.load(&user).await;
        if collection.is_visited(&id) {
            return SyncOutcome::NoOp;
        }

        collection.wishlist.retain(|p| p.place_id != id);
        let visited_date = Some(visited_date.unwrap_or_else(Utc::now));
        collection
            .visited
            .push(UserPlace::from_details(details, visited_date));

        self.persist(&user, &collection).await
    }

    /// Append to the wishlist. No-op if the place is in either list;
    /// visited takes precedence.
    pub async fn add_wishlist(&self, details: &PlaceDetails) -> SyncOutcome {
        let Some(user) = self.signed_in_user("add_wishlist") else {
            return SyncOutcome::Declined;
        };
        let id = details.resolved_id();

        let mut collection = self.load(&user).await;
        if collection.contains(&id) {
            return SyncOutcome::NoOp;
        }

        collection
            .wishlist
            .push(UserPlace::from_details(details, None));

        self.persist(&user, &collection).await
    }

    /// Drop a place from the visited list. No-op if absent.
    pub async fn remove_visited(&self, id: &PlaceId) -> SyncOutcome {
        self.remove(PlaceList::Visited, id).await
    }

    /// Drop a place from the wishlist. No-op if absent.
    pub async fn remove_wishlist(&self, id: &PlaceId) -> SyncOutcome {
        self.remove(PlaceList::Wishlist, id).await
    }

    /// Move a place from the wishlist to the visited list, stamping a
    /// fresh `added_on` and the given visit date. No-op if the place is
    /// not wishlisted.
    pub async fn move_wishlist_to_visited(
        &self,
        id: &PlaceId,
        visited_date: Option<DateTime<Utc>>,
    ) -> SyncOutcome {
        let Some(user) = self.signed_in_user("move_wishlist_to_visited") else {
            return SyncOutcome::Declined;
        };

        let mut collection = self.load(&user).await;
        let Some(pos) = collection.wishlist.iter().position(|p| &p.place_id == id) else {
            return SyncOutcome::NoOp;
        };

        let entry = collection.wishlist.remove(pos);
        collection.visited.push(UserPlace {
            added_on: Utc::now(),
            visited_date: Some(visited_date.unwrap_or_else(Utc::now)),
            ..entry
        });

        self.persist(&user, &collection).await
    }

    async fn remove(&self, list: PlaceList, id: &PlaceId) -> SyncOutcome {
        let Some(user) = self.signed_in_user("remove") else {
            return SyncOutcome::Declined;
        };

        let mut collection = self.load(&user).await;
        let target = match list {
            PlaceList::Visited => &mut collection.visited,
            PlaceList::Wishlist => &mut collection.wishlist,
        };
        let before = target.len();
        target.retain(|p| &p.place_id != id);
        if target.len() == before {
            return SyncOutcome::NoOp;
        }

        self.persist(&user, &collection).await
    }

    fn signed_in_user(&self, op: &str) -> Option<UserId> {
        let user = self.auth.current_user();
        if user.is_none() {
            // Reached only if the UI failed to gate the action.
            tracing::debug!(op, "Mutation without a signed-in user, declining");
        }
        user
    }

    /// Read-direction fallback policy: remote first, mirror on failure.
    async fn load(&self, user: &UserId) -> UserPlacesCollection {
        match self.remote.fetch(user).await {
            Ok(collection) => collection,
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "Remote read failed, mutating against local mirror");
                self.read_mirror(user)
            }
        }
    }

    /// Write-direction fallback policy: remote first, mirror on failure,
    /// logged no-op when both reject.
    async fn persist(&self, user: &UserId, collection: &UserPlacesCollection) -> SyncOutcome {
        match self.remote.store(user, collection).await {
            Ok(()) => SyncOutcome::Applied(Backend::Remote),
            Err(err) => {
                tracing::warn!(user = %user, error = %err, "Remote write failed, writing local mirror");
                match self.write_mirror(user, collection) {
                    Ok(()) => SyncOutcome::Applied(Backend::Local),
                    Err(local_err) => {
                        tracing::error!(
                            user = %user,
                            remote_error = %err,
                            local_error = %local_err,
                            "Both backends rejected the write"
                        );
                        SyncOutcome::Failed
                    }
                }
            }
        }
    }

    fn read_mirror(&self, user: &UserId) -> UserPlacesCollection {
        UserPlacesCollection {
            visited: self.local.read(user, PlaceList::Visited),
            wishlist: self.local.read(user, PlaceList::Wishlist),
        }
    }

    fn write_mirror(
        &self,
        user: &UserId,
        collection: &UserPlacesCollection,
    ) -> Result<(), crate::error::LocalStoreError> {
        self.local
            .write(user, PlaceList::Visited, &collection.visited)?;
        self.local
            .write(user, PlaceList::Wishlist, &collection.wishlist)
    }

    /// Best-effort mirror refresh after a successful remote read.
    fn refresh_mirror(&self, user: &UserId, collection: &UserPlacesCollection) {
        if let Err(e) = self.write_mirror(user, collection) {
            tracing::warn!(user = %user, error = %e, "Could not refresh local mirror");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::auth::SessionAuth;
    use crate::error::RemoteStoreError;
    use crate::local::MemoryStore;

    /// Remote store over a mutex-held collection, with a failure switch.
    #[derive(Default)]
    struct MockRemote {
        collection: std::sync::Mutex<Option<UserPlacesCollection>>,
        failing: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockRemote {
        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check(&self) -> Result<(), RemoteStoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.load(Ordering::SeqCst) {
                return Err(RemoteStoreError::Api {
                    status: 503,
                    message: "unavailable".to_owned(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteStore for MockRemote {
        async fn ensure_document(&self, _user: &UserId) -> Result<(), RemoteStoreError> {
            self.check()?;
            let mut doc = self.collection.lock().expect("lock");
            if doc.is_none() {
                *doc = Some(UserPlacesCollection::empty());
            }
            Ok(())
        }

        async fn fetch(&self, _user: &UserId) -> Result<UserPlacesCollection, RemoteStoreError> {
            self.check()?;
            Ok(self
                .collection
                .lock()
                .expect("lock")
                .clone()
                .unwrap_or_default())
        }

        async fn store(
            &self,
            _user: &UserId,
            places: &UserPlacesCollection,
        ) -> Result<(), RemoteStoreError> {
            self.check()?;
            *self.collection.lock().expect("lock") = Some(places.clone());
            Ok(())
        }
    }

    /// Local store whose writes always fail.
    struct BrokenLocal;

    impl LocalStore for BrokenLocal {
        fn read(&self, _user: &UserId, _list: PlaceList) -> Vec<UserPlace> {
            Vec::new()
        }

        fn write(
            &self,
            _user: &UserId,
            _list: PlaceList,
            _places: &[UserPlace],
        ) -> Result<(), crate::error::LocalStoreError> {
            Err(crate::error::LocalStoreError::Io(std::io::Error::other(
                "disk full",
            )))
        }
    }

    fn details(id: &str) -> PlaceDetails {
        PlaceDetails {
            place_id: Some(PlaceId::new(id)),
            place_name: "Taj Mahal".to_owned(),
            state_id: "up".to_owned(),
            state_name: "Uttar Pradesh".to_owned(),
            image_url: String::new(),
            location: "Agra".to_owned(),
        }
    }

    fn service_with(remote: Arc<MockRemote>) -> (SyncService, Arc<MemoryStore>) {
        let local = Arc::new(MemoryStore::new());
        let auth = Arc::new(SessionAuth::signed_in(UserId::new("u1")));
        let service = SyncService::new(remote, Arc::clone(&local) as Arc<dyn LocalStore>, auth);
        (service, local)
    }

    #[tokio::test]
    async fn test_add_visited_evicts_wishlist_entry() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(Arc::clone(&remote));

        assert!(service.add_wishlist(&details("p1")).await.applied());
        assert!(service.add_visited(&details("p1"), None).await.applied());

        let result = service.fetch_all().await;
        assert!(result.collection.is_visited(&PlaceId::new("p1")));
        assert!(!result.collection.is_wishlisted(&PlaceId::new("p1")));
        assert!(result.collection.invariant_holds());
    }

    #[tokio::test]
    async fn test_add_visited_is_idempotent() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);

        assert!(service.add_visited(&details("p1"), None).await.applied());
        assert_eq!(
            service.add_visited(&details("p1"), None).await,
            SyncOutcome::NoOp
        );

        let result = service.fetch_all().await;
        assert_eq!(result.collection.visited.len(), 1);
    }

    #[tokio::test]
    async fn test_wishlist_add_declines_when_already_visited() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);

        assert!(service.add_visited(&details("p2"), None).await.applied());
        assert_eq!(service.add_wishlist(&details("p2")).await, SyncOutcome::NoOp);

        let result = service.fetch_all().await;
        assert!(result.collection.is_visited(&PlaceId::new("p2")));
        assert!(result.collection.wishlist.is_empty());
    }

    #[tokio::test]
    async fn test_move_then_remove_leaves_neither_list() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);
        let id = PlaceId::new("p1");

        service.add_wishlist(&details("p1")).await;
        assert!(service
            .move_wishlist_to_visited(&id, None)
            .await
            .applied());
        assert!(service.remove_visited(&id).await.applied());

        let result = service.fetch_all().await;
        assert!(!result.collection.contains(&id));
    }

    #[tokio::test]
    async fn test_move_stamps_fresh_added_on_and_visit_date() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);
        let id = PlaceId::new("p1");

        service.add_wishlist(&details("p1")).await;
        let before = service.fetch_all().await.collection;
        let wishlisted = before.wishlist.first().expect("wishlisted").clone();

        let visit = Utc::now();
        service.move_wishlist_to_visited(&id, Some(visit)).await;

        let after = service.fetch_all().await.collection;
        let visited = after.visited.first().expect("visited");
        assert_eq!(visited.visited_date, Some(visit));
        assert!(visited.added_on >= wishlisted.added_on);
        assert_eq!(visited.place_name, wishlisted.place_name);
    }

    #[tokio::test]
    async fn test_move_noops_when_not_wishlisted() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);

        assert_eq!(
            service
                .move_wishlist_to_visited(&PlaceId::new("ghost"), None)
                .await,
            SyncOutcome::NoOp
        );
    }

    #[tokio::test]
    async fn test_remove_absent_place_is_noop() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);

        assert_eq!(
            service.remove_wishlist(&PlaceId::new("ghost")).await,
            SyncOutcome::NoOp
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_fetch_does_no_store_io() {
        let remote = Arc::new(MockRemote::default());
        let local = Arc::new(MemoryStore::new());
        let auth = Arc::new(SessionAuth::new());
        let service = SyncService::new(
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            local,
            auth,
        );

        let result = service.fetch_all().await;
        assert!(matches!(result.source, FetchSource::NoUser));
        assert!(result.collection.visited.is_empty());
        assert!(result.collection.wishlist.is_empty());
        assert_eq!(remote.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthenticated_mutation_declines() {
        let remote = Arc::new(MockRemote::default());
        let local = Arc::new(MemoryStore::new());
        let auth = Arc::new(SessionAuth::new());
        let service = SyncService::new(remote, local, auth);

        assert_eq!(
            service.add_visited(&details("p1"), None).await,
            SyncOutcome::Declined
        );
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_mirror_when_remote_fails() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(Arc::clone(&remote));

        service.add_visited(&details("p1"), None).await;
        // A successful fetch refreshes the mirror.
        service.fetch_all().await;

        remote.set_failing(true);
        let result = service.fetch_all().await;
        assert!(matches!(result.source, FetchSource::LocalFallback(_)));
        assert!(result.collection.is_visited(&PlaceId::new("p1")));
    }

    #[tokio::test]
    async fn test_mutation_falls_back_to_mirror_when_remote_fails() {
        let remote = Arc::new(MockRemote::default());
        let (service, local) = service_with(Arc::clone(&remote));

        remote.set_failing(true);
        let outcome = service.add_wishlist(&details("p1")).await;
        assert_eq!(outcome, SyncOutcome::Applied(Backend::Local));

        let mirrored = local.read(&UserId::new("u1"), PlaceList::Wishlist);
        assert_eq!(mirrored.len(), 1);
    }

    #[tokio::test]
    async fn test_double_write_failure_is_swallowed() {
        let remote = Arc::new(MockRemote::default());
        remote.set_failing(true);
        let auth = Arc::new(SessionAuth::signed_in(UserId::new("u1")));
        let service = SyncService::new(remote, Arc::new(BrokenLocal), auth);

        assert_eq!(
            service.add_wishlist(&details("p1")).await,
            SyncOutcome::Failed
        );

        // The service stays usable afterwards: the degraded read still
        // answers, with nothing persisted anywhere.
        let result = service.fetch_all().await;
        assert!(matches!(result.source, FetchSource::LocalFallback(_)));
        assert!(result.collection.wishlist.is_empty());
    }

    #[tokio::test]
    async fn test_successful_fetch_refreshes_mirror() {
        let remote = Arc::new(MockRemote::default());
        let (service, local) = service_with(Arc::clone(&remote));

        service.add_visited(&details("p1"), None).await;
        service.fetch_all().await;

        let mirrored = local.read(&UserId::new("u1"), PlaceList::Visited);
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored.first().expect("entry").place_id, PlaceId::new("p1"));
    }

    #[tokio::test]
    async fn test_visited_date_defaults_to_now() {
        let remote = Arc::new(MockRemote::default());
        let (service, _) = service_with(remote);

        let before = Utc::now();
        service.add_visited(&details("p1"), None).await;
        let after = Utc::now();

        let collection = service.fetch_all().await.collection;
        let visited = collection.visited.first().expect("entry");
        let date = visited.visited_date.expect("visit date");
        assert!(date >= before && date <= after);
    }
}
