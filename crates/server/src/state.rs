//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use musafir_core::UserId;
use musafir_places::{
    DocumentStoreClient, JsonFileStore, LocalStoreError, RemoteStoreError, SessionAuth,
    SyncService, UserPlacesContext,
};

use crate::config::ServerConfig;
use crate::services::auth::{AuthClient, AuthError};

/// How long an idle user session keeps its context alive.
const CONTEXT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently cached sessions.
const CONTEXT_CAPACITY: u64 = 10_000;

/// Error creating application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("document store client: {0}")]
    Remote(#[from] RemoteStoreError),
    #[error("auth client: {0}")]
    Auth(#[from] AuthError),
    #[error("mirror store: {0}")]
    Mirror(#[from] LocalStoreError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the external clients plus a
/// registry of per-user places contexts, one per active session,
/// TTL-evicted when idle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    auth_client: AuthClient,
    docstore: DocumentStoreClient,
    mirror: Arc<JsonFileStore>,
    contexts: Cache<UserId, Arc<UserPlacesContext>>,
}

impl AppState {
    /// Create a new application state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a client fails to build or the mirror
    /// directory cannot be created.
    pub fn new(config: ServerConfig) -> Result<Self, StateError> {
        let auth_client = AuthClient::new(&config.auth)?;
        let docstore = DocumentStoreClient::new(&config.docstore)?;
        let mirror = Arc::new(JsonFileStore::new(&config.mirror_dir)?);

        let contexts = Cache::builder()
            .max_capacity(CONTEXT_CAPACITY)
            .time_to_idle(CONTEXT_IDLE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                auth_client,
                docstore,
                mirror,
                contexts,
            }),
        })
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the auth client.
    #[must_use]
    pub fn auth_client(&self) -> &AuthClient {
        &self.inner.auth_client
    }

    /// Get (or create) the places context for a verified user.
    ///
    /// The first request of a session builds the context and runs the
    /// initial fetch; later requests reuse it until the idle TTL evicts
    /// it.
    pub async fn context_for(&self, user: &UserId) -> Arc<UserPlacesContext> {
        let user = user.clone();
        self.inner
            .contexts
            .get_with(user.clone(), async {
                let auth = Arc::new(SessionAuth::signed_in(user.clone()));
                let service = SyncService::new(
                    Arc::new(self.inner.docstore.clone()),
                    Arc::clone(&self.inner.mirror) as Arc<dyn musafir_places::LocalStore>,
                    auth,
                );
                let context = Arc::new(UserPlacesContext::new(service));
                context.refresh().await;
                context
            })
            .await
    }
}
