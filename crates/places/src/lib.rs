//! Musafir user-places sync layer.
//!
//! Keeps a per-user pair of place lists (visited and wishlist) in sync
//! across two backends:
//!
//! - the hosted document store, authoritative whenever it is reachable
//! - a local mirror store, refreshed after every successful remote read
//!   and used transparently when the remote is not reachable
//!
//! # Architecture
//!
//! - [`store`] - The `RemoteStore` / `LocalStore` seams
//! - [`remote`] - REST client for the hosted document store
//! - [`local`] - File-backed and in-memory mirror stores
//! - [`auth`] - The "current user, or none" collaborator
//! - [`sync`] - [`SyncService`](sync::SyncService): the fallback policy and
//!   the cross-list invariant live here
//! - [`context`] - [`UserPlacesContext`](context::UserPlacesContext): the
//!   session-scoped state the UI layer reads
//! - [`notify`] - Transient toast-style notifications
//!
//! The public contract of this layer is best effort, never throws: reads
//! degrade to local or empty data, writes fall back to the mirror, and
//! double failures end in a logged no-op.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod context;
pub mod error;
pub mod local;
pub mod notify;
pub mod remote;
pub mod store;
pub mod sync;

pub use auth::{AuthProvider, SessionAuth};
pub use context::UserPlacesContext;
pub use error::{LocalStoreError, RemoteStoreError};
pub use local::{JsonFileStore, MemoryStore};
pub use notify::{Notice, NoticeHub, NoticeLevel};
pub use remote::{DocumentStoreClient, DocumentStoreConfig};
pub use store::{LocalStore, RemoteStore};
pub use sync::{Backend, FetchResult, FetchSource, SyncOutcome, SyncService};
