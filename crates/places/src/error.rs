//! Error types for the two persistence backends.
//!
//! Neither error ever crosses the sync layer's public surface: remote
//! errors trigger the local fallback, local errors are logged and
//! swallowed. They exist so the fallback sites can log something useful
//! and so the context can classify the likely cause for the user.

use thiserror::Error;

/// Errors from the hosted document store.
#[derive(Debug, Error)]
pub enum RemoteStoreError {
    /// HTTP request failed (network, DNS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it was readable.
        message: String,
    },

    /// The document did not parse into the expected shape.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Client construction failed (bad API key header).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl RemoteStoreError {
    /// Whether the store rejected the caller's credentials.
    ///
    /// Used to pick the user-facing explanation when a read degrades to
    /// the local mirror.
    #[must_use]
    pub const fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Api { status: 401 | 403, .. })
    }
}

/// Errors from the local mirror store.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// Filesystem access failed (missing directory, quota, permissions).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A list failed to serialize.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
