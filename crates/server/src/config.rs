//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MUSAFIR_DOCSTORE_URL` - Base URL of the hosted document store
//! - `MUSAFIR_DOCSTORE_API_KEY` - Document store project API key
//! - `MUSAFIR_AUTH_URL` - Base URL of the hosted auth provider
//! - `MUSAFIR_AUTH_API_KEY` - Auth provider project API key
//!
//! ## Optional
//! - `MUSAFIR_HOST` - Bind address (default: 127.0.0.1)
//! - `MUSAFIR_PORT` - Listen port (default: 3000)
//! - `MUSAFIR_MIRROR_DIR` - Local mirror directory (default: ./data/mirror)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use musafir_places::DocumentStoreConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Hosted document store settings
    pub docstore: DocumentStoreConfig,
    /// Hosted auth provider settings
    pub auth: AuthConfig,
    /// Directory for the local mirror store
    pub mirror_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Hosted auth provider settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct AuthConfig {
    /// Base URL of the auth provider REST API
    pub base_url: String,
    /// Project API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("MUSAFIR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("MUSAFIR_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("MUSAFIR_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("MUSAFIR_PORT".to_owned(), e.to_string()))?;

        let docstore = DocumentStoreConfig {
            base_url: get_required_env("MUSAFIR_DOCSTORE_URL")?,
            api_key: get_secret_env("MUSAFIR_DOCSTORE_API_KEY")?,
        };
        let auth = AuthConfig {
            base_url: get_required_env("MUSAFIR_AUTH_URL")?,
            api_key: get_secret_env("MUSAFIR_AUTH_API_KEY")?,
        };

        let mirror_dir = PathBuf::from(get_env_or_default("MUSAFIR_MIRROR_DIR", "./data/mirror"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            docstore,
            auth,
            mirror_dir,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_owned()))
}

/// Get a required environment variable as a secret.
fn get_secret_env(name: &str) -> Result<SecretString, ConfigError> {
    get_required_env(name).map(SecretString::from)
}

/// Get an optional environment variable.
fn get_optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default.
fn get_env_or_default(name: &str, default: &str) -> String {
    get_optional_env(name).unwrap_or_else(|| default.to_owned())
}
