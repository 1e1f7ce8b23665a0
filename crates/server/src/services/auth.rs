//! Client for the hosted auth provider.
//!
//! Sign-in happens entirely on the provider's side; the web and mobile
//! clients get an ID token and send it here as a bearer token. This
//! client only verifies tokens against the provider's `accounts:lookup`
//! endpoint and returns the account it identifies.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use musafir_core::UserId;

use crate::config::AuthConfig;

/// Request timeout for token verification.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when verifying a token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the token.
    #[error("invalid or expired token")]
    InvalidToken,

    /// The provider returned an unexpected response.
    #[error("auth provider error: {status} - {message}")]
    Provider {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it was readable.
        message: String,
    },

    /// Client construction failed (bad API key header).
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A verified account.
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    /// Stable account id (the document store key).
    pub uid: UserId,
    /// Account email, when the provider shares it.
    pub email: Option<String>,
}

/// Client for the hosted auth provider.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct LookupRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    users: Option<Vec<LookupAccount>>,
}

#[derive(Deserialize)]
struct LookupAccount {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
}

impl AuthClient {
    /// Create a new auth client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Api-Key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| AuthError::Config(format!("invalid API key: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AuthError::Http)?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Verify an ID token and return the account it identifies.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` for rejected or unknown tokens,
    /// and transport/provider errors otherwise.
    pub async fn verify_token(&self, id_token: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/v1/accounts:lookup", self.inner.base_url);

        let response = self
            .inner
            .client
            .post(&url)
            .json(&LookupRequest { id_token })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(AuthError::InvalidToken);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let lookup: LookupResponse = response.json().await?;
        let account = lookup
            .users
            .and_then(|mut users| if users.is_empty() { None } else { Some(users.remove(0)) })
            .ok_or(AuthError::InvalidToken)?;

        Ok(AuthUser {
            uid: UserId::new(account.local_id),
            email: account.email,
        })
    }
}
