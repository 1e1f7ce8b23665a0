//! REST client for the hosted document store.
//!
//! The store keeps one document per user, keyed by the auth uid. This
//! client only touches the `places` field; reviews, profile data and
//! anything else other subsystems keep in the same document are preserved
//! by writing through `PATCH`, which the store treats as a merge-write.
//!
//! # Document contract
//!
//! - `GET /v1/users/{uid}` - full document, `404` when absent
//! - `PUT /v1/users/{uid}` - create (or replace) the document
//! - `PATCH /v1/users/{uid}` - merge-write the supplied fields
//!
//! Timestamps inside `places` come back as RFC 3339 strings or, in old
//! records, epoch milliseconds; both are converted at the
//! `musafir_core::timestamp` boundary during deserialization.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use musafir_core::{UserId, UserPlace, UserPlacesCollection};

use crate::error::RemoteStoreError;
use crate::store::RemoteStore;

/// Request timeout for document operations.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the document store client.
#[derive(Clone)]
pub struct DocumentStoreConfig {
    /// Base URL of the document store API (no trailing slash).
    pub base_url: String,
    /// Project API key, sent on every request.
    pub api_key: SecretString,
}

impl std::fmt::Debug for DocumentStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Client for the hosted document store.
#[derive(Clone)]
pub struct DocumentStoreClient {
    inner: Arc<DocumentStoreClientInner>,
}

struct DocumentStoreClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl DocumentStoreClient {
    /// Create a new document store client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &DocumentStoreConfig) -> Result<Self, RemoteStoreError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Api-Key",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| RemoteStoreError::Config(format!("invalid API key: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(RemoteStoreError::Http)?;

        Ok(Self {
            inner: Arc::new(DocumentStoreClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_owned(),
            }),
        })
    }

    fn document_url(&self, user: &UserId) -> String {
        format!("{}/v1/users/{}", self.inner.base_url, user)
    }

    /// Fetch the user's document, `None` when it does not exist.
    async fn get_document(&self, user: &UserId) -> Result<Option<Value>, RemoteStoreError> {
        let response = self
            .inner
            .client
            .get(self.document_url(user))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(Some(response.json().await?))
    }

    /// Create the user's document.
    async fn create_document(&self, user: &UserId, body: &Value) -> Result<(), RemoteStoreError> {
        let response = self
            .inner
            .client
            .put(self.document_url(user))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    /// Merge-write fields into the user's document.
    async fn merge_document(&self, user: &UserId, body: &Value) -> Result<(), RemoteStoreError> {
        let response = self
            .inner
            .client
            .patch(self.document_url(user))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }
}

/// Build an API error from a non-success response.
async fn error_from_response(response: reqwest::Response) -> RemoteStoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    RemoteStoreError::Api { status, message }
}

/// Extract the collection from a raw document.
///
/// A missing `places` field or a list that is not a sequence coerces to
/// an empty list; entries that fail to parse are an error so the caller
/// can fall back to the mirror instead of silently dropping data.
fn collection_from_document(doc: &Value) -> Result<UserPlacesCollection, RemoteStoreError> {
    let places = doc.get("places");
    Ok(UserPlacesCollection {
        visited: parse_list(places.and_then(|p| p.get("visited")))?,
        wishlist: parse_list(places.and_then(|p| p.get("wishlist")))?,
    })
}

fn parse_list(value: Option<&Value>) -> Result<Vec<UserPlace>, RemoteStoreError> {
    match value {
        Some(Value::Array(entries)) => {
            Ok(serde_json::from_value(Value::Array(entries.clone()))?)
        }
        // Missing field, null, or a non-sequence value written by an old
        // client all coerce to empty.
        _ => Ok(Vec::new()),
    }
}

fn empty_places_field() -> Value {
    json!({ "places": { "visited": [], "wishlist": [] } })
}

#[async_trait]
impl RemoteStore for DocumentStoreClient {
    async fn ensure_document(&self, user: &UserId) -> Result<(), RemoteStoreError> {
        match self.get_document(user).await? {
            None => self.create_document(user, &empty_places_field()).await,
            Some(doc) if doc.get("places").is_none() => {
                self.merge_document(user, &empty_places_field()).await
            }
            Some(_) => Ok(()),
        }
    }

    async fn fetch(&self, user: &UserId) -> Result<UserPlacesCollection, RemoteStoreError> {
        match self.get_document(user).await? {
            Some(doc) => collection_from_document(&doc),
            // ensure_document runs first in the normal flow; an absent
            // document still reads as empty lists.
            None => Ok(UserPlacesCollection::empty()),
        }
    }

    async fn store(
        &self,
        user: &UserId,
        places: &UserPlacesCollection,
    ) -> Result<(), RemoteStoreError> {
        let body = json!({
            "places": {
                "visited": places.visited,
                "wishlist": places.wishlist,
            }
        });
        self.merge_document(user, &body).await
    }
}
