//! Local mirror stores.
//!
//! The mirror is a best-effort cache shaped like the browser local
//! storage it replaces: one string key per (user, list), each holding a
//! serialized `UserPlace` sequence. Reads never fail; a missing or
//! unparsable key reads as an empty list. A write failure loses only the
//! mirror copy, never the in-memory state.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use musafir_core::{PlaceList, UserId, UserPlace};

use crate::error::LocalStoreError;
use crate::store::LocalStore;

/// Build the storage key for a (user, list) pair.
///
/// uids come from the auth provider; bytes outside `[A-Za-z0-9-]` are
/// escaped as `_xx` (lowercase hex) to keep the key filesystem-safe.
/// Escaping, not collapsing, so distinct uids never share a key.
fn storage_key(user: &UserId, list: PlaceList) -> String {
    let mut uid = String::with_capacity(user.as_str().len());
    for b in user.as_str().bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => uid.push(char::from(b)),
            _ => uid.push_str(&format!("_{b:02x}")),
        }
    }
    format!("{uid}.{}", list.key())
}

/// File-backed mirror store: one small JSON file per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the mirror directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, LocalStoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, user: &UserId, list: PlaceList) -> PathBuf {
        self.dir.join(format!("{}.json", storage_key(user, list)))
    }
}

impl LocalStore for JsonFileStore {
    fn read(&self, user: &UserId, list: PlaceList) -> Vec<UserPlace> {
        let path = self.key_path(user, list);
        let Ok(bytes) = fs::read(&path) else {
            return Vec::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(places) => places,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Unparsable mirror key, reading as empty");
                Vec::new()
            }
        }
    }

    fn write(
        &self,
        user: &UserId,
        list: PlaceList,
        places: &[UserPlace],
    ) -> Result<(), LocalStoreError> {
        let bytes = serde_json::to_vec(places)?;
        fs::write(self.key_path(user, list), bytes)?;
        Ok(())
    }
}

/// In-memory mirror store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<UserPlace>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn read(&self, user: &UserId, list: PlaceList) -> Vec<UserPlace> {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&storage_key(user, list))
            .cloned()
            .unwrap_or_default()
    }

    fn write(
        &self,
        user: &UserId,
        list: PlaceList,
        places: &[UserPlace],
    ) -> Result<(), LocalStoreError> {
        self.entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(storage_key(user, list), places.to_vec());
        Ok(())
    }
}
