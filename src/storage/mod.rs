//! Key-value persistence, the client's stand-in for browser local storage.
//!
//! Every persisted value is a string under a well-known key. Typed values go
//! through the JSON helpers at the bottom of this module.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StorageError;

/// Well-known storage keys.
pub mod keys {
    pub const CURRENT_USER: &str = "currentUser";
    pub const AUTH_TOKEN: &str = "authToken";
    pub const IS_AUTHENTICATED: &str = "isAuthenticated";
    pub const SAVED_TRAVELLERS: &str = "saved_travellers";
    pub const USER_PREFERENCES: &str = "user_preferences";
}

/// Backend-agnostic string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (overwrite) a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Serialize `value` as JSON and store it under `key`.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
        key: key.to_string(),
        reason: e.to_string(),
    })?;
    store.set(key, &json).await
}

/// Load and parse the JSON value under `key`.
///
/// Returns `Ok(None)` when the key is absent and an error when the stored
/// text does not parse as `T`.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn json_helpers_round_trip() {
        let store = MemoryStore::new();
        let sample = Sample {
            name: "seat".into(),
            count: 2,
        };
        save_json(&store, "sample", &sample).await.unwrap();
        let loaded: Option<Sample> = load_json(&store, "sample").await.unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[tokio::test]
    async fn load_json_missing_key_is_none() {
        let store = MemoryStore::new();
        let loaded: Option<Sample> = load_json(&store, "nope").await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn load_json_reports_corrupt_values() {
        let store = MemoryStore::new();
        store.set("sample", "{not json").await.unwrap();
        let err = load_json::<Sample>(&store, "sample").await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization { ref key, .. } if key == "sample"));
    }
}
