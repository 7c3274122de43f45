//! Storage layer
//!
//! Durable key-value storage for the local word cache and the pending
//! operation queue.
//!
//! ## Keys
//!
//! - `userWords` - serialized list of [`WordEntry`](crate::models::WordEntry)
//! - `pendingOps` - serialized list of queued operations
//!
//! A missing or undecodable value reads as empty. A store that cannot be
//! read at all is a real error.

pub mod error;
pub mod memory;
pub mod schema;
pub mod sqlite;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use schema::SCHEMA_VERSION;
pub use sqlite::SqliteStore;

/// Key holding the local word cache
pub const USER_WORDS_KEY: &str = "userWords";

/// Key holding the pending-operation queue
pub const PENDING_OPS_KEY: &str = "pendingOps";

/// A string-keyed store of string values
pub trait LocalStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the value for `key` in one atomic write
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

/// Decode a JSON value stored under `key`
///
/// Returns `Ok(None)` when the key is missing and `CorruptValue` when it
/// cannot be decoded.
pub fn read_json<T, S>(store: &S, key: &str) -> StorageResult<Option<T>>
where
    T: DeserializeOwned,
    S: LocalStore + ?Sized,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::CorruptValue {
            key: key.to_string(),
            details: e.to_string(),
        })
}

/// Like [`read_json`], but a missing or corrupt value reads as the default
pub fn read_json_or_default<T, S>(store: &S, key: &str) -> StorageResult<T>
where
    T: DeserializeOwned + Default,
    S: LocalStore + ?Sized,
{
    match read_json(store, key) {
        Ok(value) => Ok(value.unwrap_or_default()),
        Err(e) if e.is_corruption() => {
            tracing::warn!("{}; treating it as empty", e);
            Ok(T::default())
        }
        Err(e) => Err(e),
    }
}

/// Encode `value` as JSON and store it under `key`
pub fn write_json<T, S>(store: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: LocalStore + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_is_default() {
        let store = MemoryStore::new();
        let words: Vec<String> = read_json_or_default(&store, USER_WORDS_KEY).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_corrupt_value_is_default() {
        let store = MemoryStore::new();
        store.set(PENDING_OPS_KEY, "{not json").unwrap();

        let err = read_json::<Vec<String>, _>(&store, PENDING_OPS_KEY).unwrap_err();
        assert!(err.is_corruption());

        let ops: Vec<String> = read_json_or_default(&store, PENDING_OPS_KEY).unwrap();
        assert!(ops.is_empty());
    }

    #[test]
    fn test_wrong_shape_is_corrupt() {
        let store = MemoryStore::new();
        store.set(USER_WORDS_KEY, r#"{"word":"lucid"}"#).unwrap();

        let words: Vec<String> = read_json_or_default(&store, USER_WORDS_KEY).unwrap();
        assert!(words.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let store = SqliteStore::open_in_memory().unwrap();
        write_json(&store, USER_WORDS_KEY, &vec!["a", "b"]).unwrap();

        let words: Vec<String> = read_json_or_default(&store, USER_WORDS_KEY).unwrap();
        assert_eq!(words, vec!["a", "b"]);
    }
}
