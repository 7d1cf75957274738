//! Abstract storage traits for prefkit.
//!
//! The host platform owns the actual key-value store: durability, write
//! atomicity and on-disk format are its business. These traits describe the
//! surface the typed wrapper needs from it:
//! - a string-keyed map of [`StoredValue`]s, committed on every write
//! - change notification by key, through registered listeners

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::value::StoredValue;

/// Errors that can occur during storage operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// The key holds a value of a different kind than requested.
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Backend error.
    #[error("Storage backend error: {0}")]
    BackendError(String),
}

impl StorageError {
    pub(crate) fn type_mismatch(key: &str, expected: &'static str, found: &StoredValue) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected,
            found: found.kind_name(),
        }
    }
}

/// Identifies one listener registration with a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerToken(Uuid);

impl ListenerToken {
    /// Create a new random token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ListenerToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Callback invoked by a store after a key was written, removed or cleared.
///
/// Closures of the form `Fn(&str)` implement this trait.
pub trait ChangeListener: Send + Sync {
    /// Called with the key that just changed.
    fn on_change(&self, key: &str);
}

impl<F> ChangeListener for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_change(&self, key: &str) {
        self(key);
    }
}

/// The host key-value store.
///
/// Every write is committed before the call returns and is visible to
/// subsequent reads. Implementations must notify registered listeners once
/// per changed key, after the change is visible.
pub trait PreferenceStore: Send + Sync {
    /// Whether the store has an entry for `key`.
    fn contains_key(&self, key: &str) -> Result<bool, StorageError>;

    /// Raw value stored under `key`.
    fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError>;

    /// Write and commit a value.
    fn put_value(&self, key: &str, value: StoredValue) -> Result<(), StorageError>;

    /// Delete the entry for `key`, if any.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Delete every entry.
    fn clear(&self) -> Result<(), StorageError>;

    /// Snapshot of every entry.
    fn all(&self) -> Result<BTreeMap<String, StoredValue>, StorageError>;

    /// Start delivering change notifications to `listener`.
    fn register_listener(
        &self,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<ListenerToken, StorageError>;

    /// Stop delivering notifications for `token`. Returns false if the token
    /// was not registered.
    fn unregister_listener(&self, token: ListenerToken) -> Result<bool, StorageError>;

    /// Number of entries.
    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.all()?.len())
    }

    /// Whether the store holds no entries.
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn get_bool(&self, key: &str, default: bool) -> Result<bool, StorageError> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(StoredValue::Bool(v)) => Ok(v),
            Some(other) => Err(StorageError::type_mismatch(key, "bool", &other)),
        }
    }

    fn get_int(&self, key: &str, default: i32) -> Result<i32, StorageError> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(StoredValue::Int(v)) => Ok(v),
            Some(other) => Err(StorageError::type_mismatch(key, "int", &other)),
        }
    }

    fn get_long(&self, key: &str, default: i64) -> Result<i64, StorageError> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(StoredValue::Long(v)) => Ok(v),
            Some(other) => Err(StorageError::type_mismatch(key, "long", &other)),
        }
    }

    fn get_float(&self, key: &str, default: f32) -> Result<f32, StorageError> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(StoredValue::Float(v)) => Ok(v),
            Some(other) => Err(StorageError::type_mismatch(key, "float", &other)),
        }
    }

    fn get_string(&self, key: &str, default: &str) -> Result<String, StorageError> {
        match self.get_value(key)? {
            None => Ok(default.to_string()),
            Some(StoredValue::String(v)) => Ok(v),
            Some(other) => Err(StorageError::type_mismatch(key, "string", &other)),
        }
    }

    fn put_bool(&self, key: &str, value: bool) -> Result<(), StorageError> {
        self.put_value(key, StoredValue::Bool(value))
    }

    fn put_int(&self, key: &str, value: i32) -> Result<(), StorageError> {
        self.put_value(key, StoredValue::Int(value))
    }

    fn put_long(&self, key: &str, value: i64) -> Result<(), StorageError> {
        self.put_value(key, StoredValue::Long(value))
    }

    fn put_float(&self, key: &str, value: f32) -> Result<(), StorageError> {
        self.put_value(key, StoredValue::Float(value))
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.put_value(key, StoredValue::String(value.to_string()))
    }
}
