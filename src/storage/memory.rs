//! In-memory storage backend.
//!
//! This module provides a thread-safe in-memory implementation of
//! [`PreferenceStore`]. It is intended for embedded usage, tests, and as a
//! reference for host store adapters.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::storage::traits::{ChangeListener, ListenerToken, PreferenceStore, StorageError};
use crate::value::StoredValue;

fn lock_err(context: &'static str) -> StorageError {
    StorageError::BackendError(format!("poisoned lock: {context}"))
}

/// In-memory preference store with synchronous change notification.
///
/// Listeners run on the writing thread after the data lock is released, so a
/// listener may read the store it is registered with.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: RwLock<BTreeMap<String, StoredValue>>,
    listeners: RwLock<Vec<(ListenerToken, Arc<dyn ChangeListener>)>>,
}

impl InMemoryPreferenceStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> Result<usize, StorageError> {
        Ok(self
            .listeners
            .read()
            .map_err(|_| lock_err("listeners.count"))?
            .len())
    }

    fn notify(&self, keys: &[String]) -> Result<(), StorageError> {
        if keys.is_empty() {
            return Ok(());
        }

        // Snapshot so listeners may (un)register while being notified.
        let listeners: Vec<Arc<dyn ChangeListener>> = self
            .listeners
            .read()
            .map_err(|_| lock_err("listeners.notify"))?
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for key in keys {
            for listener in &listeners {
                listener.on_change(key);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for InMemoryPreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.values.read().map(|v| v.len()).ok();
        let listeners = self.listeners.read().map(|l| l.len()).ok();
        f.debug_struct("InMemoryPreferenceStore")
            .field("entries", &entries)
            .field("listeners", &listeners)
            .finish()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
        let values = self.values.read().map_err(|_| lock_err("contains_key"))?;
        Ok(values.contains_key(key))
    }

    fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let values = self.values.read().map_err(|_| lock_err("get_value"))?;
        Ok(values.get(key).cloned())
    }

    fn put_value(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
        {
            let mut values = self.values.write().map_err(|_| lock_err("put_value"))?;
            values.insert(key.to_string(), value);
        }
        self.notify(&[key.to_string()])
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = {
            let mut values = self.values.write().map_err(|_| lock_err("remove"))?;
            values.remove(key).is_some()
        };
        if removed {
            self.notify(&[key.to_string()])?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let cleared: Vec<String> = {
            let mut values = self.values.write().map_err(|_| lock_err("clear"))?;
            std::mem::take(&mut *values).into_keys().collect()
        };
        self.notify(&cleared)
    }

    fn all(&self) -> Result<BTreeMap<String, StoredValue>, StorageError> {
        let values = self.values.read().map_err(|_| lock_err("all"))?;
        Ok(values.clone())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let values = self.values.read().map_err(|_| lock_err("len"))?;
        Ok(values.len())
    }

    fn register_listener(
        &self,
        listener: Arc<dyn ChangeListener>,
    ) -> Result<ListenerToken, StorageError> {
        let token = ListenerToken::new();
        self.listeners
            .write()
            .map_err(|_| lock_err("register_listener"))?
            .push((token, listener));
        Ok(token)
    }

    fn unregister_listener(&self, token: ListenerToken) -> Result<bool, StorageError> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| lock_err("unregister_listener"))?;
        let before = listeners.len();
        listeners.retain(|(t, _)| *t != token);
        Ok(listeners.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    fn recording_listener() -> (Arc<Mutex<Vec<String>>>, Arc<dyn ChangeListener>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: Arc<dyn ChangeListener> =
            Arc::new(move |key: &str| sink.lock().unwrap().push(key.to_string()));
        (seen, listener)
    }

    #[test]
    fn put_get_contains_remove() {
        let store = InMemoryPreferenceStore::new();
        assert!(!store.contains_key("a").unwrap());

        store.put_int("a", 3).unwrap();
        assert!(store.contains_key("a").unwrap());
        assert_eq!(store.get_int("a", 0).unwrap(), 3);
        assert_eq!(store.get_value("a").unwrap(), Some(StoredValue::Int(3)));

        store.remove("a").unwrap();
        assert!(!store.contains_key("a").unwrap());
        assert_eq!(store.get_int("a", 9).unwrap(), 9);
    }

    #[test]
    fn typed_getter_rejects_other_kind() {
        let store = InMemoryPreferenceStore::new();
        store.put_string("name", "ada").unwrap();
        let err = store.get_long("name", 0).unwrap_err();
        assert!(matches!(
            err,
            StorageError::TypeMismatch { expected: "long", found: "string", .. }
        ));
    }

    #[test]
    fn len_and_clear() {
        let store = InMemoryPreferenceStore::new();
        store.put_bool("a", true).unwrap();
        store.put_float("b", 0.5).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert!(!store.is_empty().unwrap());

        store.clear().unwrap();
        assert_eq!(store.len().unwrap(), 0);
        assert!(store.all().unwrap().is_empty());
    }

    #[test]
    fn listeners_see_puts_removes_and_cleared_keys() {
        let store = InMemoryPreferenceStore::new();
        let (seen, listener) = recording_listener();
        store.register_listener(listener).unwrap();

        store.put_long("x", 1).unwrap();
        store.put_long("y", 2).unwrap();
        store.remove("x").unwrap();
        // Absent key: nothing changes, nothing is reported.
        store.remove("missing").unwrap();
        store.clear().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["x", "y", "x", "y"]);
    }

    #[test]
    fn unregistered_listener_is_not_called() {
        let store = InMemoryPreferenceStore::new();
        let (seen, listener) = recording_listener();
        let token = store.register_listener(listener).unwrap();
        assert_eq!(store.listener_count().unwrap(), 1);

        assert!(store.unregister_listener(token).unwrap());
        assert!(!store.unregister_listener(token).unwrap());
        assert_eq!(store.listener_count().unwrap(), 0);

        store.put_bool("a", false).unwrap();
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn listener_may_read_the_store() {
        let store = Arc::new(InMemoryPreferenceStore::new());
        let reader = Arc::clone(&store);
        let observed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&observed);
        store
            .register_listener(Arc::new(move |key: &str| {
                *sink.lock().unwrap() = reader.get_value(key).unwrap();
            }))
            .unwrap();

        store.put_string("k", "v").unwrap();
        assert_eq!(
            *observed.lock().unwrap(),
            Some(StoredValue::String("v".to_string()))
        );
    }
}
