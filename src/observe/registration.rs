//! Listener registration owned by a subscription.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{PrefError, PrefResult};
use crate::logging::{debug, warn};
use crate::storage::{ChangeListener, ListenerToken, PreferenceStore};

/// One listener registered with a store, deregistered exactly once.
///
/// The `cancelled` flag is shared with the listener, so nothing is forwarded
/// after cancellation even if the store is still notifying. `deregistered`
/// is set only once the store has accepted the deregistration; until then
/// every `cancel` (and `Drop`) asks the store again.
pub(crate) struct Registration {
    store: Arc<dyn PreferenceStore>,
    token: ListenerToken,
    cancelled: Arc<AtomicBool>,
    deregistered: Mutex<bool>,
}

impl Registration {
    /// Register a listener that hands every changed key to `forward`.
    pub(crate) fn register<F>(store: &Arc<dyn PreferenceStore>, forward: F) -> PrefResult<Self>
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let listener: Arc<dyn ChangeListener> = Arc::new(move |key: &str| {
            if !flag.load(Ordering::Acquire) {
                forward(key);
            }
        });

        let token = store.register_listener(listener)?;
        debug!(token = %token, "change listener registered");

        Ok(Self {
            store: Arc::clone(store),
            token,
            cancelled,
            deregistered: Mutex::new(false),
        })
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Stop forwarding and deregister. Idempotent once the store has
    /// accepted the deregistration; a failed attempt is retried by the next
    /// call.
    pub(crate) fn cancel(&self) -> PrefResult<()> {
        self.cancelled.store(true, Ordering::Release);

        let mut deregistered = self
            .deregistered
            .lock()
            .map_err(|_| PrefError::internal("registration lock poisoned"))?;
        if *deregistered {
            return Ok(());
        }

        let removed = self.store.unregister_listener(self.token)?;
        *deregistered = true;
        if !removed {
            warn!(token = %self.token, "change listener was already gone from the store");
        }
        debug!(token = %self.token, "change listener deregistered");
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("token", &self.token)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Drop for Registration {
    #[allow(unused_variables)]
    fn drop(&mut self) {
        if let Err(err) = self.cancel() {
            warn!(token = %self.token, error = %err, "failed to deregister change listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;
    use std::sync::atomic::AtomicUsize;

    use crate::storage::{InMemoryPreferenceStore, StorageError};
    use crate::value::StoredValue;

    /// Store whose first `unregister_listener` call fails.
    #[derive(Default)]
    struct FlakyUnregisterStore {
        inner: InMemoryPreferenceStore,
        unregister_calls: AtomicUsize,
    }

    impl PreferenceStore for FlakyUnregisterStore {
        fn contains_key(&self, key: &str) -> Result<bool, StorageError> {
            self.inner.contains_key(key)
        }

        fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
            self.inner.get_value(key)
        }

        fn put_value(&self, key: &str, value: StoredValue) -> Result<(), StorageError> {
            self.inner.put_value(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }

        fn clear(&self) -> Result<(), StorageError> {
            self.inner.clear()
        }

        fn all(&self) -> Result<BTreeMap<String, StoredValue>, StorageError> {
            self.inner.all()
        }

        fn register_listener(
            &self,
            listener: Arc<dyn ChangeListener>,
        ) -> Result<ListenerToken, StorageError> {
            self.inner.register_listener(listener)
        }

        fn unregister_listener(&self, token: ListenerToken) -> Result<bool, StorageError> {
            if self.unregister_calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(StorageError::BackendError("transient".to_string()));
            }
            self.inner.unregister_listener(token)
        }
    }

    fn flaky() -> (Arc<FlakyUnregisterStore>, Arc<dyn PreferenceStore>) {
        let concrete = Arc::new(FlakyUnregisterStore::default());
        let store: Arc<dyn PreferenceStore> = concrete.clone();
        (concrete, store)
    }

    fn store() -> (Arc<InMemoryPreferenceStore>, Arc<dyn PreferenceStore>) {
        let concrete = Arc::new(InMemoryPreferenceStore::new());
        let store: Arc<dyn PreferenceStore> = concrete.clone();
        (concrete, store)
    }

    #[test]
    fn drop_deregisters() {
        let (concrete, store) = store();
        let reg = Registration::register(&store, |_| {}).unwrap();
        assert_eq!(concrete.listener_count().unwrap(), 1);
        drop(reg);
        assert_eq!(concrete.listener_count().unwrap(), 0);
    }

    #[test]
    fn cancel_is_idempotent() {
        let (concrete, store) = store();
        let reg = Registration::register(&store, |_| {}).unwrap();
        reg.cancel().unwrap();
        reg.cancel().unwrap();
        assert!(reg.is_cancelled());
        assert_eq!(concrete.listener_count().unwrap(), 0);
    }

    #[test]
    fn forwards_until_cancelled() {
        let (_, store) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let reg = Registration::register(&store, move |key| {
            sink.lock().unwrap().push(key.to_string());
        })
        .unwrap();

        store.put_int("a", 1).unwrap();
        reg.cancel().unwrap();
        store.put_int("b", 2).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["a"]);
    }

    #[test]
    fn failed_deregistration_is_retried_by_next_cancel() {
        let (concrete, store) = flaky();
        let reg = Registration::register(&store, |_| {}).unwrap();

        assert!(reg.cancel().unwrap_err().is_storage());
        assert!(reg.is_cancelled());
        assert_eq!(concrete.inner.listener_count().unwrap(), 1);

        reg.cancel().unwrap();
        assert_eq!(concrete.inner.listener_count().unwrap(), 0);

        reg.cancel().unwrap();
        drop(reg);
        assert_eq!(concrete.unregister_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn drop_retries_failed_deregistration() {
        let (concrete, store) = flaky();
        let reg = Registration::register(&store, |_| {}).unwrap();

        assert!(reg.cancel().is_err());
        drop(reg);

        assert_eq!(concrete.unregister_calls.load(Ordering::SeqCst), 2);
        assert_eq!(concrete.inner.listener_count().unwrap(), 0);
    }

    #[test]
    fn nothing_forwarded_while_deregistration_is_pending() {
        let (_, store) = flaky();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let reg = Registration::register(&store, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        assert!(reg.cancel().is_err());
        store.put_int("after", 1).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
