//! Typed access to a host preference store.
//!
//! [`TypedPreferences`] picks an access path per type:
//! - `bool`, `f32`, `i32`, `i64`, `f64` and `String` go through the
//!   [`AccessorTable`] straight to the store's native slots (`f64` as a string)
//! - every other [`Preference`] is converted with serde and stored as a JSON
//!   string produced by the configured [`JsonCodec`]
//!
//! Writes are committed by the store before the call returns and fire the
//! store's change notification, which [`observe_preferences`] surfaces.
//!
//! [`observe_preferences`]: TypedPreferences::observe_preferences

use std::fmt;
use std::sync::Arc;

use crate::accessor::AccessorTable;
use crate::codec::{CodecError, JsonCodec, SerdeJsonCodec};
use crate::config::PreferencesConfig;
use crate::descriptor::{Preference, TypeDescriptor};
use crate::error::{PrefError, PrefResult};
use crate::logging::{debug, trace};
use crate::observe::{ChangeFeed, PreferenceFeed};
use crate::storage::{PreferenceStore, StorageError};
use crate::value::StoredValue;

/// Typed preferences over a [`PreferenceStore`].
///
/// Cloning is cheap; clones share the store, codec and accessor table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use prefkit::{InMemoryPreferenceStore, TypedPreferences};
///
/// let prefs = TypedPreferences::new(Arc::new(InMemoryPreferenceStore::new()));
///
/// prefs.put("volume", &7i32)?;
/// prefs.put("recent", &vec!["a.txt".to_string(), "b.txt".to_string()])?;
///
/// assert_eq!(prefs.get("volume", 0i32)?, 7);
/// assert_eq!(prefs.get("recent", Vec::<String>::new())?.len(), 2);
/// assert_eq!(prefs.get("missing", 1.5f64)?, 1.5);
/// # Ok::<(), prefkit::PrefError>(())
/// ```
#[derive(Clone)]
pub struct TypedPreferences {
    store: Arc<dyn PreferenceStore>,
    codec: Arc<dyn JsonCodec>,
    accessors: Arc<AccessorTable>,
    config: PreferencesConfig,
}

/// Builder for [`TypedPreferences`].
pub struct TypedPreferencesBuilder {
    store: Arc<dyn PreferenceStore>,
    codec: Option<Arc<dyn JsonCodec>>,
    config: PreferencesConfig,
}

impl TypedPreferencesBuilder {
    /// Use `codec` instead of the default [`SerdeJsonCodec`].
    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Replace the default [`PreferencesConfig`].
    #[must_use]
    pub fn config(mut self, config: PreferencesConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the wrapper. The accessor table is created once here.
    #[must_use]
    pub fn build(self) -> TypedPreferences {
        let codec = self.codec.unwrap_or_else(|| {
            Arc::new(SerdeJsonCodec::with_style(self.config.json_style)) as Arc<dyn JsonCodec>
        });
        let accessors = Arc::new(AccessorTable::new(Arc::clone(&self.store)));
        debug!(
            accessors = accessors.len(),
            json_style = ?self.config.json_style,
            max_key_length = ?self.config.max_key_length,
            "typed preferences created"
        );
        TypedPreferences {
            store: self.store,
            codec,
            accessors,
            config: self.config,
        }
    }
}

impl TypedPreferences {
    /// Wrap `store` with the default JSON codec.
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self::builder(store).build()
    }

    /// Wrap `store` with a custom JSON codec.
    #[must_use]
    pub fn with_codec(store: Arc<dyn PreferenceStore>, codec: Arc<dyn JsonCodec>) -> Self {
        Self::builder(store).codec(codec).build()
    }

    /// Start a builder for a custom codec or config.
    #[must_use]
    pub fn builder(store: Arc<dyn PreferenceStore>) -> TypedPreferencesBuilder {
        TypedPreferencesBuilder {
            store,
            codec: None,
            config: PreferencesConfig::default(),
        }
    }

    /// The wrapped store, for direct access.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn PreferenceStore> {
        &self.store
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PreferencesConfig {
        &self.config
    }

    /// Whether the store has an entry for `key`.
    pub fn contains(&self, key: &str) -> PrefResult<bool> {
        self.config.validate_key(key)?;
        Ok(self.store.contains_key(key)?)
    }

    /// Read `key` as a `T`, or `default` when the key is absent.
    ///
    /// A present but undecodable value is an error, never the default.
    pub fn get<T: Preference>(&self, key: &str, default: T) -> PrefResult<T> {
        self.config.validate_key(key)?;
        let descriptor = T::descriptor();

        if let Some(kind) = descriptor.primitive_kind() {
            let fallback = default.to_primitive().ok_or_else(|| {
                PrefError::internal(format!("{descriptor} value has no primitive form"))
            })?;
            let value = self.accessors.get(key, fallback)?;
            return T::from_primitive(value).ok_or_else(|| {
                PrefError::internal(format!("{kind} accessor returned a value of another kind"))
            });
        }

        // Single read: a key removed concurrently yields the default.
        let raw = match self.store.get_value(key)? {
            None => return Ok(default),
            Some(StoredValue::String(raw)) => raw,
            Some(other) => {
                return Err(StorageError::type_mismatch(key, "string", &other).into());
            }
        };
        trace!(key = key, descriptor = %descriptor, "decoding JSON preference");
        let json = self.codec.decode(&raw, &descriptor)?;
        serde_json::from_value(json)
            .map_err(|e| PrefError::from(CodecError::decode(&descriptor, e)))
    }

    /// Write and commit `value` under `key`.
    pub fn put<T: Preference>(&self, key: &str, value: &T) -> PrefResult<()> {
        self.put_with(key, value, T::descriptor())
    }

    /// Write `value`, handing `descriptor` to the codec when the value is
    /// JSON-encoded. Primitive values always use their accessor.
    pub fn put_with<T: Preference>(
        &self,
        key: &str,
        value: &T,
        descriptor: TypeDescriptor,
    ) -> PrefResult<()> {
        self.config.validate_key(key)?;

        if let Some(primitive) = value.to_primitive() {
            return self.accessors.put(key, primitive);
        }

        let json = serde_json::to_value(value).map_err(|e| CodecError::encode(&descriptor, e))?;
        let raw = self.codec.encode(&json, &descriptor)?;
        trace!(key = key, descriptor = %descriptor, bytes = raw.len(), "storing JSON preference");
        Ok(self.store.put_string(key, &raw)?)
    }

    /// Delete `key`. Absent keys are left alone.
    pub fn remove(&self, key: &str) -> PrefResult<()> {
        self.config.validate_key(key)?;
        if !self.store.contains_key(key)? {
            return Ok(());
        }
        debug!(key = key, "removing preference");
        Ok(self.store.remove(key)?)
    }

    /// Delete every entry. Does nothing when the store is already empty.
    pub fn clear(&self) -> PrefResult<()> {
        let size = self.size()?;
        if size == 0 {
            return Ok(());
        }
        debug!(entries = size, "clearing preferences");
        Ok(self.store.clear()?)
    }

    /// Number of entries in the store.
    pub fn size(&self) -> PrefResult<usize> {
        Ok(self.store.len()?)
    }

    /// Cold feed of changed keys. Nothing is registered until it is
    /// subscribed.
    #[must_use]
    pub fn observe_preferences(&self) -> ChangeFeed {
        ChangeFeed::new(Arc::clone(&self.store))
    }

    /// Feed of `key`'s value, re-read on every change to `key`.
    pub fn observe<T: Preference + Clone>(
        &self,
        key: &str,
        default: T,
    ) -> PrefResult<PreferenceFeed<T>> {
        self.config.validate_key(key)?;
        Ok(PreferenceFeed::new(self.clone(), key.to_string(), default, false))
    }

    /// Like [`observe`](Self::observe), but every subscription first yields
    /// the current value.
    pub fn get_and_observe<T: Preference + Clone>(
        &self,
        key: &str,
        default: T,
    ) -> PrefResult<PreferenceFeed<T>> {
        self.config.validate_key(key)?;
        Ok(PreferenceFeed::new(self.clone(), key.to_string(), default, true))
    }
}

impl fmt::Debug for TypedPreferences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedPreferences")
            .field("accessors", &self.accessors)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
