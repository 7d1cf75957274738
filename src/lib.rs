//! # prefkit - Typed Preferences over a Key-Value Store
//!
//! prefkit wraps a host preference store (flat keys, a handful of primitive
//! slot types, change notifications) and gives it a typed, observable API.
//!
//! ## Core Concepts
//!
//! - **PreferenceStore**: The host store. [`InMemoryPreferenceStore`] is the bundled backend
//! - **Preference**: A type that can be stored; primitives use native slots, everything else is JSON
//! - **TypedPreferences**: Typed get/put/remove/clear plus change feeds
//! - **Feeds**: Cold sources of changed keys or re-read values; each subscription owns one listener
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use prefkit::{InMemoryPreferenceStore, TypedPreferences};
//!
//! let prefs = TypedPreferences::new(Arc::new(InMemoryPreferenceStore::new()));
//!
//! let mut volume = prefs.get_and_observe("volume", 5i32)?.subscribe()?;
//! assert_eq!(volume.recv()??, 5);
//!
//! prefs.put("volume", &9i32)?;
//! assert_eq!(volume.recv()??, 9);
//!
//! prefs.put("tags", &vec!["dark".to_string()])?;
//! assert_eq!(prefs.get("tags", Vec::<String>::new())?, vec!["dark"]);
//! # Ok::<(), prefkit::PrefError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Storage and values
pub mod error;
pub mod storage;
pub mod value;

// Type mapping
pub mod accessor;
pub mod codec;
pub mod descriptor;

// Wrapper and observation
pub mod config;
mod logging;
pub mod observe;
pub mod preferences;

pub use accessor::AccessorTable;
pub use codec::{CodecError, JsonCodec, JsonStyle, SerdeJsonCodec};
pub use config::PreferencesConfig;
pub use descriptor::{Json, Preference, TypeDescriptor};
pub use error::{PrefError, PrefResult, ValidationError};
pub use observe::{ChangeFeed, ChangeSubscription, PreferenceFeed, PreferenceSubscription};
pub use preferences::{TypedPreferences, TypedPreferencesBuilder};
pub use storage::{
	ChangeListener, InMemoryPreferenceStore, ListenerToken, PreferenceStore, StorageError,
};
pub use value::{PrimitiveKind, PrimitiveValue, StoredValue};

#[cfg(feature = "async")]
pub use observe::{AsyncChangeSubscription, AsyncPreferenceSubscription};
