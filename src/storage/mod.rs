//! Storage layer for prefkit.
//!
//! The [`PreferenceStore`] trait is the contract a host key-value store
//! fulfils. [`InMemoryPreferenceStore`] is the bundled reference backend.

mod memory;
mod traits;

pub use memory::InMemoryPreferenceStore;
pub use traits::{ChangeListener, ListenerToken, PreferenceStore, StorageError};
