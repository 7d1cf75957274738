//! Error types for prefkit.
//!
//! All errors are strongly typed using thiserror, grouped by where they
//! originate: argument validation, the host store, the JSON codec, or the
//! wrapper itself.

use thiserror::Error;

use crate::codec::CodecError;
use crate::storage::StorageError;

/// Validation errors raised before any store access happens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Preference key cannot be empty")]
    EmptyKey,

    #[error("Preference key '{key}' exceeds maximum length of {max_length}")]
    KeyTooLong {
        key: String,
        max_length: usize,
    },
}

/// Top-level error type for prefkit.
#[derive(Debug, Error)]
pub enum PrefError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// A stored string could not be parsed back into its numeric type.
    #[error("Malformed value '{value}' for key '{key}': {message}")]
    Format {
        key: String,
        value: String,
        message: String,
    },

    /// The change subscription was cancelled or its listener was dropped.
    #[error("Subscription closed")]
    SubscriptionClosed,

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PrefError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this error came from the host store.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns true if this error came from the JSON codec.
    #[must_use]
    pub const fn is_codec(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    /// Returns true if a stored numeric string failed to parse.
    #[must_use]
    pub const fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }

    /// Returns true if a change subscription has ended.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        matches!(self, Self::SubscriptionClosed)
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

/// Result type alias for prefkit operations.
pub type PrefResult<T> = Result<T, PrefError>;
