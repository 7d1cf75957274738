//! JSON codec used for non-primitive preferences.
//!
//! Serde already handles the conversion between Rust types and
//! `serde_json::Value`. The codec owns the step between that tree and the
//! string kept in the store, so hosts can plug in their own JSON dialect.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::descriptor::TypeDescriptor;

/// Errors raised while encoding or decoding JSON preferences.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to encode {type_name}: {message}")]
    Encode {
        type_name: String,
        message: String,
    },

    #[error("Failed to decode {type_name}: {message}")]
    Decode {
        type_name: String,
        message: String,
    },
}

impl CodecError {
    /// Encode failure for the type named by `descriptor`.
    pub fn encode(descriptor: &TypeDescriptor, message: impl ToString) -> Self {
        Self::Encode {
            type_name: descriptor.type_name().to_string(),
            message: message.to_string(),
        }
    }

    /// Decode failure for the type named by `descriptor`.
    pub fn decode(descriptor: &TypeDescriptor, message: impl ToString) -> Self {
        Self::Decode {
            type_name: descriptor.type_name().to_string(),
            message: message.to_string(),
        }
    }
}

/// Converts JSON trees to and from their stored string form.
///
/// Implementations must fail on malformed input instead of guessing.
pub trait JsonCodec: Send + Sync {
    /// Render `value`, which describes a value of type `descriptor`.
    fn encode(
        &self,
        value: &serde_json::Value,
        descriptor: &TypeDescriptor,
    ) -> Result<String, CodecError>;

    /// Parse a stored string back into a JSON tree for `descriptor`.
    fn decode(&self, raw: &str, descriptor: &TypeDescriptor)
        -> Result<serde_json::Value, CodecError>;
}

/// Output layout of [`SerdeJsonCodec`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonStyle {
    /// Single line, no whitespace.
    #[default]
    Compact,
    /// Indented, multi-line.
    Pretty,
}

/// Default codec backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerdeJsonCodec {
    style: JsonStyle,
}

impl SerdeJsonCodec {
    /// Compact codec.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            style: JsonStyle::Compact,
        }
    }

    #[must_use]
    pub const fn with_style(style: JsonStyle) -> Self {
        Self { style }
    }

    #[must_use]
    pub const fn style(&self) -> JsonStyle {
        self.style
    }
}

impl From<JsonStyle> for SerdeJsonCodec {
    fn from(style: JsonStyle) -> Self {
        Self::with_style(style)
    }
}

impl JsonCodec for SerdeJsonCodec {
    fn encode(
        &self,
        value: &serde_json::Value,
        descriptor: &TypeDescriptor,
    ) -> Result<String, CodecError> {
        let rendered = match self.style {
            JsonStyle::Compact => serde_json::to_string(value),
            JsonStyle::Pretty => serde_json::to_string_pretty(value),
        };
        rendered.map_err(|e| CodecError::encode(descriptor, e))
    }

    fn decode(
        &self,
        raw: &str,
        descriptor: &TypeDescriptor,
    ) -> Result<serde_json::Value, CodecError> {
        serde_json::from_str(raw).map_err(|e| CodecError::decode(descriptor, e))
    }
}
