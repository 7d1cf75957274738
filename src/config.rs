//! Configuration for [`TypedPreferences`](crate::TypedPreferences).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub use crate::codec::JsonStyle;

/// Wrapper settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Layout of JSON written by the default codec. Ignored when a custom
    /// codec is supplied.
    pub json_style: JsonStyle,
    /// Reject keys longer than this many bytes.
    pub max_key_length: Option<usize>,
}

impl PreferencesConfig {
    /// Check that `key` is usable as a preference key.
    pub fn validate_key(&self, key: &str) -> Result<(), ValidationError> {
        if key.is_empty() {
            return Err(ValidationError::EmptyKey);
        }
        if let Some(max_length) = self.max_key_length {
            if key.len() > max_length {
                return Err(ValidationError::KeyTooLong {
                    key: key.to_string(),
                    max_length,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accepts_any_non_empty_key() {
        let cfg = PreferencesConfig::default();
        assert_eq!(cfg.json_style, JsonStyle::Compact);
        assert!(cfg.validate_key("k").is_ok());
        assert!(cfg.validate_key(&"k".repeat(10_000)).is_ok());
        assert_eq!(cfg.validate_key(""), Err(ValidationError::EmptyKey));
    }

    #[test]
    fn key_length_limit_is_enforced() {
        let cfg = PreferencesConfig {
            max_key_length: Some(3),
            ..PreferencesConfig::default()
        };
        assert!(cfg.validate_key("abc").is_ok());
        assert!(matches!(
            cfg.validate_key("abcd"),
            Err(ValidationError::KeyTooLong { max_length: 3, .. })
        ));
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let cfg: PreferencesConfig = serde_json::from_str(r#"{"json_style":"pretty"}"#).unwrap();
        assert_eq!(cfg.json_style, JsonStyle::Pretty);
        assert_eq!(cfg.max_key_length, None);
    }
}
