//! Value types exchanged with the host store.
//!
//! The host store understands a small closed set of value kinds
//! ([`StoredValue`]). The wrapper adds one more primitive, `f64`, which the
//! store has no slot for and which is therefore kept as a string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A value as the host store holds it.
///
/// # Examples
///
/// ```
/// use prefkit::StoredValue;
///
/// let flag = StoredValue::Bool(true);
/// let name = StoredValue::String("ada".to_string());
///
/// assert_eq!(flag.as_bool(), Some(true));
/// assert_eq!(name.as_str(), Some("ada"));
/// assert_eq!(name.kind_name(), "string");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StoredValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    String(String),
}

impl StoredValue {
    /// Human readable name of the stored kind, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Float(_) => "float",
            Self::String(_) => "string",
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }
}

/// The closed set of types with a dedicated accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    Float,
    Int,
    Long,
    Double,
    String,
}

impl PrimitiveKind {
    /// Every primitive kind, in accessor-table order.
    pub const ALL: [Self; 6] = [
        Self::Bool,
        Self::Float,
        Self::Int,
        Self::Long,
        Self::Double,
        Self::String,
    ];

    /// Position of this kind in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Bool => 0,
            Self::Float => 1,
            Self::Int => 2,
            Self::Long => 3,
            Self::Double => 4,
            Self::String => 5,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Int => "int",
            Self::Long => "long",
            Self::Double => "double",
            Self::String => "string",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value of one of the primitive kinds, as passed through an accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Bool(bool),
    Float(f32),
    Int(i32),
    Long(i64),
    Double(f64),
    String(String),
}

impl PrimitiveValue {
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::Bool(_) => PrimitiveKind::Bool,
            Self::Float(_) => PrimitiveKind::Float,
            Self::Int(_) => PrimitiveKind::Int,
            Self::Long(_) => PrimitiveKind::Long,
            Self::Double(_) => PrimitiveKind::Double,
            Self::String(_) => PrimitiveKind::String,
        }
    }
}
