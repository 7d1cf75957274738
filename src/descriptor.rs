//! Type descriptors and the [`Preference`] trait.
//!
//! Every type that can be read from or written to [`TypedPreferences`]
//! implements [`Preference`]. Its [`TypeDescriptor`] decides the access path:
//! the six primitive kinds go through the accessor table, everything else is
//! encoded as JSON and stored as a string.
//!
//! User types opt in with an empty impl, as long as they are serde types:
//!
//! ```
//! use prefkit::{Preference, TypeDescriptor};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Window {
//!     width: u32,
//!     height: u32,
//! }
//!
//! impl Preference for Window {}
//!
//! assert!(Window::descriptor().is_json());
//! assert!(!bool::descriptor().is_json());
//! ```
//!
//! [`TypedPreferences`]: crate::TypedPreferences

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::value::{PrimitiveKind, PrimitiveValue};

/// Runtime description of a preference's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// One of the kinds with a dedicated store accessor.
    Primitive(PrimitiveKind),
    /// Any other type, stored as a JSON string.
    Json {
        /// Rust type name, for diagnostics and custom codecs.
        type_name: &'static str,
    },
}

impl TypeDescriptor {
    /// Descriptor of `T`.
    #[must_use]
    pub fn of<T: Preference>() -> Self {
        T::descriptor()
    }

    /// JSON descriptor naming `T`.
    #[must_use]
    pub fn json<T: ?Sized>() -> Self {
        Self::Json {
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The primitive kind, if this descriptor has an accessor.
    #[must_use]
    pub const fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Self::Primitive(kind) => Some(*kind),
            Self::Json { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json { .. })
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Primitive(kind) => kind.name(),
            Self::Json { type_name } => *type_name,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(kind) => write!(f, "{kind}"),
            Self::Json { type_name } => write!(f, "json<{type_name}>"),
        }
    }
}

/// A type that can be stored as a preference.
///
/// The defaults describe a JSON-encoded type. Primitive impls override all
/// three methods; `to_primitive` and `from_primitive` must agree with
/// `descriptor`.
pub trait Preference: Serialize + DeserializeOwned {
    /// Descriptor selecting the access path for this type.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::json::<Self>()
    }

    /// The value as a primitive, or `None` for JSON-encoded types.
    fn to_primitive(&self) -> Option<PrimitiveValue> {
        None
    }

    /// Rebuild the value from a primitive read by an accessor.
    fn from_primitive(_value: PrimitiveValue) -> Option<Self> {
        None
    }
}

macro_rules! primitive_preference {
    ($ty:ty, $variant:ident) => {
        impl Preference for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Primitive(PrimitiveKind::$variant)
            }

            fn to_primitive(&self) -> Option<PrimitiveValue> {
                Some(PrimitiveValue::$variant(self.clone()))
            }

            fn from_primitive(value: PrimitiveValue) -> Option<Self> {
                match value {
                    PrimitiveValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

primitive_preference!(bool, Bool);
primitive_preference!(f32, Float);
primitive_preference!(i32, Int);
primitive_preference!(i64, Long);
primitive_preference!(f64, Double);
primitive_preference!(String, String);

impl<T: Serialize + DeserializeOwned> Preference for Vec<T> {}

impl<T: Serialize + DeserializeOwned> Preference for VecDeque<T> {}

impl<T: Serialize + DeserializeOwned + Ord> Preference for BTreeSet<T> {}

impl<T: Serialize + DeserializeOwned + Eq + Hash> Preference for HashSet<T> {}

impl<K, V> Preference for BTreeMap<K, V>
where
    K: Serialize + DeserializeOwned + Ord,
    V: Serialize + DeserializeOwned,
{
}

impl<K, V> Preference for HashMap<K, V>
where
    K: Serialize + DeserializeOwned + Eq + Hash,
    V: Serialize + DeserializeOwned,
{
}

impl Preference for serde_json::Value {}

/// Stores any serde type as JSON without a dedicated [`Preference`] impl.
///
/// ```
/// use prefkit::{Json, Preference};
///
/// assert!(Json::<(u8, u8)>::descriptor().is_json());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: Serialize + DeserializeOwned> Preference for Json<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::json::<T>()
    }
}
