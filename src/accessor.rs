//! Accessor table for primitive preferences.
//!
//! One accessor pair (typed get, typed put) per [`PrimitiveKind`], bound to
//! the store when the table is built and never changed afterwards. `f64` has
//! no native slot in the store and is kept as its string form.

use std::fmt;
use std::sync::Arc;

use crate::error::{PrefError, PrefResult};
use crate::storage::PreferenceStore;
use crate::value::{PrimitiveKind, PrimitiveValue};

type GetFn = fn(&dyn PreferenceStore, &str, PrimitiveValue) -> PrefResult<PrimitiveValue>;
type PutFn = fn(&dyn PreferenceStore, &str, PrimitiveValue) -> PrefResult<()>;

/// Typed get/put pair for one primitive kind.
#[derive(Debug, Clone, Copy)]
pub struct Accessor {
    kind: PrimitiveKind,
    get: GetFn,
    put: PutFn,
}

impl Accessor {
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}

fn kind_mismatch(expected: PrimitiveKind, got: &PrimitiveValue) -> PrefError {
    PrefError::internal(format!(
        "{expected} accessor received a {} value",
        got.kind()
    ))
}

fn get_bool(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::Bool(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::Bool, &default));
    };
    Ok(PrimitiveValue::Bool(store.get_bool(key, d)?))
}

fn put_bool(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::Bool(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::Bool, &value));
    };
    Ok(store.put_bool(key, v)?)
}

fn get_float(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::Float(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::Float, &default));
    };
    Ok(PrimitiveValue::Float(store.get_float(key, d)?))
}

fn put_float(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::Float(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::Float, &value));
    };
    Ok(store.put_float(key, v)?)
}

fn get_int(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::Int(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::Int, &default));
    };
    Ok(PrimitiveValue::Int(store.get_int(key, d)?))
}

fn put_int(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::Int(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::Int, &value));
    };
    Ok(store.put_int(key, v)?)
}

fn get_long(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::Long(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::Long, &default));
    };
    Ok(PrimitiveValue::Long(store.get_long(key, d)?))
}

fn put_long(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::Long(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::Long, &value));
    };
    Ok(store.put_long(key, v)?)
}

fn get_double(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::Double(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::Double, &default));
    };
    let raw = store.get_string(key, &d.to_string())?;
    raw.trim()
        .parse::<f64>()
        .map(PrimitiveValue::Double)
        .map_err(|e| PrefError::Format {
            key: key.to_string(),
            value: raw.clone(),
            message: e.to_string(),
        })
}

fn put_double(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::Double(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::Double, &value));
    };
    Ok(store.put_string(key, &v.to_string())?)
}

fn get_string(
    store: &dyn PreferenceStore,
    key: &str,
    default: PrimitiveValue,
) -> PrefResult<PrimitiveValue> {
    let PrimitiveValue::String(d) = default else {
        return Err(kind_mismatch(PrimitiveKind::String, &default));
    };
    Ok(PrimitiveValue::String(store.get_string(key, &d)?))
}

fn put_string(store: &dyn PreferenceStore, key: &str, value: PrimitiveValue) -> PrefResult<()> {
    let PrimitiveValue::String(v) = value else {
        return Err(kind_mismatch(PrimitiveKind::String, &value));
    };
    Ok(store.put_string(key, &v)?)
}

// Order follows `PrimitiveKind::ALL`.
const ACCESSORS: [Accessor; 6] = [
    Accessor { kind: PrimitiveKind::Bool, get: get_bool, put: put_bool },
    Accessor { kind: PrimitiveKind::Float, get: get_float, put: put_float },
    Accessor { kind: PrimitiveKind::Int, get: get_int, put: put_int },
    Accessor { kind: PrimitiveKind::Long, get: get_long, put: put_long },
    Accessor { kind: PrimitiveKind::Double, get: get_double, put: put_double },
    Accessor { kind: PrimitiveKind::String, get: get_string, put: put_string },
];

/// Primitive accessors bound to one store.
pub struct AccessorTable {
    store: Arc<dyn PreferenceStore>,
    accessors: [Accessor; 6],
}

impl AccessorTable {
    /// Build the table for `store`.
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            store,
            accessors: ACCESSORS,
        }
    }

    /// The accessor for `kind`.
    #[must_use]
    pub fn accessor(&self, kind: PrimitiveKind) -> &Accessor {
        &self.accessors[kind.index()]
    }

    /// Number of entries; one per primitive kind.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.accessors.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Read `key` with the accessor matching `default`'s kind.
    pub fn get(&self, key: &str, default: PrimitiveValue) -> PrefResult<PrimitiveValue> {
        let accessor = self.accessor(default.kind());
        (accessor.get)(self.store.as_ref(), key, default)
    }

    /// Write and commit `value` with the accessor matching its kind.
    pub fn put(&self, key: &str, value: PrimitiveValue) -> PrefResult<()> {
        let accessor = self.accessor(value.kind());
        (accessor.put)(self.store.as_ref(), key, value)
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorTable")
            .field("kinds", &self.accessors.iter().map(Accessor::kind).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
