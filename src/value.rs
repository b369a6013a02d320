//! Cell values and the closed set of business-column types the engine
//! reasons about. `sql_saga` represents row payloads as `serde_json::Value`
//! at its SPI boundary; here the same idea (one untyped cell container) is
//! closed over a fixed variant set instead of arbitrary JSON, so a type
//! mismatch is a matchable enum variant rather than a runtime JSON-shape
//! surprise. `Value` still derives `Serialize`/`Deserialize` so a caller can
//! move rows across a process boundary if it chooses to, but the engine
//! itself never serializes anything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Declared type of a business column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Int64,
    Float64,
    Utf8,
    Binary,
    Timestamp,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Utf8 => "utf8",
            Self::Binary => "binary",
            Self::Timestamp => "timestamp",
        }
    }

    /// The type a [`Value`] belongs to, or `None` for [`Value::Null`]
    /// (a null carries no type information of its own).
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Boolean(_) => Some(Self::Boolean),
            Value::Int64(_) => Some(Self::Int64),
            Value::Float64(_) => Some(Self::Float64),
            Value::Utf8(_) => Some(Self::Utf8),
            Value::Binary(_) => Some(Self::Binary),
            Value::Timestamp(_) => Some(Self::Timestamp),
        }
    }
}

/// A single cell value. `Null` is a distinct case, not folded into any of
/// the typed variants, so the null-sensitive equality rules in the
/// partitioner (spec §4.2) can be expressed directly on this enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type-native equality for two *non-null* values of the same declared
    /// type. Floats compare bit-exact (`to_bits`), never with a tolerance —
    /// spec §4.2 is explicit that float comparison is not tolerant.
    ///
    /// Returns `false` if the values are of different variants (a caller
    /// bug upstream — the aligner guarantees same-typed columns, so this
    /// should never actually be reached with mismatched variants).
    fn non_null_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Utf8(a), Value::Utf8(b)) => a == b,
            (Value::Binary(a), Value::Binary(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }

    /// Null-sensitive equality used throughout the partitioner: two nulls
    /// are equal, a null and a non-null are never equal, two non-nulls use
    /// [`Value::non_null_eq`]. This is the deliberate, non-SQL convention
    /// spec §9 calls out — `NULL = NULL` here, unlike a SQL `IS NOT
    /// DISTINCT FROM`-free comparison.
    pub fn scd_eq(&self, other: &Value) -> bool {
        match (self.is_null(), other.is_null()) {
            (true, true) => true,
            (true, false) | (false, true) => false,
            (false, false) => self.non_null_eq(other),
        }
    }
}
