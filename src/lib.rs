//! SCD Type-2 historization engine.
//!
//! Given an existing historized table and a freshly arrived snapshot of the
//! same logical entity, [`historize`] computes the new historized table:
//! each business-key row gets a temporal validity interval, and changes
//! over time are preserved losslessly rather than overwritten.
//!
//! The engine is a pure function over in-memory [`TabularValue`]s. It does
//! not fetch a snapshot, persist a result, plan a query, or choose a
//! physical layout — those are an orchestrator's job. See the crate's
//! design notes for the full contract.
//!
//! ```
//! use chrono::Utc;
//! use historize::{historize, HistorizeOptions};
//! use historize::schema::{ColumnSchema, Schema};
//! use historize::table::{Row, TabularValue};
//! use historize::value::{DataType, Value};
//!
//! let history_schema = Schema::new(vec![
//!     ColumnSchema::new("id", DataType::Int64, false),
//!     ColumnSchema::new("status", DataType::Utf8, false),
//!     ColumnSchema::new("captured", DataType::Timestamp, false),
//!     ColumnSchema::new("delimited", DataType::Timestamp, false),
//! ]);
//! let feed_schema = Schema::new(vec![
//!     ColumnSchema::new("id", DataType::Int64, false),
//!     ColumnSchema::new("status", DataType::Utf8, false),
//! ]);
//!
//! let history = TabularValue::new(history_schema, vec![]);
//! let feed = TabularValue::new(
//!     feed_schema,
//!     vec![Row::new(vec![Value::Int64(1), Value::Utf8("new".into())])],
//! );
//!
//! let result = historize(
//!     &history,
//!     &feed,
//!     &["id".to_string()],
//!     Utc::now(),
//!     HistorizeOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(result.len(), 1);
//! ```

pub mod align;
pub mod engine;
pub mod error;
pub mod interval;
pub mod partition;
pub mod schema;
pub mod table;
pub mod value;

pub use engine::{historize, HistorizeOptions, CAPTURED_COL, DELIMITED_COL};
pub use error::HistorizeError;
pub use interval::Timestamp;

use once_cell::sync::Lazy;

/// The doomsday sentinel: a fixed, far-future, timezone-agnostic instant
/// denoting "currently open" (spec §6). `5875-06-03T00:00:00Z` matches the
/// legacy convention the spec recommends; any instant at least 1000 years
/// beyond plausible data dates is equally valid, provided it stays stable
/// across runs — which is exactly what a process-wide `Lazy` constant
/// gives us, the same pattern `saketh-are-nearcore` uses for its
/// computed-once global constants.
pub static DOOMSDAY: Lazy<Timestamp> = Lazy::new(|| {
    "5875-06-03T00:00:00Z"
        .parse()
        .expect("doomsday sentinel is a valid, fixed RFC 3339 timestamp")
});
