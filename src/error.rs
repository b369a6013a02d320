//! Error taxonomy (spec §7). Every variant is fatal at the engine boundary:
//! `historize` never returns a partially-historized [`crate::table::TabularValue`].
//! Re-running on identical inputs must report the identical error — nothing
//! here carries a timestamp, random id, or other run-to-run varying data.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum HistorizeError {
    /// A column present on both sides of an alignment has conflicting
    /// declared types.
    #[error("column `{column}` has conflicting types: history has {history_type}, feed has {feed_type}")]
    SchemaIncompatible {
        column: String,
        history_type: &'static str,
        feed_type: &'static str,
    },

    /// `history` is missing (or mistypes) one of the reserved technical
    /// columns, or an I1 (`captured < delimited`) or I2 (non-overlapping
    /// intervals per key) invariant does not hold on the input.
    #[error("malformed history: {reason}")]
    MalformedHistory { reason: String },

    /// The incoming feed has more than one row for the same primary key.
    #[error("feed has duplicate primary key {key:?} ({count} rows)")]
    FeedInvariantViolated { key: Vec<String>, count: usize },

    /// More than one currently-open row exists in the input history for
    /// the same primary key (I3: at most one row per key has `delimited ==
    /// doomsday`).
    #[error("history has {count} open rows for primary key {key:?}, expected at most 1")]
    HistoryInvariantViolated { key: Vec<String>, count: usize },

    /// A caller-supplied option is invalid: empty primary key, a primary
    /// key column absent from the schema, a non-positive offset, or a
    /// doomsday not strictly greater than the reference timestamp.
    #[error("invalid configuration: {reason}")]
    ConfigurationError { reason: String },
}
