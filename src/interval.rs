//! Interval Closer (spec §4.3). Assigns validity timestamps to the four
//! partitions produced by [`crate::partition::classify`]: closing rows get
//! their `delimited` rewritten to `reference - offset`; opening rows get a
//! freshly appended `captured = reference`, `delimited = doomsday`.
//!
//! The `offset` exists purely so `closing.delimited < opening.captured`
//! strictly holds even when a caller compares the two intervals of one key
//! side by side (spec §4.3) — it is the engine's only defense against a
//! reference timestamp with coarser resolution than the platform clock.

use chrono::{DateTime, Duration, Utc};

use crate::schema::{ColumnSchema, Schema};
use crate::table::{Row, TabularValue};
use crate::value::{DataType, Value};

pub type Timestamp = DateTime<Utc>;

/// The four partitions with validity intervals finalized, all sharing one
/// schema (business columns, in canonical order, then `captured`, then
/// `delimited` — spec invariant I5).
pub struct TimestampedPartitions {
    pub unchanged_open: TabularValue,
    pub closed: TabularValue,
    pub opened: TabularValue,
    pub carried_closed: TabularValue,
}

pub fn close_intervals(
    partitions: crate::partition::Partitions,
    captured_col: &str,
    delimited_col: &str,
    reference: Timestamp,
    offset: Duration,
    doomsday: Timestamp,
) -> TimestampedPartitions {
    let closed_at = reference - offset;

    let closed = rewrite_delimited(&partitions.closing, delimited_col, Value::Timestamp(closed_at));
    let opened = append_validity(
        &partitions.opening,
        captured_col,
        delimited_col,
        Value::Timestamp(reference),
        Value::Timestamp(doomsday),
    );

    TimestampedPartitions {
        unchanged_open: partitions.unchanged_open,
        closed,
        opened,
        carried_closed: partitions.carried_closed,
    }
}

/// Overwrite the `delimited` column of every row in `table` with `value`.
/// `table`'s schema is unchanged; only cell values move.
fn rewrite_delimited(table: &TabularValue, delimited_col: &str, value: Value) -> TabularValue {
    let idx = table
        .schema()
        .position(delimited_col)
        .expect("delimited column present on a closing partition");
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut values = row.0.clone();
            values[idx] = value.clone();
            Row::new(values)
        })
        .collect();
    TabularValue::new(table.schema().clone(), rows)
}

/// Append `captured` and `delimited` columns (in that order) to every row
/// of a business-columns-only `table`, with the given constant values.
fn append_validity(
    table: &TabularValue,
    captured_col: &str,
    delimited_col: &str,
    captured_value: Value,
    delimited_value: Value,
) -> TabularValue {
    let mut schema = table.schema().clone();
    schema.push(ColumnSchema::new(captured_col, DataType::Timestamp, false));
    schema.push(ColumnSchema::new(delimited_col, DataType::Timestamp, false));

    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut values = row.0.clone();
            values.push(captured_value.clone());
            values.push(delimited_value.clone());
            Row::new(values)
        })
        .collect();
    TabularValue::new(schema, rows)
}
