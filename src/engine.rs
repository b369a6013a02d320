//! Historization Engine (spec §4.4): composes the schema aligner, the
//! partitioner and the interval closer into the single deterministic
//! transformation `(history, feed, pk, reference) -> history'`.

use std::collections::HashMap;

use chrono::Duration;
use tracing::{debug, warn};

use crate::align::align;
use crate::error::HistorizeError;
use crate::interval::{close_intervals, Timestamp};
use crate::partition::{classify, row_key};
use crate::table::TabularValue;
use crate::value::{DataType, Value};

/// Reserved technical column names on a historized table (spec §3).
pub const CAPTURED_COL: &str = "captured";
pub const DELIMITED_COL: &str = "delimited";

/// The engine's entire configuration surface (spec §6/§7c).
#[derive(Debug, Clone, Copy)]
pub struct HistorizeOptions {
    /// Minimum gap enforced between a closed interval's `delimited` and the
    /// next interval's `captured` for the same key. Must be strictly
    /// positive. Default: 1 millisecond.
    pub offset: Duration,
    /// The sentinel timestamp denoting "currently open". Must be strictly
    /// greater than the `reference` passed to [`historize`]. Default:
    /// `5875-06-03T00:00:00Z`, matching the legacy convention spec §6
    /// recommends.
    pub doomsday: Timestamp,
}

impl Default for HistorizeOptions {
    fn default() -> Self {
        Self {
            offset: Duration::milliseconds(1),
            doomsday: *crate::DOOMSDAY,
        }
    }
}

/// `historize(history, feed, primaryKey, reference, options) -> history'`
/// (spec §6). The sole public entry point of this crate.
///
/// `history` must carry `captured`/`delimited` timestamp columns; `feed`
/// carries business columns only. Both are consumed by value-ish (taken by
/// reference; nothing here mutates its argument) and a brand new
/// [`TabularValue`] is returned — history rows are never mutated in place
/// (spec §3 "Lifecycle").
#[tracing::instrument(
    skip(history, feed, options),
    fields(history_rows = history.len(), feed_rows = feed.len(), pk = ?primary_key)
)]
pub fn historize(
    history: &TabularValue,
    feed: &TabularValue,
    primary_key: &[String],
    reference: Timestamp,
    options: HistorizeOptions,
) -> Result<TabularValue, HistorizeError> {
    validate(history, feed, primary_key, reference, &options)?;

    debug!("aligning schemas");
    let (history_aligned, feed_aligned) = align(history, feed, &[CAPTURED_COL, DELIMITED_COL])?;

    debug!("partitioning by primary key");
    let partitions = classify(
        &history_aligned,
        &feed_aligned,
        primary_key,
        CAPTURED_COL,
        DELIMITED_COL,
        Value::Timestamp(options.doomsday),
    )?;

    if partitions.opening.is_empty() && !history.is_empty() {
        warn!("feed produced no opening rows against a non-empty history: mass technical deletion");
    }

    debug!("closing and opening validity intervals");
    let timestamped = close_intervals(
        partitions,
        CAPTURED_COL,
        DELIMITED_COL,
        reference,
        options.offset,
        options.doomsday,
    );

    debug!("concatenating partitions");
    let result = timestamped
        .unchanged_open
        .union(&timestamped.closed)?
        .union(&timestamped.opened)?
        .union(&timestamped.carried_closed)?;

    Ok(result)
}

fn validate(
    history: &TabularValue,
    feed: &TabularValue,
    primary_key: &[String],
    reference: Timestamp,
    options: &HistorizeOptions,
) -> Result<(), HistorizeError> {
    if primary_key.is_empty() {
        return Err(HistorizeError::ConfigurationError {
            reason: "primary key must be non-empty".to_string(),
        });
    }
    for col in primary_key {
        if !history.schema().contains(col) {
            return Err(HistorizeError::ConfigurationError {
                reason: format!("primary key column `{col}` is not present in history"),
            });
        }
        if !feed.schema().contains(col) {
            return Err(HistorizeError::ConfigurationError {
                reason: format!("primary key column `{col}` is not present in feed"),
            });
        }
    }

    for (name, expected) in [(CAPTURED_COL, DataType::Timestamp), (DELIMITED_COL, DataType::Timestamp)] {
        match history.schema().get(name) {
            None => {
                return Err(HistorizeError::MalformedHistory {
                    reason: format!("history is missing technical column `{name}`"),
                })
            }
            Some(col) if col.data_type != expected => {
                return Err(HistorizeError::MalformedHistory {
                    reason: format!(
                        "history column `{name}` has type {}, expected {}",
                        col.data_type.as_str(),
                        expected.as_str()
                    ),
                })
            }
            Some(_) => {}
        }
    }

    if options.offset <= Duration::zero() {
        return Err(HistorizeError::ConfigurationError {
            reason: "offset must be strictly positive".to_string(),
        });
    }
    if options.doomsday <= reference {
        return Err(HistorizeError::ConfigurationError {
            reason: "doomsday must be strictly greater than reference".to_string(),
        });
    }

    check_interval_invariants(history, primary_key)?;

    Ok(())
}

/// I1 (`captured < delimited` for every row) and I2 (intervals `[captured,
/// delimited)` sharing a key are pairwise non-overlapping), checked on
/// `history` before the rest of the pipeline runs. I3 (at most one open row
/// per key) is enforced separately, inside `classify`, as
/// `HistoryInvariantViolated` — it needs the doomsday sentinel value, which
/// isn't in scope here.
fn check_interval_invariants(history: &TabularValue, primary_key: &[String]) -> Result<(), HistorizeError> {
    let captured_idx = history
        .schema()
        .position(CAPTURED_COL)
        .expect("checked present by the caller");
    let delimited_idx = history
        .schema()
        .position(DELIMITED_COL)
        .expect("checked present by the caller");

    let mut by_key: HashMap<String, Vec<(Timestamp, Timestamp)>> = HashMap::new();

    for row in history.rows() {
        let captured = match row.get(captured_idx) {
            Some(Value::Timestamp(t)) => *t,
            _ => {
                return Err(HistorizeError::MalformedHistory {
                    reason: "history row has a non-timestamp `captured` value".to_string(),
                })
            }
        };
        let delimited = match row.get(delimited_idx) {
            Some(Value::Timestamp(t)) => *t,
            _ => {
                return Err(HistorizeError::MalformedHistory {
                    reason: "history row has a non-timestamp `delimited` value".to_string(),
                })
            }
        };
        if captured >= delimited {
            return Err(HistorizeError::MalformedHistory {
                reason: format!(
                    "history row violates I1: captured ({captured}) must be strictly before delimited ({delimited})"
                ),
            });
        }

        // A null pk component never matches another row (spec §4.2), so
        // such a row can never overlap anything and is skipped for I2.
        if let Some(key) = row_key(row, history.schema(), primary_key) {
            by_key.entry(key).or_default().push((captured, delimited));
        }
    }

    for (key, mut intervals) in by_key {
        intervals.sort_by_key(|(captured, _)| *captured);
        for pair in intervals.windows(2) {
            let (_, prev_delimited) = pair[0];
            let (next_captured, _) = pair[1];
            if next_captured < prev_delimited {
                return Err(HistorizeError::MalformedHistory {
                    reason: format!(
                        "history violates I2: overlapping intervals for primary key {key} \
                         (one delimited at {prev_delimited}, the next captured at {next_captured})"
                    ),
                });
            }
        }
    }

    Ok(())
}
