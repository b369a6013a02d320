//! Schema Aligner (spec §4.1). Reconciles the column set of an existing
//! history with the column set of a freshly arrived feed so the rest of the
//! engine can work against one uniform schema.
//!
//! Grounded on `veridit-sql_saga`'s `introspect::build_planner_context`,
//! which unifies `identity_columns`/`all_lookup_cols`/`pk_cols` into a
//! single deduplicated column list before planning begins — the same idea
//! applied here to the full business column set, but with the spec's exact
//! canonical ordering instead of a sorted `BTreeSet` (ordering here must be
//! deterministic and data-independent, not merely deduplicated).

use crate::error::HistorizeError;
use crate::schema::{ColumnSchema, Schema};
use crate::table::{Row, TabularValue};
use crate::value::Value;

/// Align `history` and `feed` onto one shared business schema, returning
/// `(history', feed')`.
///
/// `ignore` names columns that must be preserved on `history'` unchanged
/// (re-appended at the end, after the aligned business columns) but are
/// not expected, and never added, to `feed'`. In `historize` this is
/// always `["captured", "delimited"]`.
///
/// Column order in the result: columns present on both sides, in their
/// order within `history`'s business columns; then columns present only
/// in `feed`, in `feed`'s order; then columns present only in `history`,
/// last. This order is a pure function of the two schemas, never of row
/// data, so repeated alignment of the same two schemas is always
/// byte-identical (spec §4.1 step 2).
///
/// Column deletion handling (the spec's one open question, resolved per
/// its own recommendation): a column that existed in history but has been
/// dropped from the feed is *not* dropped from the output. It is kept,
/// filled with null on the feed side. If a still-open history row holds a
/// non-null value for that column, the next historization run will see it
/// as a genuine payload change (null vs. non-null, spec §4.2) and close
/// that row — the column is never silently forgotten.
pub fn align(
    history: &TabularValue,
    feed: &TabularValue,
    ignore: &[&str],
) -> Result<(TabularValue, TabularValue), HistorizeError> {
    let h_cols: Vec<ColumnSchema> = history
        .schema()
        .columns()
        .iter()
        .filter(|c| !ignore.contains(&c.name.as_str()))
        .cloned()
        .collect();
    let f_cols: Vec<ColumnSchema> = feed.schema().columns().to_vec();

    // I6 (nullability union) and the type check both live in
    // `Schema::canonical_merge`, the reusable building block spec §9's
    // "schema evolution coupling" note asks for.
    let canonical = Schema::canonical_merge(&h_cols, &f_cols)?;

    let ignore_cols: Vec<ColumnSchema> = ignore
        .iter()
        .filter_map(|name| history.schema().get(name).cloned())
        .collect();

    let mut history_prime_cols = canonical.clone();
    history_prime_cols.extend(ignore_cols.iter().cloned());

    let history_prime = TabularValue::new(
        Schema::new(history_prime_cols),
        history
            .rows()
            .iter()
            .map(|row| {
                let mut values: Vec<Value> = project_row(row, history.schema(), &canonical);
                for ic in &ignore_cols {
                    let idx = history.schema().position(&ic.name).expect("ignore column present");
                    values.push(row.get(idx).expect("row matches schema width").clone());
                }
                Row::new(values)
            })
            .collect(),
    );

    let feed_prime = TabularValue::new(
        Schema::new(canonical.clone()),
        feed.rows()
            .iter()
            .map(|row| Row::new(project_row(row, feed.schema(), &canonical)))
            .collect(),
    );

    Ok((history_prime, feed_prime))
}

/// Build a row's values against `canonical`, reading from `source_schema`
/// where the column exists and filling `Value::Null` where it doesn't.
fn project_row(row: &Row, source_schema: &Schema, canonical: &[ColumnSchema]) -> Vec<Value> {
    canonical
        .iter()
        .map(|col| match source_schema.position(&col.name) {
            Some(idx) => row.get(idx).expect("row matches schema width").clone(),
            None => Value::Null,
        })
        .collect()
}
