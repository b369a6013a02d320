use chrono::{DateTime, Utc};
use historize::schema::{ColumnSchema, Schema};
use historize::table::{Row, TabularValue};
use historize::value::{DataType, Value};

pub fn ts(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid RFC 3339 timestamp literal")
}

pub fn doomsday() -> DateTime<Utc> {
    *historize::DOOMSDAY
}

pub fn col(name: &str, ty: DataType, nullable: bool) -> ColumnSchema {
    ColumnSchema::new(name, ty, nullable)
}

/// Build a historized-table schema: business columns, then `captured`,
/// then `delimited` (spec invariant I5).
pub fn history_schema(business: Vec<ColumnSchema>) -> Schema {
    let mut cols = business;
    cols.push(col("captured", DataType::Timestamp, false));
    cols.push(col("delimited", DataType::Timestamp, false));
    Schema::new(cols)
}

pub fn feed_schema(business: Vec<ColumnSchema>) -> Schema {
    Schema::new(business)
}

/// A stable, order-independent string rendering of a row — used only to
/// compare result tables as multisets, never to inspect individual cells.
pub fn row_repr(row: &Row) -> String {
    (0..)
        .map_while(|i| row.get(i))
        .map(value_repr)
        .collect::<Vec<_>>()
        .join("|")
}

fn value_repr(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => format!("b{b}"),
        Value::Int64(i) => format!("i{i}"),
        Value::Float64(f) => format!("f{:x}", f.to_bits()),
        Value::Utf8(s) => format!("s{s}"),
        Value::Binary(b) => format!("x{b:?}"),
        Value::Timestamp(t) => format!("t{}", t.to_rfc3339()),
    }
}

pub fn assert_same_rows(actual: &TabularValue, expected: &TabularValue) {
    let mut actual_repr: Vec<String> = actual.rows().iter().map(row_repr).collect();
    let mut expected_repr: Vec<String> = expected.rows().iter().map(row_repr).collect();
    actual_repr.sort();
    expected_repr.sort();
    assert_eq!(
        actual_repr, expected_repr,
        "result rows do not match expected rows as a multiset"
    );
}

pub fn row(values: Vec<Value>) -> Row {
    Row::new(values)
}

/// Installs a readable `tracing` subscriber for the current test binary so
/// `RUST_LOG=debug cargo test -- --nocapture` shows the engine's span/event
/// output. Idempotent across the many `#[test]` functions in one binary —
/// `try_init` just no-ops after the first call.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
