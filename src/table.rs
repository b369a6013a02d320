//! The tabular value: an ordered [`Schema`] plus a multiset of [`Row`]s.
//! Row order carries no meaning; every comparison downstream is set-based
//! (spec §3). The operations here are exactly the "Tabular-value interface
//! expected from collaborators" enumerated in spec §6 — schema
//! introspection, row equality, append-column-with-constant-null, filter,
//! union, projection/reordering.

use crate::error::HistorizeError;
use crate::schema::{ColumnSchema, Schema};
use crate::value::Value;

/// One row, positional against its owning [`Schema`].
#[derive(Debug, Clone)]
pub struct Row(pub Vec<Value>);

impl Row {
    pub fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }
}

/// An ordered schema and a multiset of rows conforming to it.
#[derive(Debug, Clone)]
pub struct TabularValue {
    schema: Schema,
    rows: Vec<Row>,
}

impl TabularValue {
    pub fn new(schema: Schema, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a new column, filled with `Value::Null` on every existing
    /// row. The new column is forced `nullable = true` regardless of what
    /// the caller passes — spec §4.1 step 3: a column invented on one side
    /// of an alignment is, by construction, nullable on the other.
    pub fn with_null_column(&self, name: &str, data_type: crate::value::DataType) -> TabularValue {
        let mut schema = self.schema.clone();
        schema.push(ColumnSchema::new(name, data_type, true));
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut values = r.0.clone();
                values.push(Value::Null);
                Row(values)
            })
            .collect();
        TabularValue::new(schema, rows)
    }

    /// Reorder columns to `order`, which must be a permutation of this
    /// table's column names.
    pub fn projected(&self, order: &[&str]) -> TabularValue {
        let indices: Vec<usize> = order
            .iter()
            .map(|name| {
                self.schema
                    .position(name)
                    .unwrap_or_else(|| panic!("column {name} missing during projection"))
            })
            .collect();
        let schema = self.schema.reordered(order);
        let rows = self
            .rows
            .iter()
            .map(|r| Row(indices.iter().map(|&i| r.0[i].clone()).collect()))
            .collect();
        TabularValue::new(schema, rows)
    }

    /// Keep only rows for which `predicate` returns true.
    pub fn filter(&self, predicate: impl Fn(&Row) -> bool) -> TabularValue {
        let rows = self.rows.iter().filter(|r| predicate(r)).cloned().collect();
        TabularValue::new(self.schema.clone(), rows)
    }

    /// Union with another table sharing the exact same schema (same
    /// columns, same order). Row order of the result is the concatenation
    /// of `self` then `other`, but callers must never rely on that order —
    /// it is a set union, not a sequence.
    pub fn union(&self, other: &TabularValue) -> Result<TabularValue, HistorizeError> {
        if self.schema.column_names() != other.schema.column_names() {
            return Err(HistorizeError::MalformedHistory {
                reason: format!(
                    "cannot union tables with differing schemas: {:?} vs {:?}",
                    self.schema.column_names(),
                    other.schema.column_names()
                ),
            });
        }
        let mut rows = self.rows.clone();
        rows.extend(other.rows.iter().cloned());
        Ok(TabularValue::new(self.schema.clone(), rows))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.position(name)
    }
}
