//! Ordered column schema for a [`crate::table::TabularValue`].

use crate::error::HistorizeError;
use crate::value::DataType;

/// One column: name, declared type, nullability. Column names are unique
/// and compared case-sensitively within a [`Schema`] — the caller's naming
/// convention is taken as-is, no case-folding is performed.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable,
        }
    }
}

/// Ordered list of [`ColumnSchema`]. Order is significant (it is the
/// physical column order of any [`crate::table::Row`] built against it) but
/// two schemas with the same columns in different order are still
/// "the same shape" for alignment purposes — see [`Schema::column_names`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    columns: Vec<ColumnSchema>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnSchema>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn push(&mut self, column: ColumnSchema) {
        self.columns.push(column);
    }

    /// Reorder this schema's columns to match `order` exactly. Every name
    /// in `order` must be present; panics (a caller bug, not a data error)
    /// if not — callers always derive `order` from this same schema.
    pub fn reordered(&self, order: &[&str]) -> Schema {
        let columns = order
            .iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .unwrap_or_else(|| panic!("column {name} missing from schema during reorder"))
            })
            .collect();
        Schema::new(columns)
    }

    /// Merge two column lists into the canonical alignment order (spec
    /// §4.1 step 2): columns present in both, in `history_cols` order,
    /// with nullability unioned and types checked for a match; then
    /// columns present only in `feed_cols`, in `feed_cols` order, forced
    /// nullable; then columns present only in `history_cols`, last,
    /// forced nullable.
    ///
    /// A pure function of the two column lists alone — never of row data —
    /// so repeated merges of the same two schemas are always
    /// byte-identical.
    pub fn canonical_merge(
        history_cols: &[ColumnSchema],
        feed_cols: &[ColumnSchema],
    ) -> Result<Vec<ColumnSchema>, HistorizeError> {
        let mut canonical = Vec::with_capacity(history_cols.len() + feed_cols.len());

        for hc in history_cols {
            if let Some(fc) = feed_cols.iter().find(|c| c.name == hc.name) {
                if fc.data_type != hc.data_type {
                    return Err(HistorizeError::SchemaIncompatible {
                        column: hc.name.clone(),
                        history_type: hc.data_type.as_str(),
                        feed_type: fc.data_type.as_str(),
                    });
                }
                canonical.push(ColumnSchema::new(
                    hc.name.clone(),
                    hc.data_type,
                    hc.nullable || fc.nullable,
                ));
            }
        }
        for fc in feed_cols {
            if !history_cols.iter().any(|c| c.name == fc.name) {
                canonical.push(ColumnSchema::new(fc.name.clone(), fc.data_type, true));
            }
        }
        for hc in history_cols {
            if !feed_cols.iter().any(|c| c.name == hc.name) {
                canonical.push(ColumnSchema::new(hc.name.clone(), hc.data_type, true));
            }
        }

        Ok(canonical)
    }
}

impl IntoIterator for Schema {
    type Item = ColumnSchema;
    type IntoIter = std::vec::IntoIter<ColumnSchema>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
