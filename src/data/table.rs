//! Ordered column table
//!
//! `Table` is the row-indexed container used for raw validation data, for
//! prediction batches and for per-row explanation output. Columns keep
//! insertion order; every column has exactly `len()` cells. The mutating
//! surface only ever appends columns, never drops or reorders rows, which
//! is what keeps the explanation row-count invariant checkable at the
//! pipeline level.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Column-ordered table of JSON values with a fixed row count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    cells: HashMap<String, Vec<Value>>,
    rows: usize,
}

impl Table {
    /// Create an empty table with no columns and no rows.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table from a single column. The column fixes the row count.
    pub fn from_column(name: impl Into<String>, values: Vec<Value>) -> Self {
        let name = name.into();
        let rows = values.len();
        let mut cells = HashMap::new();
        cells.insert(name.clone(), values);
        Self {
            columns: vec![name],
            cells,
            rows,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has zero rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Cells of a column, if present.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.cells.get(name).map(Vec::as_slice)
    }

    /// Append a column. Fails on duplicate names and on row-count
    /// mismatches against the existing columns.
    pub fn add_column(&mut self, name: impl Into<String>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.cells.contains_key(&name) {
            return Err(Error::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && values.len() != self.rows {
            return Err(Error::LengthMismatch {
                what: format!("column '{name}'"),
                expected: self.rows,
                actual: values.len(),
            });
        }
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        self.columns.push(name.clone());
        self.cells.insert(name, values);
        Ok(())
    }

    /// Cells of a column decoded as `f64`.
    ///
    /// Numbers pass through, booleans map to 0/1, numeric strings are
    /// parsed. Any other cell fails the whole column.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>> {
        let cells = self
            .column(name)
            .ok_or_else(|| Error::MissingColumn(name.to_string()))?;
        cells
            .iter()
            .map(|v| value_to_f64(v).ok_or_else(|| Error::NonNumeric(name.to_string())))
            .collect()
    }
}

/// Decode a single JSON value as `f64` where a reasonable reading exists.
pub fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
