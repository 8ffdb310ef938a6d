//! Declared column data types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared data type of a dataset column.
///
/// Drives task-shape decisions: numeric targets get regression metrics and
/// residual-based confidence, categorical targets get classification
/// metrics and per-class confidence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    Quantity,
    Binary,
    Categorical,
    Tags,
    Date,
    Datetime,
    Array,
    Text,
}

impl ColumnType {
    /// Whether values of this type are ordinary numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Quantity
        )
    }

    /// Whether values of this type form a discrete label set.
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            ColumnType::Binary | ColumnType::Categorical | ColumnType::Tags
        )
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Quantity => "quantity",
            ColumnType::Binary => "binary",
            ColumnType::Categorical => "categorical",
            ColumnType::Tags => "tags",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Array => "array",
            ColumnType::Text => "text",
        };
        write!(f, "{name}")
    }
}
