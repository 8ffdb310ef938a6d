//! Dataset containers shared by the analysis pipeline
//!
//! - `Table`: ordered column table with a fixed row count (raw data,
//!   prediction batches, per-row explanation output)
//! - `EncodedDataset`: raw rows paired with their featurized representation
//! - `ColumnType`: declared column data types
//! - `TimeseriesSettings`: forecasting-task configuration

mod column;
mod encoded;
mod table;
mod timeseries;

pub use column::ColumnType;
pub use encoded::EncodedDataset;
pub use table::{value_to_f64, Table};
pub use timeseries::TimeseriesSettings;
