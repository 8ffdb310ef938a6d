//! Time-series task configuration

use serde::{Deserialize, Serialize};

fn default_horizon() -> usize {
    1
}

/// Settings for multi-series / forecasting tasks.
///
/// Carried on the execution context so blocks can tell a forecasting run
/// apart from a plain tabular one; the pipeline itself never interprets
/// these fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesSettings {
    /// Column the series is ordered by.
    pub order_by: String,
    /// Columns that partition the data into independent series.
    #[serde(default)]
    pub group_by: Vec<String>,
    /// Number of historical rows visible per prediction.
    pub window: usize,
    /// Number of future steps predicted per row.
    #[serde(default = "default_horizon")]
    pub horizon: usize,
}
