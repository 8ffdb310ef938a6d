//! Execution context passed to every block invocation

use super::insights::InsightRecord;
use crate::data::{ColumnType, EncodedDataset, Table, TimeseriesSettings};
use crate::metrics::Metric;
use crate::predictor::Predictor;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only bundle of everything a block may consult: the trained
/// predictor, the datasets it was validated on, column metadata, task
/// shape and the configured accuracy metrics.
///
/// Built once per pipeline run and never mutated by blocks. For an
/// inference-time pass, `trained_insights` carries the record persisted at
/// train time; during the train-time pass it is empty.
#[derive(Clone)]
pub struct ExecutionContext {
    pub predictor: Arc<dyn Predictor>,
    pub target: String,
    pub input_columns: Vec<String>,
    pub column_types: HashMap<String, ColumnType>,
    pub validation: Table,
    pub encoded_train: EncodedDataset,
    pub encoded_validation: EncodedDataset,
    pub is_classification: bool,
    pub is_numeric: bool,
    pub is_multi_series: bool,
    pub statistics: HashMap<String, Value>,
    pub timeseries: Option<TimeseriesSettings>,
    pub metrics: Vec<Metric>,
    pub pretrained_text_encoder: bool,
    pub trained_insights: InsightRecord,
}

impl ExecutionContext {
    /// Create a context with the required pieces. Input columns default to
    /// the distinct feature source columns of the encoded validation set;
    /// everything else starts empty or false and is filled via `with_*`.
    pub fn new(
        predictor: Arc<dyn Predictor>,
        target: impl Into<String>,
        validation: Table,
        encoded_train: EncodedDataset,
        encoded_validation: EncodedDataset,
    ) -> Self {
        let mut input_columns: Vec<String> = Vec::new();
        for name in encoded_validation.feature_columns() {
            if !input_columns.contains(name) {
                input_columns.push(name.clone());
            }
        }
        Self {
            predictor,
            target: target.into(),
            input_columns,
            column_types: HashMap::new(),
            validation,
            encoded_train,
            encoded_validation,
            is_classification: false,
            is_numeric: false,
            is_multi_series: false,
            statistics: HashMap::new(),
            timeseries: None,
            metrics: Vec::new(),
            pretrained_text_encoder: false,
            trained_insights: InsightRecord::new(),
        }
    }

    /// Declare the target's data type; sets the task-shape flags from it.
    pub fn with_target_type(mut self, column_type: ColumnType) -> Self {
        self.is_classification = column_type.is_categorical();
        self.is_numeric = column_type.is_numeric();
        self.column_types.insert(self.target.clone(), column_type);
        self
    }

    /// Declare input column types.
    pub fn with_column_types(mut self, types: HashMap<String, ColumnType>) -> Self {
        self.column_types.extend(types);
        self
    }

    /// Override the ordered input column list.
    pub fn with_input_columns(mut self, columns: Vec<String>) -> Self {
        self.input_columns = columns;
        self
    }

    /// Configure the accuracy metrics; the first is the primary metric.
    pub fn with_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Attach precomputed dataset statistics.
    pub fn with_statistics(mut self, statistics: HashMap<String, Value>) -> Self {
        self.statistics = statistics;
        self
    }

    /// Mark this as a multi-series task and attach its settings.
    pub fn with_timeseries(mut self, settings: TimeseriesSettings) -> Self {
        self.is_multi_series = !settings.group_by.is_empty();
        self.timeseries = Some(settings);
        self
    }

    /// Flag that a pretrained text encoder is in use.
    pub fn with_pretrained_text_encoder(mut self, flag: bool) -> Self {
        self.pretrained_text_encoder = flag;
        self
    }

    /// Load the record persisted at train time, for inference-time passes.
    pub fn with_trained_insights(mut self, insights: InsightRecord) -> Self {
        self.trained_insights = insights;
        self
    }

    /// Primary metric: first configured, or a task-shape default.
    pub fn primary_metric(&self) -> Metric {
        self.metrics
            .first()
            .copied()
            .unwrap_or_else(|| Metric::default_for(self.is_classification))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::{SingleMixer, StaticMixer};
    use serde_json::json;

    fn context() -> ExecutionContext {
        let raw = Table::from_column("y", vec![json!(1), json!(0)]);
        let encoded = EncodedDataset::new(
            raw.clone(),
            vec!["a".to_string(), "a".to_string(), "b".to_string()],
            vec![vec![0.0, 0.1, 1.0], vec![1.0, 1.1, 2.0]],
        )
        .unwrap();
        let predictor = Arc::new(SingleMixer::new(Box::new(StaticMixer::new(
            "m",
            vec![json!(1), json!(0)],
        ))));
        ExecutionContext::new(predictor, "y", raw, encoded.clone(), encoded)
    }

    #[test]
    fn test_input_columns_derived_from_features() {
        let ctx = context();
        assert_eq!(ctx.input_columns, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_target_type_sets_task_shape() {
        let ctx = context().with_target_type(ColumnType::Categorical);
        assert!(ctx.is_classification);
        assert!(!ctx.is_numeric);
        assert_eq!(
            ctx.column_types.get("y"),
            Some(&ColumnType::Categorical)
        );

        let ctx = context().with_target_type(ColumnType::Float);
        assert!(!ctx.is_classification);
        assert!(ctx.is_numeric);
    }

    #[test]
    fn test_primary_metric_fallback() {
        let ctx = context().with_target_type(ColumnType::Categorical);
        assert_eq!(ctx.primary_metric(), Metric::default_for(true));
        let ctx = ctx.with_metrics(vec![Metric::Accuracy, Metric::BalancedAccuracy]);
        assert_eq!(ctx.primary_metric(), Metric::Accuracy);
    }

    #[test]
    fn test_timeseries_flags() {
        let ctx = context().with_timeseries(TimeseriesSettings {
            order_by: "ts".to_string(),
            group_by: vec![],
            window: 5,
            horizon: 1,
        });
        assert!(!ctx.is_multi_series);
        assert!(ctx.timeseries.is_some());

        let ctx = context().with_timeseries(TimeseriesSettings {
            order_by: "ts".to_string(),
            group_by: vec!["store".to_string()],
            window: 5,
            horizon: 1,
        });
        assert!(ctx.is_multi_series);
    }

    #[test]
    fn test_trained_insights_default_empty() {
        let ctx = context();
        assert!(ctx.trained_insights.is_empty());
        let mut record = InsightRecord::new();
        record.insert("confidence.global", json!(0.9));
        let ctx = ctx.with_trained_insights(record);
        assert_eq!(ctx.trained_insights.get_f64("confidence.global"), Some(0.9));
    }
}
