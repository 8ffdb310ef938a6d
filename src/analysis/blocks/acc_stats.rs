//! Accuracy statistics block

use crate::analysis::block::AnalysisBlock;
use crate::analysis::context::ExecutionContext;
use crate::analysis::insights::InsightRecord;
use crate::analysis::registry::BlockConfig;
use crate::error::{Error, Result};
use crate::metrics::{encode_labels, ConfusionMatrix};
use serde_json::{json, Value};

/// Scores the trained predictor over the validation set with every
/// configured metric.
///
/// Writes `accuracy.scores` (metric key → score) and, for classification
/// tasks, `accuracy.confusion_matrix` (label vocabulary + count matrix).
#[derive(Clone, Copy, Debug, Default)]
pub struct AccuracyStats;

impl AccuracyStats {
    pub const ID: &'static str = "accuracy_stats";

    /// Insight key for the metric score mapping.
    pub const SCORES: &'static str = "accuracy.scores";
    /// Insight key for the classification confusion matrix.
    pub const CONFUSION_MATRIX: &'static str = "accuracy.confusion_matrix";

    pub fn new() -> Self {
        Self
    }

    /// The block takes no arguments; any provided mapping is ignored.
    pub fn from_config(_config: &BlockConfig) -> Result<Self> {
        Ok(Self)
    }
}

impl AnalysisBlock for AccuracyStats {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn writes(&self) -> &'static [&'static str] {
        &[Self::SCORES, Self::CONFUSION_MATRIX]
    }

    fn analyze(
        &mut self,
        mut insights: InsightRecord,
        ctx: &ExecutionContext,
    ) -> Result<InsightRecord> {
        let truths = ctx
            .validation
            .column(&ctx.target)
            .ok_or_else(|| Error::MissingColumn(ctx.target.clone()))?;
        let predictions = ctx.predictor.predict(&ctx.encoded_validation)?;

        let metrics = if ctx.metrics.is_empty() {
            vec![ctx.primary_metric()]
        } else {
            ctx.metrics.clone()
        };
        let mut scores = serde_json::Map::new();
        for metric in &metrics {
            scores.insert(
                metric.key().to_string(),
                json!(metric.score(&predictions, truths)?),
            );
        }
        insights.insert(Self::SCORES, Value::Object(scores));

        if ctx.is_classification {
            let (pred_codes, truth_codes, vocabulary) = encode_labels(&predictions, truths);
            let cm = ConfusionMatrix::from_codes(&pred_codes, &truth_codes, vocabulary.len());
            insights.insert(
                Self::CONFUSION_MATRIX,
                json!({"labels": vocabulary, "matrix": cm.counts()}),
            );
        }
        Ok(insights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, EncodedDataset, Table};
    use crate::metrics::{Average, Metric};
    use crate::predictor::{SingleMixer, StaticMixer};
    use approx::assert_relative_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn classification_context() -> ExecutionContext {
        let raw = Table::from_column(
            "label",
            vec![json!("a"), json!("b"), json!("b"), json!("a")],
        );
        let encoded = EncodedDataset::new(
            raw.clone(),
            vec!["x".to_string()],
            vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]],
        )
        .unwrap();
        let predictor = Arc::new(SingleMixer::new(Box::new(StaticMixer::new(
            "m",
            vec![json!("a"), json!("b"), json!("a"), json!("a")],
        ))));
        ExecutionContext::new(predictor, "label", raw, encoded.clone(), encoded)
            .with_target_type(ColumnType::Categorical)
            .with_metrics(vec![Metric::Accuracy, Metric::F1(Average::Weighted)])
    }

    #[test]
    fn test_writes_scores_and_confusion_matrix() {
        let mut block = AccuracyStats::new();
        let ctx = classification_context();
        let insights = block.analyze(InsightRecord::new(), &ctx).unwrap();

        let scores = insights.get(AccuracyStats::SCORES).unwrap();
        assert_relative_eq!(scores["accuracy"].as_f64().unwrap(), 0.75);
        assert!(scores["f1_weighted"].as_f64().unwrap() > 0.0);

        let cm = insights.get(AccuracyStats::CONFUSION_MATRIX).unwrap();
        assert_eq!(cm["labels"], json!(["a", "b"]));
        assert_eq!(cm["matrix"][0][0], json!(2)); // both true "a" predicted "a"
    }

    #[test]
    fn test_leaves_upstream_keys_untouched() {
        let mut block = AccuracyStats::new();
        let ctx = classification_context();
        let mut seed = InsightRecord::new();
        seed.insert("upstream.note", json!("kept"));
        let insights = block.analyze(seed, &ctx).unwrap();
        assert_eq!(insights.get("upstream.note"), Some(&json!("kept")));
    }

    #[test]
    fn test_regression_task_skips_confusion_matrix() {
        let raw = Table::from_column("price", vec![json!(1.0), json!(2.0), json!(3.0)]);
        let encoded = EncodedDataset::new(
            raw.clone(),
            vec!["x".to_string()],
            vec![vec![0.0], vec![1.0], vec![2.0]],
        )
        .unwrap();
        let predictor = Arc::new(SingleMixer::new(Box::new(StaticMixer::new(
            "m",
            vec![json!(1.0), json!(2.0), json!(3.0)],
        ))));
        let ctx = ExecutionContext::new(predictor, "price", raw, encoded.clone(), encoded)
            .with_target_type(ColumnType::Float)
            .with_metrics(vec![Metric::R2]);

        let mut block = AccuracyStats::new();
        let insights = block.analyze(InsightRecord::new(), &ctx).unwrap();
        let scores = insights.get(AccuracyStats::SCORES).unwrap();
        assert_relative_eq!(scores["r2"].as_f64().unwrap(), 1.0);
        assert!(!insights.contains_key(AccuracyStats::CONFUSION_MATRIX));
    }

    #[test]
    fn test_missing_target_column_fails() {
        let raw = Table::from_column("other", vec![json!(1)]);
        let encoded =
            EncodedDataset::new(raw.clone(), vec!["x".to_string()], vec![vec![0.0]]).unwrap();
        let predictor = Arc::new(SingleMixer::new(Box::new(StaticMixer::new(
            "m",
            vec![json!(1)],
        ))));
        let ctx = ExecutionContext::new(predictor, "label", raw, encoded.clone(), encoded)
            .with_target_type(ColumnType::Categorical);

        let mut block = AccuracyStats::new();
        let err = block.analyze(InsightRecord::new(), &ctx).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "label"));
    }
}
