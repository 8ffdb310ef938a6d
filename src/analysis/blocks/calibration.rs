//! Confidence calibration block
//!
//! Split-conformal style calibration. At train time the block turns
//! validation residuals (numeric targets) or per-class validation accuracy
//! (classification targets) into a calibration payload persisted with the
//! insight record. At inference time it reads that payload back from the
//! context's trained insights and appends per-row confidence columns to
//! the explanation table.

use crate::analysis::block::AnalysisBlock;
use crate::analysis::context::ExecutionContext;
use crate::analysis::insights::InsightRecord;
use crate::analysis::registry::{parse_config, BlockConfig};
use crate::data::{value_to_f64, Table};
use crate::error::{Error, Result};
use crate::metrics::{encode_labels, label_string, ConfusionMatrix};
use crate::stats::conformal_quantile;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn default_alpha() -> f64 {
    0.1
}

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default = "default_alpha")]
    alpha: f64,
}

/// Calibration payload stored under [`ConfidenceCalibration::CALIBRATION`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Calibration {
    /// Numeric targets: conformal quantile of absolute residuals.
    ResidualQuantile {
        alpha: f64,
        quantile: f64,
        samples: usize,
    },
    /// Classification targets: per-class validation accuracy.
    ClassAccuracy {
        classes: BTreeMap<String, f64>,
        fallback: f64,
    },
}

/// Calibrates prediction confidence from validation behavior.
///
/// Train-time writes: `confidence.calibration` (the payload) and
/// `confidence.global` (empirical coverage for numeric targets, overall
/// accuracy for classification). Inference-time: appends a `confidence`
/// column (plus `confidence_lower`/`confidence_upper` bounds for numeric
/// targets) and copies `confidence.global` into the global mapping.
/// Without a persisted calibration payload the explain pass degrades to a
/// no-op.
#[derive(Clone, Copy, Debug)]
pub struct ConfidenceCalibration {
    alpha: f64,
}

impl ConfidenceCalibration {
    pub const ID: &'static str = "confidence_calibration";

    /// Insight key for the calibration payload.
    pub const CALIBRATION: &'static str = "confidence.calibration";
    /// Insight key for the single global confidence number.
    pub const GLOBAL: &'static str = "confidence.global";

    /// Calibrator with miscoverage rate `alpha` (0.1 → 90% target
    /// coverage).
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn from_config(config: &BlockConfig) -> Result<Self> {
        let cfg: Config = parse_config(Self::ID, config)?;
        if !(cfg.alpha > 0.0 && cfg.alpha < 1.0) {
            return Err(Error::BlockConfig {
                block: Self::ID.to_string(),
                reason: format!("alpha must be in (0, 1), got {}", cfg.alpha),
            });
        }
        Ok(Self::new(cfg.alpha))
    }

    fn calibrate_numeric(
        &self,
        predictions: &[Value],
        truths: &[Value],
        target: &str,
    ) -> Result<(Calibration, f64)> {
        let decode = |values: &[Value], what: &str| -> Result<Vec<f64>> {
            values
                .iter()
                .map(|v| value_to_f64(v).ok_or_else(|| Error::NonNumeric(what.to_string())))
                .collect()
        };
        let p = decode(predictions, "prediction")?;
        let t = decode(truths, target)?;
        let residuals: Vec<f64> = p.iter().zip(t.iter()).map(|(a, b)| (a - b).abs()).collect();
        let quantile = conformal_quantile(&residuals, self.alpha);
        let covered = residuals.iter().filter(|&&r| r <= quantile).count();
        let coverage = covered as f64 / residuals.len().max(1) as f64;
        Ok((
            Calibration::ResidualQuantile {
                alpha: self.alpha,
                quantile,
                samples: residuals.len(),
            },
            coverage,
        ))
    }

    fn calibrate_classes(predictions: &[Value], truths: &[Value]) -> (Calibration, f64) {
        let (pred_codes, truth_codes, vocabulary) = encode_labels(predictions, truths);
        let cm = ConfusionMatrix::from_codes(&pred_codes, &truth_codes, vocabulary.len());
        let mut classes = BTreeMap::new();
        for (code, label) in vocabulary.iter().enumerate() {
            if cm.support(code) > 0 {
                classes.insert(label.clone(), cm.recall(code));
            }
        }
        let fallback = cm.accuracy();
        (Calibration::ClassAccuracy { classes, fallback }, fallback)
    }
}

impl AnalysisBlock for ConfidenceCalibration {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn is_applicable(&self, ctx: &ExecutionContext) -> bool {
        ctx.is_numeric || ctx.is_classification
    }

    fn writes(&self) -> &'static [&'static str] {
        &[Self::CALIBRATION, Self::GLOBAL]
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
        if predictions.len() != truths.len() {
            return Err(Error::LengthMismatch {
                what: "calibration predictions".to_string(),
                expected: truths.len(),
                actual: predictions.len(),
            });
        }

        let (calibration, global) = if ctx.is_numeric {
            self.calibrate_numeric(&predictions, truths, &ctx.target)?
        } else {
            Self::calibrate_classes(&predictions, truths)
        };
        insights.insert_serialized(Self::CALIBRATION, &calibration)?;
        insights.insert(Self::GLOBAL, json!(global));
        Ok(insights)
    }

    fn explain(
        &mut self,
        mut rows: Table,
        mut global: InsightRecord,
        ctx: &ExecutionContext,
    ) -> Result<(Table, InsightRecord)> {
        let Some(calibration) = ctx.trained_insights.get_as::<Calibration>(Self::CALIBRATION)
        else {
            tracing::debug!("no persisted calibration, skipping confidence columns");
            return Ok((rows, global));
        };
        let Some(predictions) = rows.column("prediction").map(|c| c.to_vec()) else {
            tracing::debug!("prediction column absent, skipping confidence columns");
            return Ok((rows, global));
        };

        match calibration {
            Calibration::ResidualQuantile { alpha, quantile, .. } => {
                let confidence = vec![json!(1.0 - alpha); predictions.len()];
                let bound = |sign: f64| -> Vec<Value> {
                    predictions
                        .iter()
                        .map(|v| match value_to_f64(v) {
                            Some(x) => json!(x + sign * quantile),
                            None => Value::Null,
                        })
                        .collect()
                };
                rows.add_column("confidence", confidence)?;
                rows.add_column("confidence_lower", bound(-1.0))?;
                rows.add_column("confidence_upper", bound(1.0))?;
            }
            Calibration::ClassAccuracy { classes, fallback } => {
                let confidence: Vec<Value> = predictions
                    .iter()
                    .map(|v| json!(classes.get(&label_string(v)).copied().unwrap_or(fallback)))
                    .collect();
                rows.add_column("confidence", confidence)?;
            }
        }
        if let Some(value) = ctx.trained_insights.get(Self::GLOBAL) {
            global.insert(Self::GLOBAL, value.clone());
        }
        Ok((rows, global))
    }
}
