//! Mixer correlation diagnostic
//!
//! How similarly do an ensemble's sub-mixers behave? Each mixer predicts
//! over the shared encoded validation set, predictions reduce to a numeric
//! label sequence, and the pairwise Pearson matrix across those sequences
//! lands in the insight record. Highly correlated mixers are redundant;
//! anti-correlated ones disagree systematically.

use crate::analysis::block::AnalysisBlock;
use crate::analysis::context::ExecutionContext;
use crate::analysis::insights::InsightRecord;
use crate::analysis::registry::BlockConfig;
use crate::data::value_to_f64;
use crate::error::Result;
use crate::metrics::label_string;
use crate::stats::correlation_matrix;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Pairwise Pearson correlation across an ensemble's sub-mixer
/// predictions.
///
/// Only meaningful for predictors with the ensemble capability and a
/// discrete target, so [`is_applicable`](AnalysisBlock::is_applicable)
/// requires both; for anything else the block is silently skipped. Writes
/// the single key `ensemble.mixer_correlation` holding the mixer names and
/// the N×N matrix (symmetric, unit diagonal, entries in [-1, 1]; one
/// mixer yields the trivial 1×1 matrix). Train-time only.
#[derive(Clone, Copy, Debug, Default)]
pub struct MixerCorrelation;

impl MixerCorrelation {
    pub const ID: &'static str = "mixer_correlation";

    /// Insight key for the correlation payload.
    pub const CORRELATION: &'static str = "ensemble.mixer_correlation";

    pub fn new() -> Self {
        Self
    }

    /// The block takes no arguments; any provided mapping is ignored.
    pub fn from_config(_config: &BlockConfig) -> Result<Self> {
        Ok(Self)
    }
}

/// Reduce predictions to a flat numeric sequence: values that all read as
/// numbers are used directly, anything else is dictionary-coded against
/// the sorted label vocabulary.
fn label_series(predictions: &[Value]) -> Vec<f64> {
    let numeric: Option<Vec<f64>> = predictions.iter().map(value_to_f64).collect();
    if let Some(series) = numeric {
        return series;
    }
    let vocabulary: Vec<String> = predictions
        .iter()
        .map(label_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    predictions
        .iter()
        .map(|v| vocabulary.binary_search(&label_string(v)).unwrap_or(0) as f64)
        .collect()
}

impl AnalysisBlock for MixerCorrelation {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn is_applicable(&self, ctx: &ExecutionContext) -> bool {
        ctx.predictor.ensemble().is_some() && ctx.is_classification
    }

    fn writes(&self) -> &'static [&'static str] {
        &[Self::CORRELATION]
    }

    fn analyze(
        &mut self,
        mut insights: InsightRecord,
        ctx: &ExecutionContext,
    ) -> Result<InsightRecord> {
        let Some(ensemble) = ctx.predictor.ensemble() else {
            return Ok(insights);
        };
        let mut names = Vec::new();
        let mut series = Vec::new();
        for mixer in ensemble.mixers() {
            let predictions = mixer.predict(&ctx.encoded_validation)?;
            names.push(mixer.name().to_string());
            series.push(label_series(&predictions));
        }
        let matrix = correlation_matrix(&series);
        insights.insert(
            Self::CORRELATION,
            json!({"mixers": names, "matrix": matrix}),
        );
        Ok(insights)
    }
}
