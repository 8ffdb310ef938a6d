//! Permutation feature importance block

use crate::analysis::block::AnalysisBlock;
use crate::analysis::context::ExecutionContext;
use crate::analysis::insights::InsightRecord;
use crate::analysis::registry::{parse_config, BlockConfig};
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_seed() -> u64 {
    42
}

fn default_repeats() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct Config {
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_repeats")]
    repeats: usize,
}

/// Model-agnostic feature importance: the primary-metric score drop when
/// one input column's encoded features are shuffled across rows.
///
/// Positive values mean the model leans on the column; values near zero
/// mean shuffling it changes nothing. Shuffles are driven by a seeded RNG,
/// so a run is reproducible from its configuration. Writes
/// `importance.columns` (column name → mean score drop over `repeats`
/// shuffles). Train-time only.
#[derive(Clone, Copy, Debug)]
pub struct PermutationImportance {
    seed: u64,
    repeats: usize,
}

impl PermutationImportance {
    pub const ID: &'static str = "permutation_importance";

    /// Insight key for the column importance mapping.
    pub const COLUMNS: &'static str = "importance.columns";

    pub fn new(seed: u64) -> Self {
        Self { seed, repeats: 1 }
    }

    /// Average the score drop over `repeats` independent shuffles.
    pub fn with_repeats(mut self, repeats: usize) -> Self {
        self.repeats = repeats;
        self
    }

    pub fn from_config(config: &BlockConfig) -> Result<Self> {
        let cfg: Config = parse_config(Self::ID, config)?;
        if cfg.repeats == 0 {
            return Err(Error::BlockConfig {
                block: Self::ID.to_string(),
                reason: "repeats must be >= 1".to_string(),
            });
        }
        Ok(Self::new(cfg.seed).with_repeats(cfg.repeats))
    }
}

impl AnalysisBlock for PermutationImportance {
    fn name(&self) -> &'static str {
        Self::ID
    }

    fn writes(&self) -> &'static [&'static str] {
        &[Self::COLUMNS]
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
        let metric = ctx.primary_metric();
        let baseline_predictions = ctx.predictor.predict(&ctx.encoded_validation)?;
        let baseline = metric.score(&baseline_predictions, truths)?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut importances: BTreeMap<String, f64> = BTreeMap::new();
        for column in &ctx.input_columns {
            if ctx.encoded_validation.feature_indices(column).is_empty() {
                continue;
            }
            let mut total_drop = 0.0;
            for _ in 0..self.repeats {
                let shuffled = ctx.encoded_validation.with_shuffled_column(column, &mut rng);
                let predictions = ctx.predictor.predict(&shuffled)?;
                let score = metric.score(&predictions, truths)?;
                total_drop += if metric.higher_is_better() {
                    baseline - score
                } else {
                    score - baseline
                };
            }
            importances.insert(column.clone(), total_drop / self.repeats as f64);
        }
        insights.insert_serialized(Self::COLUMNS, &importances)?;
        Ok(insights)
    }
}
