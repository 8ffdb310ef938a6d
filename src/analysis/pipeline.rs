//! Pipeline orchestration across both phases

use super::block::AnalysisBlock;
use super::context::ExecutionContext;
use super::insights::InsightRecord;
use crate::data::Table;
use crate::error::{Error, Phase, Result};
use std::collections::HashSet;

/// Ordered chain of analysis blocks.
///
/// Blocks run strictly in configured order, one at a time, each phase
/// threading its state from block *i* to block *i+1*. Order is
/// caller-controlled and significant: later blocks may read insights
/// written by earlier ones, and the pipeline never reorders or
/// parallelizes. A failing block aborts the run with an error naming the
/// block, the phase and its position; there is no retry or suppression
/// here, that policy belongs to the caller.
pub struct AnalysisPipeline {
    blocks: Vec<Box<dyn AnalysisBlock>>,
}

impl std::fmt::Debug for AnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisPipeline")
            .field(
                "blocks",
                &self.blocks.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AnalysisPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    /// Append a block.
    pub fn add<B: AnalysisBlock + 'static>(&mut self, block: B) {
        self.blocks.push(Box::new(block));
    }

    /// Append an already-boxed block (registry-built).
    pub fn add_boxed(&mut self, block: Box<dyn AnalysisBlock>) {
        self.blocks.push(block);
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the pipeline holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block names in execution order.
    pub fn block_names(&self) -> Vec<&'static str> {
        self.blocks.iter().map(|b| b.name()).collect()
    }

    /// Declared reads with no earlier declared writer, in execution order.
    ///
    /// Purely an audit: a listed key may still be satisfied at runtime by a
    /// seeded record, and blocks are required to degrade when a read is
    /// absent. The registry logs these as warnings at construction time.
    pub fn unmet_reads(&self) -> Vec<(&'static str, &'static str)> {
        let mut written: HashSet<&'static str> = HashSet::new();
        let mut unmet = Vec::new();
        for block in &self.blocks {
            for &key in block.reads() {
                if !written.contains(key) {
                    unmet.push((block.name(), key));
                }
            }
            written.extend(block.writes().iter().copied());
        }
        unmet
    }

    /// Train-time pass: thread `seed` through every applicable block's
    /// `analyze` in order and return the final record.
    ///
    /// On failure the returned [`Error::Block`] carries the record as of
    /// the last completed block; nothing is persisted here, the caller
    /// decides what to keep.
    pub fn run_analysis(
        &mut self,
        seed: InsightRecord,
        ctx: &ExecutionContext,
    ) -> Result<InsightRecord> {
        let mut insights = seed;
        for (position, block) in self.blocks.iter_mut().enumerate() {
            if !block.is_applicable(ctx) {
                tracing::debug!(block = block.name(), position, "skipping inapplicable block");
                continue;
            }
            tracing::debug!(block = block.name(), position, "running analyze");
            let name = block.name().to_string();
            // Snapshot so the failure path can report the record as of the
            // last completed block.
            let checkpoint = insights.clone();
            insights = block.analyze(insights, ctx).map_err(|source| Error::Block {
                block: name,
                phase: Phase::Analyze,
                position,
                source: Box::new(source),
                partial: Box::new(checkpoint),
            })?;
        }
        Ok(insights)
    }

    /// Inference-time pass: seed the row table from `predictions` and the
    /// global mapping empty, thread both through every applicable block's
    /// `explain` in order.
    ///
    /// The row count is pinned to the prediction batch: a block that drops
    /// or adds rows fails the run, attributed to that block.
    pub fn run_explanation(
        &mut self,
        predictions: Table,
        ctx: &ExecutionContext,
    ) -> Result<(Table, InsightRecord)> {
        let expected_rows = predictions.len();
        let mut rows = predictions;
        let mut global = InsightRecord::new();
        for (position, block) in self.blocks.iter_mut().enumerate() {
            if !block.is_applicable(ctx) {
                tracing::debug!(block = block.name(), position, "skipping inapplicable block");
                continue;
            }
            tracing::debug!(block = block.name(), position, "running explain");
            let name = block.name().to_string();
            let checkpoint = global.clone();
            let attribute = move |source: Error, partial: InsightRecord| Error::Block {
                block: name,
                phase: Phase::Explain,
                position,
                source: Box::new(source),
                partial: Box::new(partial),
            };
            let (next_rows, next_global) = match block.explain(rows, global, ctx) {
                Ok(pair) => pair,
                Err(source) => return Err(attribute(source, checkpoint)),
            };
            if next_rows.len() != expected_rows {
                return Err(attribute(
                    Error::LengthMismatch {
                        what: "explanation rows".to_string(),
                        expected: expected_rows,
                        actual: next_rows.len(),
                    },
                    checkpoint,
                ));
            }
            rows = next_rows;
            global = next_global;
        }
        Ok((rows, global))
    }
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, EncodedDataset};
    use crate::predictor::{SingleMixer, StaticMixer};
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> ExecutionContext {
        let raw = Table::from_column("y", vec![json!(1), json!(0)]);
        let encoded = EncodedDataset::new(
            raw.clone(),
            vec!["x".to_string()],
            vec![vec![0.0], vec![1.0]],
        )
        .unwrap();
        let predictor = Arc::new(SingleMixer::new(Box::new(StaticMixer::new(
            "m",
            vec![json!(1), json!(0)],
        ))));
        ExecutionContext::new(predictor, "y", raw, encoded.clone(), encoded)
            .with_target_type(ColumnType::Binary)
    }

    /// Appends its own name to the `trace.order` insight.
    struct MarkerBlock(&'static str);

    impl AnalysisBlock for MarkerBlock {
        fn name(&self) -> &'static str {
            self.0
        }

        fn writes(&self) -> &'static [&'static str] {
            &["trace.order"]
        }

        fn analyze(
            &mut self,
            mut insights: InsightRecord,
            _ctx: &ExecutionContext,
        ) -> Result<InsightRecord> {
            let mut order: Vec<String> = insights.get_as("trace.order").unwrap_or_default();
            order.push(self.0.to_string());
            insights.insert("trace.order", json!(order));
            Ok(insights)
        }
    }

    struct FailingBlock;

    impl AnalysisBlock for FailingBlock {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn analyze(
            &mut self,
            _insights: InsightRecord,
            _ctx: &ExecutionContext,
        ) -> Result<InsightRecord> {
            Err(Error::Predictor("deliberate fault".to_string()))
        }
    }

    struct InapplicableBlock;

    impl AnalysisBlock for InapplicableBlock {
        fn name(&self) -> &'static str {
            "inapplicable"
        }

        fn is_applicable(&self, _ctx: &ExecutionContext) -> bool {
            false
        }

        fn analyze(
            &mut self,
            mut insights: InsightRecord,
            _ctx: &ExecutionContext,
        ) -> Result<InsightRecord> {
            insights.insert("should.not.appear", json!(true));
            Ok(insights)
        }
    }

    #[test]
    fn test_blocks_run_in_configured_order() {
        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(MarkerBlock("first"));
        pipeline.add(MarkerBlock("second"));
        pipeline.add(MarkerBlock("third"));
        assert_eq!(pipeline.len(), 3);

        let ctx = context();
        let insights = pipeline.run_analysis(InsightRecord::new(), &ctx).unwrap();
        let order: Vec<String> = insights.get_as("trace.order").unwrap();
        assert_eq!(order, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let mut pipeline = AnalysisPipeline::default();
        assert!(pipeline.is_empty());
        let ctx = context();
        let mut seed = InsightRecord::new();
        seed.insert("seeded.key", json!(42));
        let out = pipeline.run_analysis(seed.clone(), &ctx).unwrap();
        assert_eq!(out, seed);
    }

    #[test]
    fn test_inapplicable_block_is_skipped_silently() {
        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(InapplicableBlock);
        pipeline.add(MarkerBlock("only"));
        let ctx = context();
        let insights = pipeline.run_analysis(InsightRecord::new(), &ctx).unwrap();
        assert!(!insights.contains_key("should.not.appear"));
        let order: Vec<String> = insights.get_as("trace.order").unwrap();
        assert_eq!(order, vec!["only"]);
    }

    #[test]
    fn test_failure_attribution_and_partial_record() {
        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(MarkerBlock("first"));
        pipeline.add(FailingBlock);
        pipeline.add(MarkerBlock("never_runs"));

        let ctx = context();
        let err = pipeline
            .run_analysis(InsightRecord::new(), &ctx)
            .unwrap_err();
        match err {
            Error::Block {
                block,
                phase,
                position,
                partial,
                ..
            } => {
                assert_eq!(block, "failing");
                assert_eq!(phase, Phase::Analyze);
                assert_eq!(position, 1);
                let order: Vec<String> = partial.get_as("trace.order").unwrap();
                assert_eq!(order, vec!["first"]);
            }
            other => panic!("expected Error::Block, got {other:?}"),
        }
    }

    #[test]
    fn test_explanation_row_count_pinned() {
        struct RowDropper;
        impl AnalysisBlock for RowDropper {
            fn name(&self) -> &'static str {
                "row_dropper"
            }
            fn explain(
                &mut self,
                _rows: Table,
                global: InsightRecord,
                _ctx: &ExecutionContext,
            ) -> Result<(Table, InsightRecord)> {
                Ok((Table::from_column("prediction", vec![json!(1)]), global))
            }
        }

        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(RowDropper);
        let ctx = context();
        let predictions = Table::from_column("prediction", vec![json!(1), json!(0)]);
        let err = pipeline.run_explanation(predictions, &ctx).unwrap_err();
        match err {
            Error::Block { block, phase, .. } => {
                assert_eq!(block, "row_dropper");
                assert_eq!(phase, Phase::Explain);
            }
            other => panic!("expected Error::Block, got {other:?}"),
        }
    }

    #[test]
    fn test_explanation_default_blocks_preserve_rows() {
        struct DefaultOnly;
        impl AnalysisBlock for DefaultOnly {
            fn name(&self) -> &'static str {
                "default_only"
            }
        }

        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(DefaultOnly);
        pipeline.add(DefaultOnly);
        let ctx = context();
        let predictions = Table::from_column("prediction", vec![json!(1), json!(0)]);
        let (rows, global) = pipeline.run_explanation(predictions.clone(), &ctx).unwrap();
        assert_eq!(rows, predictions);
        assert!(global.is_empty());
    }

    #[test]
    fn test_unmet_reads_audit() {
        struct Reader;
        impl AnalysisBlock for Reader {
            fn name(&self) -> &'static str {
                "reader"
            }
            fn reads(&self) -> &'static [&'static str] {
                &["trace.order", "absent.key"]
            }
        }

        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(Reader);
        pipeline.add(MarkerBlock("writer"));
        // Reader runs before the writer: both reads are unmet at its turn
        assert_eq!(
            pipeline.unmet_reads(),
            vec![("reader", "trace.order"), ("reader", "absent.key")]
        );

        let mut ordered = AnalysisPipeline::new();
        ordered.add(MarkerBlock("writer"));
        ordered.add(Reader);
        assert_eq!(ordered.unmet_reads(), vec![("reader", "absent.key")]);
    }

    #[test]
    fn test_block_names() {
        let mut pipeline = AnalysisPipeline::new();
        pipeline.add(MarkerBlock("a"));
        pipeline.add(MarkerBlock("b"));
        assert_eq!(pipeline.block_names(), vec!["a", "b"]);
    }
}
