//! The analysis block contract
//!
//! Implement this trait to add a diagnostic to the pipeline. Both phase
//! operations default to no-ops that return their input unchanged, so a
//! block only overrides the phase it participates in.

use super::context::ExecutionContext;
use super::insights::InsightRecord;
use crate::data::Table;
use crate::error::Result;

/// A pluggable two-phase diagnostic.
///
/// `analyze` runs once per training run, after the predictor exists and
/// validation data is available; it receives the record produced by the
/// blocks before it and returns the record handed to the blocks after it.
/// `explain` runs once per inference call and threads a per-row table plus
/// a global mapping the same way.
///
/// Contract:
/// - never mutate the context;
/// - never assume a concrete predictor type: gate on capabilities via
///   [`is_applicable`](Self::is_applicable) and no-op otherwise;
/// - tolerate partially populated records: a missing upstream insight means
///   "feature unavailable", not a crash;
/// - only remove keys you own (`writes` lists them).
pub trait AnalysisBlock: Send {
    /// Stable block name, used for registry ids, logs and failure
    /// attribution.
    fn name(&self) -> &'static str;

    /// Applicability predicate. The pipeline silently skips blocks that
    /// return false for the current context; this is a normal control
    /// path, not an error.
    fn is_applicable(&self, _ctx: &ExecutionContext) -> bool {
        true
    }

    /// Insight keys this block reads, for construction-time dependency
    /// auditing.
    fn reads(&self) -> &'static [&'static str] {
        &[]
    }

    /// Insight keys this block writes.
    fn writes(&self) -> &'static [&'static str] {
        &[]
    }

    /// Train-time operation.
    fn analyze(
        &mut self,
        insights: InsightRecord,
        _ctx: &ExecutionContext,
    ) -> Result<InsightRecord> {
        Ok(insights)
    }

    /// Inference-time operation.
    fn explain(
        &mut self,
        rows: Table,
        global: InsightRecord,
        _ctx: &ExecutionContext,
    ) -> Result<(Table, InsightRecord)> {
        Ok((rows, global))
    }
}
