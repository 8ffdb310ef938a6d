//! Post-training analysis pipeline
//!
//! After a predictor is trained, an ordered chain of analysis blocks runs
//! over it, each reading and enriching a shared [`InsightRecord`]; at
//! inference time the same chain annotates each prediction batch with
//! per-row and global explanations.
//!
//! - `block`: the [`AnalysisBlock`] contract
//! - `context`: the read-only [`ExecutionContext`] handed to every block
//! - `insights`: the [`InsightRecord`] threaded through the chain
//! - `pipeline`: the [`AnalysisPipeline`] driver for both phases
//! - `registry`: the [`BlockRegistry`] configuration surface
//! - `blocks`: built-in blocks

pub mod block;
pub mod blocks;
pub mod context;
pub mod insights;
pub mod pipeline;
pub mod registry;

pub use block::AnalysisBlock;
pub use blocks::{AccuracyStats, ConfidenceCalibration, MixerCorrelation, PermutationImportance};
pub use context::ExecutionContext;
pub use insights::InsightRecord;
pub use pipeline::AnalysisPipeline;
pub use registry::{BlockConfig, BlockDescriptor, BlockRegistry};
