//! # analizar
//!
//! Post-training analysis for trained predictors: an ordered chain of
//! pluggable diagnostic blocks that enrich a shared insight record after
//! training and annotate prediction batches at inference time.
//!
//! ## Architecture
//!
//! - `analysis`: the block contract, pipeline driver, insight record,
//!   execution context and block registry
//! - `data`: tables, encoded datasets, column types
//! - `metrics`: accuracy metrics dispatched over raw prediction values
//! - `predictor`: the capability interface blocks see predictors through
//! - `stats`: shared numeric helpers
//!
//! ## Example
//!
//! ```rust
//! use analizar::analysis::{BlockDescriptor, BlockRegistry, InsightRecord};
//! use analizar::data::{ColumnType, EncodedDataset, Table};
//! use analizar::predictor::{BestOfEnsemble, StaticMixer};
//! use analizar::ExecutionContext;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # fn main() -> analizar::Result<()> {
//! let validation = Table::from_column(
//!     "label",
//!     vec![json!(1), json!(0), json!(1), json!(1), json!(0)],
//! );
//! let encoded = EncodedDataset::new(
//!     validation.clone(),
//!     vec!["x".to_string()],
//!     (0..5).map(|i| vec![i as f64]).collect(),
//! )?;
//! let predictor = Arc::new(BestOfEnsemble::new(
//!     "best_of",
//!     vec![
//!         Box::new(StaticMixer::new("neural", vec![json!(1), json!(0), json!(1), json!(1), json!(0)])),
//!         Box::new(StaticMixer::new("tree", vec![json!(0), json!(1), json!(0), json!(0), json!(1)])),
//!     ],
//! )?);
//! let ctx = ExecutionContext::new(predictor, "label", validation, encoded.clone(), encoded)
//!     .with_target_type(ColumnType::Binary);
//!
//! let registry = BlockRegistry::with_core_blocks();
//! let mut pipeline = registry.build_pipeline(&[
//!     BlockDescriptor::new("accuracy_stats"),
//!     BlockDescriptor::new("mixer_correlation"),
//! ])?;
//!
//! let insights = pipeline.run_analysis(InsightRecord::new(), &ctx)?;
//! assert!(insights.contains_key("accuracy.scores"));
//! assert!(insights.contains_key("ensemble.mixer_correlation"));
//! # Ok(())
//! # }
//! ```

pub mod analysis;
pub mod data;
pub mod error;
pub mod metrics;
pub mod predictor;
pub mod stats;

pub use analysis::{
    AnalysisBlock, AnalysisPipeline, BlockDescriptor, BlockRegistry, ExecutionContext,
    InsightRecord,
};
pub use data::{ColumnType, EncodedDataset, Table, TimeseriesSettings};
pub use error::{Error, Phase, Result};
pub use metrics::{Average, Metric};
pub use predictor::{BestOfEnsemble, Mixer, MixerEnsemble, Predictor, SingleMixer, StaticMixer};
