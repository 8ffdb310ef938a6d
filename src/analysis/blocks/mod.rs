//! Built-in analysis blocks
//!
//! The core insight set every task gets (accuracy, confidence
//! calibration, feature importance) plus the ensemble-only mixer
//! correlation diagnostic. Third-party blocks register alongside these in
//! the [`BlockRegistry`](crate::analysis::BlockRegistry).

mod acc_stats;
mod calibration;
mod importance;
mod mixer_correlation;

pub use acc_stats::AccuracyStats;
pub use calibration::ConfidenceCalibration;
pub use importance::PermutationImportance;
pub use mixer_correlation::MixerCorrelation;
