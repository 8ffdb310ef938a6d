//! Accuracy metrics configured per task
//!
//! - `Metric`: the metric taxonomy dispatched over raw prediction values
//! - `classification`: confusion matrix, accuracy, balanced accuracy, F1
//! - `regression`: R², MAE, MSE
//!
//! A task carries an ordered list of metrics on its execution context; the
//! first entry is the primary metric used wherever a single score is
//! needed (permutation importance, leaderboards).

pub mod classification;
pub mod regression;

pub use classification::{encode_labels, label_string, ConfusionMatrix};

use crate::data::value_to_f64;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Averaging strategy for multi-class metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Average {
    /// Unweighted mean over classes
    Macro,
    /// Mean over classes weighted by support
    Weighted,
}

/// Available accuracy metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    // Classification
    Accuracy,
    BalancedAccuracy,
    F1(Average),
    // Regression
    R2,
    MeanAbsoluteError,
    MeanSquaredError,
}

impl Metric {
    /// Whether higher values are better for this metric.
    pub fn higher_is_better(&self) -> bool {
        !matches!(self, Metric::MeanAbsoluteError | Metric::MeanSquaredError)
    }

    /// Whether this metric scores a discrete label set.
    pub fn for_classification(&self) -> bool {
        matches!(
            self,
            Metric::Accuracy | Metric::BalancedAccuracy | Metric::F1(_)
        )
    }

    /// Stable snake_case key used when storing scores in insight records.
    pub fn key(&self) -> &'static str {
        match self {
            Metric::Accuracy => "accuracy",
            Metric::BalancedAccuracy => "balanced_accuracy",
            Metric::F1(Average::Macro) => "f1_macro",
            Metric::F1(Average::Weighted) => "f1_weighted",
            Metric::R2 => "r2",
            Metric::MeanAbsoluteError => "mae",
            Metric::MeanSquaredError => "mse",
        }
    }

    /// Sensible primary metric for a task shape.
    pub fn default_for(classification: bool) -> Metric {
        if classification {
            Metric::BalancedAccuracy
        } else {
            Metric::R2
        }
    }

    /// Score a prediction batch against ground truth.
    ///
    /// Classification metrics dictionary-code the values; regression
    /// metrics require every value to decode as a number.
    pub fn score(&self, pred: &[Value], truth: &[Value]) -> Result<f64> {
        if pred.len() != truth.len() {
            return Err(Error::LengthMismatch {
                what: format!("{self} inputs"),
                expected: truth.len(),
                actual: pred.len(),
            });
        }
        if pred.is_empty() {
            return Err(Error::EmptyDataset(format!("no rows to score {self}")));
        }
        if self.for_classification() {
            let (p, t, vocabulary) = encode_labels(pred, truth);
            let cm = ConfusionMatrix::from_codes(&p, &t, vocabulary.len());
            Ok(match self {
                Metric::Accuracy => cm.accuracy(),
                Metric::BalancedAccuracy => cm.balanced_accuracy(),
                Metric::F1(Average::Weighted) => cm.f1_weighted(),
                Metric::F1(Average::Macro) => {
                    (0..cm.n_classes()).map(|c| cm.f1(c)).sum::<f64>() / cm.n_classes() as f64
                }
                _ => unreachable!(),
            })
        } else {
            let decode = |values: &[Value], what: &str| -> Result<Vec<f64>> {
                values
                    .iter()
                    .map(|v| {
                        value_to_f64(v).ok_or_else(|| Error::Metric {
                            metric: self.key().to_string(),
                            reason: format!("non-numeric {what} value"),
                        })
                    })
                    .collect()
            };
            let p = decode(pred, "prediction")?;
            let t = decode(truth, "truth")?;
            Ok(match self {
                Metric::R2 => regression::r2(&p, &t),
                Metric::MeanAbsoluteError => regression::mean_absolute_error(&p, &t),
                Metric::MeanSquaredError => regression::mean_squared_error(&p, &t),
                _ => unreachable!(),
            })
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #[test]
        fn prop_classification_scores_bounded(
            pred in vec(0usize..5, 1..60),
            truth in vec(0usize..5, 1..60),
        ) {
            let n = pred.len().min(truth.len());
            let p: Vec<_> = pred[..n].iter().map(|c| json!(c)).collect();
            let t: Vec<_> = truth[..n].iter().map(|c| json!(c)).collect();
            for metric in [
                Metric::Accuracy,
                Metric::BalancedAccuracy,
                Metric::F1(Average::Weighted),
                Metric::F1(Average::Macro),
            ] {
                let s = metric.score(&p, &t).unwrap();
                prop_assert!((0.0..=1.0).contains(&s), "{metric} = {s}");
                prop_assert!(!s.is_nan());
            }
        }

        #[test]
        fn prop_perfect_predictions_score_one(
            truth in vec(0usize..4, 1..60),
        ) {
            let t: Vec<_> = truth.iter().map(|c| json!(c)).collect();
            let acc = Metric::Accuracy.score(&t, &t).unwrap();
            prop_assert!((acc - 1.0).abs() < 1e-9);
        }
    }
}
