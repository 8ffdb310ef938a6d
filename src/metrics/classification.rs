//! Classification metrics
//!
//! Label-code based confusion matrix plus accuracy, balanced accuracy and
//! weighted F1. Element `[i][j]` of the matrix counts samples with true
//! label `i` predicted as `j`.

use serde_json::Value;
use std::collections::BTreeSet;

/// Confusion matrix over integer label codes.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

impl ConfusionMatrix {
    /// Build from prediction/truth code sequences. Codes at or above
    /// `n_classes` grow the matrix to fit.
    pub fn from_codes(pred: &[usize], truth: &[usize], n_classes: usize) -> Self {
        let observed = pred
            .iter()
            .chain(truth.iter())
            .max()
            .map_or(0, |&m| m + 1);
        let n = n_classes.max(observed);
        let mut matrix = vec![vec![0; n]; n];
        for (&p, &t) in pred.iter().zip(truth.iter()) {
            matrix[t][p] += 1;
        }
        Self {
            matrix,
            n_classes: n,
        }
    }

    /// Number of classes.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Raw count matrix, `[true][predicted]`.
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Total number of samples.
    pub fn total(&self) -> usize {
        self.matrix.iter().map(|row| row.iter().sum::<usize>()).sum()
    }

    /// Number of true instances of a class.
    pub fn support(&self, class: usize) -> usize {
        self.matrix.get(class).map_or(0, |row| row.iter().sum())
    }

    /// Fraction of samples on the diagonal. Empty input yields 0.0.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        correct as f64 / total as f64
    }

    /// Per-class recall. Classes with no support yield 0.0.
    pub fn recall(&self, class: usize) -> f64 {
        let support = self.support(class);
        if support == 0 {
            return 0.0;
        }
        self.matrix[class][class] as f64 / support as f64
    }

    /// Per-class precision. Classes never predicted yield 0.0.
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = (0..self.n_classes).map(|i| self.matrix[i][class]).sum();
        if predicted == 0 {
            return 0.0;
        }
        self.matrix[class][class] as f64 / predicted as f64
    }

    /// Per-class F1.
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Mean recall over classes that appear in the truth labels.
    pub fn balanced_accuracy(&self) -> f64 {
        let supported: Vec<usize> = (0..self.n_classes)
            .filter(|&c| self.support(c) > 0)
            .collect();
        if supported.is_empty() {
            return 0.0;
        }
        supported.iter().map(|&c| self.recall(c)).sum::<f64>() / supported.len() as f64
    }

    /// Support-weighted mean of per-class F1 scores.
    pub fn f1_weighted(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (0..self.n_classes)
            .map(|c| self.f1(c) * self.support(c) as f64)
            .sum::<f64>()
            / total as f64
    }
}

/// Canonical string form of a label value.
pub fn label_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Dictionary-code two label sequences against a shared vocabulary.
///
/// The vocabulary is the sorted union of labels observed in either
/// sequence, so coding is deterministic regardless of row order. Returns
/// `(prediction codes, truth codes, vocabulary)`.
pub fn encode_labels(pred: &[Value], truth: &[Value]) -> (Vec<usize>, Vec<usize>, Vec<String>) {
    let vocabulary: Vec<String> = pred
        .iter()
        .chain(truth.iter())
        .map(label_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let code = |v: &Value| -> usize {
        vocabulary
            .binary_search(&label_string(v))
            .unwrap_or(vocabulary.len())
    };
    (
        pred.iter().map(code).collect(),
        truth.iter().map(code).collect(),
        vocabulary,
    )
}
