//! Encoded dataset: raw rows paired with their featurized representation

use super::table::Table;
use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;

/// A dataset after featurization.
///
/// Pairs the raw rows with a row-major numeric feature matrix. Each feature
/// column records the raw column it was encoded from; a single raw column
/// may span several feature columns. Predictors and sub-mixers consume this
/// type directly.
#[derive(Clone, Debug, PartialEq)]
pub struct EncodedDataset {
    raw: Table,
    feature_columns: Vec<String>,
    features: Vec<Vec<f64>>,
}

impl EncodedDataset {
    /// Build an encoded dataset, validating that the feature matrix is
    /// rectangular and row-aligned with the raw table.
    pub fn new(raw: Table, feature_columns: Vec<String>, features: Vec<Vec<f64>>) -> Result<Self> {
        if features.len() != raw.len() {
            return Err(Error::LengthMismatch {
                what: "encoded rows".to_string(),
                expected: raw.len(),
                actual: features.len(),
            });
        }
        for (i, row) in features.iter().enumerate() {
            if row.len() != feature_columns.len() {
                return Err(Error::LengthMismatch {
                    what: format!("encoded row {i}"),
                    expected: feature_columns.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            raw,
            feature_columns,
            features,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the dataset has zero rows.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The raw rows this dataset was encoded from.
    pub fn raw(&self) -> &Table {
        &self.raw
    }

    /// Source-column name of every feature column, in feature order.
    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    /// Feature vector of a single row.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.features.get(index).map(Vec::as_slice)
    }

    /// Iterate feature rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.features.iter().map(Vec::as_slice)
    }

    /// Indices of the feature columns encoded from `column`.
    pub fn feature_indices(&self, column: &str) -> Vec<usize> {
        self.feature_columns
            .iter()
            .enumerate()
            .filter(|(_, name)| name.as_str() == column)
            .map(|(i, _)| i)
            .collect()
    }

    /// Copy of this dataset with the features of one raw column shuffled
    /// across rows. All feature columns encoded from `column` move together
    /// under a single row permutation, so multi-feature encodings stay
    /// internally consistent.
    pub fn with_shuffled_column<R: Rng>(&self, column: &str, rng: &mut R) -> Self {
        let targets = self.feature_indices(column);
        if targets.is_empty() || self.len() < 2 {
            return self.clone();
        }
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);

        let mut shuffled = self.clone();
        for (dst, &src) in order.iter().enumerate() {
            for &j in &targets {
                shuffled.features[dst][j] = self.features[src][j];
            }
        }
        shuffled
    }
}
