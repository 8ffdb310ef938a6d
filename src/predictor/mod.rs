//! Predictor capability interface
//!
//! Analysis blocks never see a concrete model type. They see `Predictor`
//! and, when a block's logic only makes sense for an ensemble, the
//! `ensemble()` capability accessor, which exposes the ordered sub-mixer
//! collection or `None`. Applicability checks are capability matches, not
//! downcasts, so test doubles can force either branch.
//!
//! Two named variants ship as reference implementations: `SingleMixer`
//! (one model, no ensemble capability) and `BestOfEnsemble` (N
//! independently trained mixers, predictions served by the best one).

use crate::data::EncodedDataset;
use crate::error::{Error, Result};
use serde_json::Value;

/// One independently trained sub-model, callable on encoded data.
pub trait Mixer: Send + Sync {
    /// Mixer name for reports and insight payloads.
    fn name(&self) -> &str;

    /// Predict one value per row of `data`.
    fn predict(&self, data: &EncodedDataset) -> Result<Vec<Value>>;
}

/// Capability of predictors composed of enumerable sub-mixers.
pub trait MixerEnsemble {
    /// Sub-mixers in training order.
    fn mixers(&self) -> Vec<&dyn Mixer>;
}

/// A trained predictor, as seen by the analysis pipeline.
pub trait Predictor: Send + Sync {
    /// Predictor name for reports and failure attribution.
    fn name(&self) -> &str;

    /// Predict one value per row of `data`.
    fn predict(&self, data: &EncodedDataset) -> Result<Vec<Value>>;

    /// Ensemble capability accessor. `None` for single-model predictors.
    fn ensemble(&self) -> Option<&dyn MixerEnsemble> {
        None
    }
}

/// Mixer that replays a fixed prediction sequence.
///
/// Reference double for tests and pipeline dry runs: deterministic output,
/// errors when asked for more rows than it holds.
#[derive(Clone, Debug)]
pub struct StaticMixer {
    name: String,
    outputs: Vec<Value>,
}

impl StaticMixer {
    pub fn new(name: impl Into<String>, outputs: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            outputs,
        }
    }
}

impl Mixer for StaticMixer {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, data: &EncodedDataset) -> Result<Vec<Value>> {
        if data.len() > self.outputs.len() {
            return Err(Error::Predictor(format!(
                "mixer '{}' holds {} outputs but {} rows were requested",
                self.name,
                self.outputs.len(),
                data.len()
            )));
        }
        Ok(self.outputs[..data.len()].to_vec())
    }
}

/// Predictor backed by exactly one mixer. No ensemble capability.
pub struct SingleMixer {
    mixer: Box<dyn Mixer>,
}

impl SingleMixer {
    pub fn new(mixer: Box<dyn Mixer>) -> Self {
        Self { mixer }
    }
}

impl Predictor for SingleMixer {
    fn name(&self) -> &str {
        self.mixer.name()
    }

    fn predict(&self, data: &EncodedDataset) -> Result<Vec<Value>> {
        self.mixer.predict(data)
    }
}

/// Best-of-N ensemble: every mixer is kept and enumerable, predictions are
/// served by the selected best mixer.
pub struct BestOfEnsemble {
    name: String,
    mixers: Vec<Box<dyn Mixer>>,
    best: usize,
}

impl std::fmt::Debug for BestOfEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BestOfEnsemble")
            .field("name", &self.name)
            .field(
                "mixers",
                &self.mixers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("best", &self.best)
            .finish()
    }
}

impl BestOfEnsemble {
    /// Build an ensemble over at least one mixer; the first is initially
    /// considered best.
    pub fn new(name: impl Into<String>, mixers: Vec<Box<dyn Mixer>>) -> Result<Self> {
        if mixers.is_empty() {
            return Err(Error::Predictor(
                "an ensemble needs at least one mixer".to_string(),
            ));
        }
        Ok(Self {
            name: name.into(),
            mixers,
            best: 0,
        })
    }

    /// Select the serving mixer by index.
    pub fn with_best(mut self, index: usize) -> Result<Self> {
        if index >= self.mixers.len() {
            return Err(Error::Predictor(format!(
                "best-mixer index {index} out of range for {} mixers",
                self.mixers.len()
            )));
        }
        self.best = index;
        Ok(self)
    }

    /// Index of the serving mixer.
    pub fn best_index(&self) -> usize {
        self.best
    }
}

impl Predictor for BestOfEnsemble {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, data: &EncodedDataset) -> Result<Vec<Value>> {
        self.mixers[self.best].predict(data)
    }

    fn ensemble(&self) -> Option<&dyn MixerEnsemble> {
        Some(self)
    }
}

impl MixerEnsemble for BestOfEnsemble {
    fn mixers(&self) -> Vec<&dyn Mixer> {
        self.mixers.iter().map(Box::as_ref).collect()
    }
}
