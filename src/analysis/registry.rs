//! Block registry and pipeline configuration surface
//!
//! Third-party analyses plug in here: register a factory under a stable
//! string id at startup, then reference the id from an ordered list of
//! [`BlockDescriptor`]s. `build_pipeline` resolves and constructs every
//! block before any of them executes, so configuration mistakes surface
//! immediately instead of after a costly partial analysis pass.

use super::block::AnalysisBlock;
use super::pipeline::AnalysisPipeline;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::blocks::{
    AccuracyStats, ConfidenceCalibration, MixerCorrelation, PermutationImportance,
};

/// Construction arguments for one block: a mapping of named values.
pub type BlockConfig = serde_json::Map<String, Value>;

/// One entry of the pipeline configuration: a registry id plus the
/// construction arguments passed to its factory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub block: String,
    #[serde(default)]
    pub config: BlockConfig,
}

impl BlockDescriptor {
    /// Descriptor with an empty configuration mapping.
    pub fn new(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            config: BlockConfig::new(),
        }
    }

    /// Attach one configuration argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

type Factory = Box<dyn Fn(&BlockConfig) -> Result<Box<dyn AnalysisBlock>> + Send + Sync>;

/// Mapping from stable block id to factory.
pub struct BlockRegistry {
    factories: HashMap<String, Factory>,
}

impl BlockRegistry {
    /// Registry with nothing registered.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in blocks:
    /// `accuracy_stats`, `confidence_calibration`, `permutation_importance`
    /// and `mixer_correlation`.
    pub fn with_core_blocks() -> Self {
        let mut registry = Self::new();
        registry.register(AccuracyStats::ID, |cfg| {
            Ok(Box::new(AccuracyStats::from_config(cfg)?))
        });
        registry.register(ConfidenceCalibration::ID, |cfg| {
            Ok(Box::new(ConfidenceCalibration::from_config(cfg)?))
        });
        registry.register(PermutationImportance::ID, |cfg| {
            Ok(Box::new(PermutationImportance::from_config(cfg)?))
        });
        registry.register(MixerCorrelation::ID, |cfg| {
            Ok(Box::new(MixerCorrelation::from_config(cfg)?))
        });
        registry
    }

    /// Register a factory under `id`, replacing any previous registration.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F)
    where
        F: Fn(&BlockConfig) -> Result<Box<dyn AnalysisBlock>> + Send + Sync + 'static,
    {
        self.factories.insert(id.into(), Box::new(factory));
    }

    /// Whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Construct a single block from its descriptor.
    pub fn build_block(&self, descriptor: &BlockDescriptor) -> Result<Box<dyn AnalysisBlock>> {
        let factory = self
            .factories
            .get(&descriptor.block)
            .ok_or_else(|| Error::UnknownBlock(descriptor.block.clone()))?;
        factory(&descriptor.config)
    }

    /// Construct the whole pipeline in descriptor order.
    ///
    /// Fails on the first unresolvable id or malformed configuration.
    /// Declared reads with no earlier declared writer are logged as
    /// warnings, since they may still be satisfied by a seeded record.
    pub fn build_pipeline(&self, descriptors: &[BlockDescriptor]) -> Result<AnalysisPipeline> {
        let mut pipeline = AnalysisPipeline::new();
        for descriptor in descriptors {
            pipeline.add_boxed(self.build_block(descriptor)?);
        }
        for (block, key) in pipeline.unmet_reads() {
            tracing::warn!(block, key, "declared read has no earlier writer");
        }
        Ok(pipeline)
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::with_core_blocks()
    }
}

/// Deserialize a block's typed configuration from its argument mapping,
/// attributing failures to the block id.
pub(crate) fn parse_config<T: serde::de::DeserializeOwned>(
    block: &str,
    config: &BlockConfig,
) -> Result<T> {
    serde_json::from_value(Value::Object(config.clone())).map_err(|e| Error::BlockConfig {
        block: block.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_core_blocks_registered() {
        let registry = BlockRegistry::with_core_blocks();
        assert_eq!(
            registry.ids(),
            vec![
                "accuracy_stats",
                "confidence_calibration",
                "mixer_correlation",
                "permutation_importance",
            ]
        );
        assert!(registry.contains("mixer_correlation"));
        assert!(!registry.contains("heatmap"));
    }

    #[test]
    fn test_unknown_block_fails_at_construction() {
        let registry = BlockRegistry::with_core_blocks();
        let err = registry
            .build_pipeline(&[BlockDescriptor::new("no_such_block")])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownBlock(id) if id == "no_such_block"));
    }

    #[test]
    fn test_malformed_config_fails_at_construction() {
        let registry = BlockRegistry::with_core_blocks();
        let descriptor = BlockDescriptor::new("permutation_importance")
            .with_arg("repeats", json!("three"));
        let err = registry.build_pipeline(&[descriptor]).unwrap_err();
        assert!(matches!(err, Error::BlockConfig { block, .. } if block == "permutation_importance"));
    }

    #[test]
    fn test_build_pipeline_preserves_order() {
        let registry = BlockRegistry::with_core_blocks();
        let pipeline = registry
            .build_pipeline(&[
                BlockDescriptor::new("accuracy_stats"),
                BlockDescriptor::new("confidence_calibration"),
                BlockDescriptor::new("mixer_correlation"),
            ])
            .unwrap();
        assert_eq!(
            pipeline.block_names(),
            vec![
                "accuracy_stats",
                "confidence_calibration",
                "mixer_correlation"
            ]
        );
    }

    #[test]
    fn test_third_party_registration() {
        struct VendorBlock;
        impl AnalysisBlock for VendorBlock {
            fn name(&self) -> &'static str {
                "vendor_block"
            }
        }

        let mut registry = BlockRegistry::with_core_blocks();
        registry.register("vendor_block", |_cfg| Ok(Box::new(VendorBlock)));
        let pipeline = registry
            .build_pipeline(&[
                BlockDescriptor::new("accuracy_stats"),
                BlockDescriptor::new("vendor_block"),
            ])
            .unwrap();
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_descriptor_serde() {
        let descriptor: BlockDescriptor = serde_json::from_str(
            r#"{"block": "confidence_calibration", "config": {"alpha": 0.05}}"#,
        )
        .unwrap();
        assert_eq!(descriptor.block, "confidence_calibration");
        assert_eq!(descriptor.config["alpha"], json!(0.05));

        // config is optional
        let bare: BlockDescriptor =
            serde_json::from_str(r#"{"block": "accuracy_stats"}"#).unwrap();
        assert!(bare.config.is_empty());
    }

    #[test]
    fn test_default_registry_has_core_blocks() {
        assert_eq!(BlockRegistry::default().ids().len(), 4);
    }
}
