use std::fs;
use std::path::Path;

use schemars::{JsonSchema, Schema, schema_for};
use serde::{Deserialize, Serialize};

use crate::codec::DataFormat;
use crate::config::EsvmParams;
use crate::error::{EsvmError, Result};
use crate::normalization::{DiscoveryScope, NormMethod, NormParams};

fn default_patch_count() -> usize {
    9
}
fn default_clip() -> bool {
    true
}
fn default_parallel() -> bool {
    true
}
fn default_model_format() -> DataFormat {
    DataFormat::Binary
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FeatureNormalizationConfig {
    #[serde(default)]
    #[schemars(
        title = "Method",
        description = "Normalization used when discovering reference parameters."
    )]
    pub method: NormMethod,

    #[serde(default)]
    #[schemars(
        title = "Discovery scope",
        description = "How the reference population is pooled across patches and features."
    )]
    pub scope: DiscoveryScope,

    #[serde(default = "default_clip")]
    #[schemars(
        title = "Clip?",
        description = "Clamp normalized features to [0, 1].",
        default = "default_clip"
    )]
    pub clip: bool,

    #[serde(default)]
    #[schemars(
        title = "Normalize negatives?",
        description = "Apply the reference parameters to the negative pool too."
    )]
    pub normalize_negatives: bool,
}
impl Default for FeatureNormalizationConfig {
    fn default() -> Self {
        Self {
            method: NormMethod::default(),
            scope: DiscoveryScope::default(),
            clip: default_clip(),
            normalize_negatives: false,
        }
    }
}

/// Offline-calibrated parameters applied to fused scores.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ScoreNormalization {
    pub params: NormParams,

    #[serde(default = "default_clip")]
    #[schemars(
        title = "Clip?",
        description = "Clamp normalized scores to [0, 1].",
        default = "default_clip"
    )]
    pub clip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnsembleConfig {
    #[serde(default = "default_patch_count")]
    #[schemars(
        title = "Patch count",
        description = "Number of patches every image is split into.",
        range(min = 1),
        default = "default_patch_count"
    )]
    pub patch_count: usize,

    #[serde(default)]
    pub feature_normalization: FeatureNormalizationConfig,

    #[serde(default)]
    #[schemars(
        title = "Score normalization",
        description = "Parameters applied to each fused score, if any."
    )]
    pub score_normalization: Option<ScoreNormalization>,

    #[serde(default)]
    #[schemars(
        title = "Patch thresholds",
        description = "Per-patch score thresholds. Read but not applied during fusion."
    )]
    pub patch_thresholds: Vec<f64>,

    #[serde(default)]
    pub esvm: EsvmParams,

    #[serde(default = "default_model_format")]
    #[schemars(
        title = "Model format",
        description = "Encoding used when persisting per-patch models.",
        default = "default_model_format"
    )]
    pub model_format: DataFormat,

    #[serde(default = "default_parallel")]
    #[schemars(
        title = "Parallel?",
        description = "Train and score patches on the rayon pool.",
        default = "default_parallel"
    )]
    pub parallel: bool,
}
impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            patch_count: default_patch_count(),
            feature_normalization: FeatureNormalizationConfig::default(),
            score_normalization: None,
            patch_thresholds: Vec::new(),
            esvm: EsvmParams::default(),
            model_format: default_model_format(),
            parallel: default_parallel(),
        }
    }
}

impl EnsembleConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EnsembleConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.patch_count == 0 {
            return Err(EsvmError::IllegalState(
                "patch_count must be at least 1".into(),
            ));
        }
        self.esvm.validate()?;
        if let Some(score) = &self.score_normalization {
            score.params.validate()?;
        }
        Ok(())
    }
}

/// JSON schema of [`EnsembleConfig`].
pub fn config_schema() -> Schema {
    schema_for!(EnsembleConfig)
}
