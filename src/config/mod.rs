mod ensemble_config;
mod esvm_params;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use ensemble_config::{
    EnsembleConfig, FeatureNormalizationConfig, ScoreNormalization, config_schema,
};
pub use esvm_params::EsvmParams;

/// Empty parameter object for tagged variants that take no settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct NoParams {}
