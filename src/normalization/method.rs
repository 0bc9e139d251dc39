use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString, IntoStaticStr};

use crate::core::FeatureVector;
use crate::error::{EsvmError, Result};
use crate::normalization::functions::{
    normalize_min_max, normalize_over_all, normalize_per_feature, normalize_z_score,
};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum NormMethod {
    /// `(x - min) / (max - min)`
    #[default]
    #[strum(message = "Min-Max", detailed_message = "Map [min, max] onto [0, 1].")]
    MinMax,
    /// `0.5 + (x - mean) / (6 * stddev)`
    #[strum(
        message = "Z-Score",
        detailed_message = "Map mean ± 3 standard deviations onto [0, 1]."
    )]
    ZScore,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Granularity {
    /// One parameter pair for every feature.
    #[default]
    OverAll,
    /// One parameter pair per feature index.
    PerFeature,
}

/// A `(first, second)` pair read as `{min, max}` for [`NormMethod::MinMax`]
/// and `{mean, stddev}` for [`NormMethod::ZScore`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NormParams {
    pub method: NormMethod,
    pub first: f64,
    pub second: f64,
}

impl NormParams {
    pub fn min_max(min: f64, max: f64) -> Self {
        Self {
            method: NormMethod::MinMax,
            first: min,
            second: max,
        }
    }

    pub fn z_score(mean: f64, stddev: f64) -> Self {
        Self {
            method: NormMethod::ZScore,
            first: mean,
            second: stddev,
        }
    }

    #[inline]
    pub fn apply(&self, x: f64, clip: bool) -> Result<f64> {
        match self.method {
            NormMethod::MinMax => normalize_min_max(x, self.first, self.second, clip),
            NormMethod::ZScore => normalize_z_score(x, self.first, self.second, clip),
        }
    }

    /// Fails with `DegenerateRange` if no value could be normalized with
    /// these parameters.
    pub fn validate(&self) -> Result<()> {
        let degenerate = match self.method {
            NormMethod::MinMax => !(self.second > self.first),
            NormMethod::ZScore => self.second == 0.0 || self.second.is_nan(),
        };
        if degenerate {
            return Err(EsvmError::DegenerateRange {
                method: self.method,
                first: self.first,
                second: self.second,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerFeatureParams {
    pub method: NormMethod,
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

/// Normalization parameters for whole feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "granularity", rename_all = "kebab-case")]
pub enum FeatureNormalization {
    OverAll(NormParams),
    PerFeature(PerFeatureParams),
}

impl FeatureNormalization {
    pub fn method(&self) -> NormMethod {
        match self {
            FeatureNormalization::OverAll(p) => p.method,
            FeatureNormalization::PerFeature(p) => p.method,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            FeatureNormalization::OverAll(_) => Granularity::OverAll,
            FeatureNormalization::PerFeature(_) => Granularity::PerFeature,
        }
    }

    /// Feature count the parameters were discovered for, if they are bound
    /// to one.
    pub fn feature_count(&self) -> Option<usize> {
        match self {
            FeatureNormalization::OverAll(_) => None,
            FeatureNormalization::PerFeature(p) => Some(p.first.len()),
        }
    }

    pub fn apply(&self, features: &[f64], clip: bool) -> Result<FeatureVector> {
        match self {
            FeatureNormalization::OverAll(p) => normalize_over_all(features, p, clip),
            FeatureNormalization::PerFeature(p) => {
                normalize_per_feature(features, p.method, &p.first, &p.second, clip)
            }
        }
    }
}

/// Discovered normalization parameters for a whole patch grid.
///
/// Built once from a reference population and reused, unchanged, for every
/// training and probe vector drawn from that population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "scope", content = "params", rename_all = "kebab-case")]
pub enum NormalizationPlan {
    Shared(FeatureNormalization),
    PerPatch(Vec<FeatureNormalization>),
}

impl NormalizationPlan {
    pub fn for_patch(&self, patch: usize) -> Result<&FeatureNormalization> {
        match self {
            NormalizationPlan::Shared(n) => Ok(n),
            NormalizationPlan::PerPatch(per_patch) => {
                per_patch.get(patch).ok_or(EsvmError::Index {
                    index: patch,
                    len: per_patch.len(),
                })
            }
        }
    }

    pub fn apply(&self, patch: usize, features: &[f64], clip: bool) -> Result<FeatureVector> {
        self.for_patch(patch)?.apply(features, clip)
    }

    /// Number of patches this plan is bound to, if any.
    pub fn patch_count(&self) -> Option<usize> {
        match self {
            NormalizationPlan::Shared(_) => None,
            NormalizationPlan::PerPatch(per_patch) => Some(per_patch.len()),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use strum::EnumMessage;

    #[test]
    fn validate_rejects_degenerate_pairs() {
        assert!(NormParams::min_max(0.0, 1.0).validate().is_ok());
        assert!(NormParams::min_max(5.0, 5.0).validate().is_err());
        assert!(NormParams::min_max(6.0, 5.0).validate().is_err());
        assert!(NormParams::z_score(1.0, 0.0).validate().is_err());
        assert!(NormParams::z_score(1.0, f64::NAN).validate().is_err());
        assert!(NormParams::z_score(1.0, 0.1).validate().is_ok());
    }

    #[test]
    fn method_names_are_kebab_case() {
        assert_eq!(NormMethod::MinMax.to_string(), "min-max");
        assert_eq!("z-score".parse::<NormMethod>().unwrap(), NormMethod::ZScore);
        assert_eq!(NormMethod::ZScore.get_message(), Some("Z-Score"));
    }

    #[test]
    fn plan_for_patch_respects_scope() {
        let shared = NormalizationPlan::Shared(FeatureNormalization::OverAll(
            NormParams::min_max(0.0, 2.0),
        ));
        assert!(shared.for_patch(1000).is_ok());
        assert_eq!(shared.patch_count(), None);

        let per_patch = NormalizationPlan::PerPatch(vec![
            FeatureNormalization::OverAll(NormParams::min_max(0.0, 2.0)),
            FeatureNormalization::OverAll(NormParams::min_max(0.0, 4.0)),
        ]);
        assert_eq!(per_patch.apply(1, &[2.0], false).unwrap(), vec![0.5]);
        assert!(matches!(
            per_patch.for_patch(2),
            Err(EsvmError::Index { index: 2, len: 2 })
        ));
    }

    #[test]
    fn plan_survives_json() {
        let plan = NormalizationPlan::PerPatch(vec![
            FeatureNormalization::OverAll(NormParams::z_score(0.5, 0.25)),
            FeatureNormalization::PerFeature(PerFeatureParams {
                method: NormMethod::MinMax,
                first: vec![0.0, -1.0],
                second: vec![1.0, 1.0],
            }),
        ]);
        let json = plan.to_json().unwrap();
        let back = NormalizationPlan::from_json(&json).unwrap();
        assert_eq!(plan, back);

        let v: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v.get("scope").and_then(Value::as_str), Some("per-patch"));
        assert_eq!(v["params"][0]["granularity"], json!("over-all"));
        assert_eq!(v["params"][1]["granularity"], json!("per-feature"));
    }
}
