use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumDiscriminants, EnumIter, EnumMessage, EnumString, IntoStaticStr};

use crate::config::NoParams;

fn default_positive_weight() -> f64 {
    100.0
}
fn default_negative_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EnforcedWeights {
    #[serde(default = "default_positive_weight")]
    #[schemars(
        title = "Positive weight",
        description = "Cost multiplier applied to positive (exemplar) samples.",
        range(min = 0.0),
        default = "default_positive_weight"
    )]
    pub positive: f64,

    #[serde(default = "default_negative_weight")]
    #[schemars(
        title = "Negative weight",
        description = "Cost multiplier applied to negative samples.",
        range(min = 0.0),
        default = "default_negative_weight"
    )]
    pub negative: f64,
}
impl Default for EnforcedWeights {
    fn default() -> Self {
        Self {
            positive: default_positive_weight(),
            negative: default_negative_weight(),
        }
    }
}

/// How per-class costs are derived from the class populations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, EnumDiscriminants, PartialEq)]
#[serde(tag = "type", content = "params", rename_all = "kebab-case")]
#[strum_discriminants(name(ClassWeightKind))]
#[strum_discriminants(derive(EnumIter, EnumString, Display, IntoStaticStr, EnumMessage))]
#[strum_discriminants(strum(serialize_all = "kebab-case"))]
pub enum ClassWeightPolicy {
    #[strum_discriminants(strum(
        message = "Enforced",
        detailed_message = "Fixed positive and negative weights."
    ))]
    Enforced(EnforcedWeights),
    #[strum_discriminants(strum(
        message = "Inverse frequency",
        detailed_message = "N/Np for positives, N/Nn for negatives."
    ))]
    InverseFrequency(NoParams),
    #[strum_discriminants(strum(
        message = "Positive normalized",
        detailed_message = "Nn/Np for positives, 1 for negatives."
    ))]
    PositiveNormalized(NoParams),
}
impl Default for ClassWeightPolicy {
    fn default() -> Self {
        Self::Enforced(EnforcedWeights::default())
    }
}

impl ClassWeightPolicy {
    /// `(Wp, Wn)` for a training set with the given class counts.
    pub fn weights(&self, positives: usize, negatives: usize) -> (f64, f64) {
        let np = positives as f64;
        let nn = negatives as f64;
        match self {
            ClassWeightPolicy::Enforced(w) => (w.positive, w.negative),
            ClassWeightPolicy::InverseFrequency(_) => {
                let n = np + nn;
                (n / np, n / nn)
            }
            ClassWeightPolicy::PositiveNormalized(_) => (nn / np, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use strum::EnumMessage;

    #[test]
    fn enforced_default_is_hundred_to_one() {
        assert_eq!(ClassWeightPolicy::default().weights(1, 500), (100.0, 1.0));
    }

    #[test]
    fn inverse_frequency_and_positive_normalized() {
        let (wp, wn) = ClassWeightPolicy::InverseFrequency(NoParams {}).weights(2, 8);
        assert!((wp - 5.0).abs() < 1e-12);
        assert!((wn - 1.25).abs() < 1e-12);

        let (wp, wn) = ClassWeightPolicy::PositiveNormalized(NoParams {}).weights(2, 8);
        assert!((wp - 4.0).abs() < 1e-12);
        assert_eq!(wn, 1.0);
    }

    #[test]
    fn tagged_serialization() {
        let v = serde_json::to_value(ClassWeightPolicy::default()).unwrap();
        assert_eq!(v.get("type").and_then(Value::as_str), Some("enforced"));
        assert_eq!(v["params"]["positive"], json!(100.0));

        let p: ClassWeightPolicy =
            serde_json::from_value(json!({"type": "inverse-frequency", "params": {}})).unwrap();
        assert!(matches!(p, ClassWeightPolicy::InverseFrequency(_)));

        let p: ClassWeightPolicy =
            serde_json::from_value(json!({"type": "enforced", "params": {"positive": 10.0}}))
                .unwrap();
        assert_eq!(p.weights(1, 1), (10.0, 1.0));
    }

    #[test]
    fn discriminant_messages_are_available() {
        assert_eq!(ClassWeightKind::Enforced.get_message(), Some("Enforced"));
        assert_eq!(
            "positive-normalized".parse::<ClassWeightKind>().unwrap(),
            ClassWeightKind::PositiveNormalized
        );
    }
}
