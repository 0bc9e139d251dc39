use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::classifiers::exemplar_svm::ClassWeightPolicy;
use crate::error::{EsvmError, Result};

fn default_c() -> f64 {
    1.0
}
fn default_eps() -> f64 {
    1e-5
}

/// Solver settings shared by every Exemplar-SVM of an ensemble.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct EsvmParams {
    #[serde(default = "default_c")]
    #[schemars(
        title = "Cost (C)",
        description = "Soft-margin penalty, scaled by the per-class weights.",
        range(min = 0.0),
        default = "default_c"
    )]
    pub c: f64,

    #[serde(default = "default_eps")]
    #[schemars(
        title = "Tolerance",
        description = "Stopping tolerance of the SVM solver.",
        range(min = 0.0),
        default = "default_eps"
    )]
    pub eps: f64,

    #[serde(default)]
    #[schemars(skip)]
    pub class_weights: ClassWeightPolicy,

    #[serde(default)]
    #[schemars(
        title = "Probability estimates?",
        description = "Fit a Platt sigmoid so predictions are P(+1|x)."
    )]
    pub probability: bool,
}
impl Default for EsvmParams {
    fn default() -> Self {
        Self {
            c: default_c(),
            eps: default_eps(),
            class_weights: ClassWeightPolicy::default(),
            probability: false,
        }
    }
}

impl EsvmParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0) {
            return Err(EsvmError::IllegalState(format!(
                "C must be positive, got {}",
                self.c
            )));
        }
        if !(self.eps > 0.0) {
            return Err(EsvmError::IllegalState(format!(
                "eps must be positive, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::exemplar_svm::EnforcedWeights;
    use serde_json::json;

    #[test]
    fn default_functions_are_expected() {
        assert!((default_c() - 1.0).abs() < f64::EPSILON);
        assert!((default_eps() - 1e-5).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_missing_fields_apply_defaults() {
        let p: EsvmParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(p, EsvmParams::default());
        assert!(matches!(
            p.class_weights,
            ClassWeightPolicy::Enforced(EnforcedWeights { positive, negative })
                if positive == 100.0 && negative == 1.0
        ));
        assert!(!p.probability);
    }

    #[test]
    fn validate_rejects_non_positive_cost() {
        assert!(EsvmParams::default().validate().is_ok());
        let p = EsvmParams {
            c: 0.0,
            ..EsvmParams::default()
        };
        assert!(matches!(p.validate(), Err(EsvmError::IllegalState(_))));
        let p = EsvmParams {
            eps: f64::NAN,
            ..EsvmParams::default()
        };
        assert!(p.validate().is_err());
    }
}
