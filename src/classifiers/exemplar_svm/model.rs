use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::classifiers::exemplar_svm::PlattSigmoid;
use crate::error::{EsvmError, Result};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KernelType {
    #[default]
    Linear,
}

impl KernelType {
    pub fn code(self) -> u8 {
        match self {
            KernelType::Linear => 0,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(KernelType::Linear),
            _ => None,
        }
    }
}

/// A trained linear SVM collapsed to its primal form.
///
/// The decision value is `w · x - rho`. Positive values vote for the exemplar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub kernel: KernelType,
    pub weights: Vec<f64>,
    pub rho: f64,
    pub support_vectors: usize,
    pub positive_weight: f64,
    pub negative_weight: f64,
    pub probability: Option<PlattSigmoid>,
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, rho: f64) -> Self {
        Self {
            kernel: KernelType::Linear,
            weights,
            rho,
            support_vectors: 0,
            positive_weight: 1.0,
            negative_weight: 1.0,
            probability: None,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn decision(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.weights.len() {
            return Err(EsvmError::DimensionMismatch {
                expected: self.weights.len(),
                actual: features.len(),
            });
        }
        let dot: f64 = self.weights.iter().zip(features).map(|(w, x)| w * x).sum();
        Ok(dot - self.rho)
    }

    /// Calibrated probability if the model carries a sigmoid, else the raw
    /// decision value.
    pub fn score(&self, features: &[f64]) -> Result<f64> {
        let d = self.decision(features)?;
        Ok(match &self.probability {
            Some(sigmoid) => sigmoid.probability(d),
            None => d,
        })
    }
}
