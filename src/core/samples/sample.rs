use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

use crate::error::{EsvmError, Result};

/// Dense descriptor output for one patch.
pub type FeatureVector = Vec<f64>;

/// Binary class convention shared by every dataset and classifier.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Label {
    Positive,
    Negative,
}

impl Label {
    #[inline]
    pub fn as_i32(self) -> i32 {
        match self {
            Label::Positive => 1,
            Label::Negative => -1,
        }
    }

    #[inline]
    pub fn from_i32(value: i32) -> Option<Label> {
        match value {
            1 => Some(Label::Positive),
            -1 => Some(Label::Negative),
            _ => None,
        }
    }

    #[inline]
    pub fn is_positive(self) -> bool {
        self == Label::Positive
    }
}

/// A feature vector with its class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub features: FeatureVector,
    pub label: Label,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            features: FeatureVector::new(),
            label: Label::Negative,
        }
    }
}

crate::nested_leaf!(Sample);

impl Sample {
    pub fn new(features: FeatureVector, label: Label) -> Sample {
        Sample { features, label }
    }

    pub fn positive(features: FeatureVector) -> Sample {
        Sample::new(features, Label::Positive)
    }

    pub fn negative(features: FeatureVector) -> Sample {
        Sample::new(features, Label::Negative)
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.features.len()
    }

    pub fn value_at_index(&self, index: usize) -> Option<f64> {
        self.features.get(index).copied()
    }

    pub fn set_value_at_index(&mut self, index: usize, new_value: f64) -> Result<()> {
        let len = self.features.len();
        match self.features.get_mut(index) {
            Some(slot) => {
                *slot = new_value;
                Ok(())
            }
            None => Err(EsvmError::Index { index, len }),
        }
    }
}

/// Splits labelled samples into `(positives, negatives)` feature sets,
/// preserving their relative order.
pub fn split_by_label(samples: Vec<Sample>) -> (Vec<FeatureVector>, Vec<FeatureVector>) {
    let mut positives = Vec::new();
    let mut negatives = Vec::new();
    for s in samples {
        match s.label {
            Label::Positive => positives.push(s.features),
            Label::Negative => negatives.push(s.features),
        }
    }
    (positives, negatives)
}

/// Labels every vector of `positives` and `negatives` and concatenates them,
/// positives first.
pub fn label_sets(positives: &[FeatureVector], negatives: &[FeatureVector]) -> Vec<Sample> {
    positives
        .iter()
        .cloned()
        .map(Sample::positive)
        .chain(negatives.iter().cloned().map(Sample::negative))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn labels_map_to_signed_integers() {
        assert_eq!(Label::Positive.as_i32(), 1);
        assert_eq!(Label::Negative.as_i32(), -1);
        assert_eq!(Label::from_i32(1), Some(Label::Positive));
        assert_eq!(Label::from_i32(-1), Some(Label::Negative));
        assert_eq!(Label::from_i32(0), None);
        assert_eq!(Label::from_i32(2), None);
    }

    #[test]
    fn labels_parse_from_kebab_case() {
        assert_eq!(Label::from_str("positive").unwrap(), Label::Positive);
        assert_eq!(Label::Negative.to_string(), "negative");
    }

    #[test]
    fn set_value_out_of_bounds_errors() {
        let mut s = Sample::positive(vec![1.0, 2.0]);
        s.set_value_at_index(1, 5.0).unwrap();
        assert_eq!(s.value_at_index(1), Some(5.0));
        assert!(matches!(
            s.set_value_at_index(2, 0.0),
            Err(EsvmError::Index { index: 2, len: 2 })
        ));
        assert_eq!(s.value_at_index(9), None);
    }

    #[test]
    fn split_and_label_are_inverse() {
        let pos = vec![vec![1.0], vec![2.0]];
        let neg = vec![vec![-1.0]];
        let samples = label_sets(&pos, &neg);
        assert_eq!(samples.len(), 3);
        assert!(samples[0].label.is_positive());
        assert!(!samples[2].label.is_positive());

        let (p, n) = split_by_label(samples);
        assert_eq!(p, pos);
        assert_eq!(n, neg);
    }
}
