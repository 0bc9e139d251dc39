use crate::core::FeatureVector;
use crate::error::{EsvmError, Result};
use crate::normalization::discovery::find_for_values;
use crate::normalization::{NormMethod, NormParams};

#[inline]
fn clip_unit(y: f64, clip: bool) -> f64 {
    if clip { y.clamp(0.0, 1.0) } else { y }
}

/// `(x - min) / (max - min)`, optionally clipped to `[0, 1]`.
pub fn normalize_min_max(x: f64, min: f64, max: f64, clip: bool) -> Result<f64> {
    if !(max > min) {
        return Err(EsvmError::DegenerateRange {
            method: NormMethod::MinMax,
            first: min,
            second: max,
        });
    }
    Ok(clip_unit((x - min) / (max - min), clip))
}

/// `0.5 + (x - mean) / (6 * stddev)`, optionally clipped to `[0, 1]`.
///
/// A value three standard deviations below the mean lands on `0`, three above
/// on `1`.
pub fn normalize_z_score(x: f64, mean: f64, stddev: f64, clip: bool) -> Result<f64> {
    if stddev == 0.0 || stddev.is_nan() {
        return Err(EsvmError::DegenerateRange {
            method: NormMethod::ZScore,
            first: mean,
            second: stddev,
        });
    }
    Ok(clip_unit(0.5 + (x - mean) / (6.0 * stddev), clip))
}

/// Applies one parameter pair to every element.
pub fn normalize_over_all(
    features: &[f64],
    params: &NormParams,
    clip: bool,
) -> Result<FeatureVector> {
    params.validate()?;
    features.iter().map(|&x| params.apply(x, clip)).collect()
}

/// Normalizes a vector with parameters discovered from the vector itself.
pub fn normalize_over_all_self(
    features: &[f64],
    method: NormMethod,
    clip: bool,
) -> Result<FeatureVector> {
    let params = find_for_values(features, method)?;
    normalize_over_all(features, &params, clip)
}

/// Applies `(first[i], second[i])` to feature `i`.
pub fn normalize_per_feature(
    features: &[f64],
    method: NormMethod,
    first: &[f64],
    second: &[f64],
    clip: bool,
) -> Result<FeatureVector> {
    if first.len() != second.len() {
        return Err(EsvmError::DimensionMismatch {
            expected: first.len(),
            actual: second.len(),
        });
    }
    if first.len() != features.len() {
        return Err(EsvmError::DimensionMismatch {
            expected: first.len(),
            actual: features.len(),
        });
    }

    features
        .iter()
        .zip(first.iter().zip(second))
        .map(|(&x, (&a, &b))| match method {
            NormMethod::MinMax => normalize_min_max(x, a, b, clip),
            NormMethod::ZScore => normalize_z_score(x, a, b, clip),
        })
        .collect()
}
