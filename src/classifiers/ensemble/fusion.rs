use crate::error::{EsvmError, Result};

/// Arithmetic mean of per-patch scores.
pub fn fuse_mean(scores: &[f64]) -> Result<f64> {
    if scores.is_empty() {
        return Err(EsvmError::EmptyPopulation("no patch scores to fuse".into()));
    }
    Ok(scores.iter().sum::<f64>() / scores.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPS: f64 = 1e-12;

    #[test]
    fn mean_of_patch_scores() {
        assert!((fuse_mean(&[0.2, -0.1, 0.5]).unwrap() - 0.2).abs() < EPS);
        assert_eq!(fuse_mean(&[-3.0]).unwrap(), -3.0);
    }

    #[test]
    fn empty_scores_fail() {
        assert!(matches!(fuse_mean(&[]), Err(EsvmError::EmptyPopulation(_))));
    }
}
