use crate::error::Result;
use crate::normalization::discovery::find_for_values;
use crate::normalization::functions::normalize_over_all;
use crate::normalization::{NormMethod, NormParams};

/// Calibrates score normalization parameters over a population of scores.
pub fn find_score_params(scores: &[f64], method: NormMethod) -> Result<NormParams> {
    find_for_values(scores, method)
}

pub fn normalize_scores(scores: &[f64], params: &NormParams, clip: bool) -> Result<Vec<f64>> {
    normalize_over_all(scores, params, clip)
}

/// Maps a decision score on a `±1` scale to a `[0, 1]` similarity.
#[inline]
pub fn normalize_class_score_to_similarity(score: f64) -> f64 {
    (score + 1.0) / 2.0
}
