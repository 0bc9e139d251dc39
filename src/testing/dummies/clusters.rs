use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::FeatureVector;

#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub dimension: usize,
    pub positives: usize,
    pub negatives: usize,
    /// Distance between the two cluster centres along every axis.
    pub separation: f64,
    /// Half-width of the uniform jitter around each centre.
    pub spread: f64,
}

impl Default for ClusterSpec {
    fn default() -> Self {
        Self {
            dimension: 4,
            positives: 3,
            negatives: 40,
            separation: 3.0,
            spread: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticSet {
    pub positives: Vec<FeatureVector>,
    pub negatives: Vec<FeatureVector>,
}

fn jittered(rng: &mut StdRng, centre: f64, spec: &ClusterSpec) -> FeatureVector {
    (0..spec.dimension)
        .map(|_| centre + rng.random_range(-spec.spread..=spec.spread))
        .collect()
}

/// Two uniform boxes centred at `±separation / 2`, linearly separable whenever
/// `separation > 2 * spread`.
pub fn two_clusters(spec: &ClusterSpec, seed: u64) -> SyntheticSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let half = spec.separation / 2.0;
    let positives = (0..spec.positives)
        .map(|_| jittered(&mut rng, half, spec))
        .collect();
    let negatives = (0..spec.negatives)
        .map(|_| jittered(&mut rng, -half, spec))
        .collect();
    SyntheticSet {
        positives,
        negatives,
    }
}
