use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{FeatureVector, Ragged};

const AMPLITUDE: f64 = 2.0;
const IMAGE_SPREAD: f64 = 0.1;
const BACKGROUND: f64 = 0.5;

/// Synthetic "faces" already split into per-patch descriptors.
///
/// Identity `k` lights up feature `(k + patch) % dimension` of every patch.
/// Background (negative) vectors are uniform in `[-0.5, 0.5]`.
#[derive(Debug)]
pub struct SyntheticGallery {
    rng: StdRng,
    patch_count: usize,
    dimension: usize,
}

impl SyntheticGallery {
    pub fn new(patch_count: usize, dimension: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            patch_count,
            dimension,
        }
    }

    pub fn prototype(&self, identity: usize, patch: usize) -> FeatureVector {
        let mut v = vec![0.0; self.dimension];
        v[(identity + patch) % self.dimension] = AMPLITUDE;
        v
    }

    /// A jittered capture of `identity`, one descriptor per patch.
    pub fn image(&mut self, identity: usize) -> Vec<FeatureVector> {
        let mut image = Vec::with_capacity(self.patch_count);
        for p in 0..self.patch_count {
            let mut v = self.prototype(identity, p);
            for x in v.iter_mut() {
                *x += self.rng.random_range(-IMAGE_SPREAD..=IMAGE_SPREAD);
            }
            image.push(v);
        }
        image
    }

    /// Background pool indexed `[patch][sample]` with `counts[patch]`
    /// samples per patch.
    pub fn negatives(&mut self, counts: &[usize]) -> Ragged<Ragged<FeatureVector>> {
        counts
            .iter()
            .map(|&n| {
                (0..n)
                    .map(|_| {
                        (0..self.dimension)
                            .map(|_| self.rng.random_range(-BACKGROUND..=BACKGROUND))
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}
