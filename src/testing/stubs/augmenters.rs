use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::classifiers::ensemble::Augmenter;
use crate::core::FeatureVector;

/// Returns the original plus `copies` jittered variants. The same image
/// always yields the same variants.
#[derive(Debug, Clone, Copy)]
pub struct JitterAugmenter {
    copies: usize,
    spread: f64,
    seed: u64,
}

impl JitterAugmenter {
    pub fn new(copies: usize, spread: f64, seed: u64) -> Self {
        Self {
            copies,
            spread,
            seed,
        }
    }
}

impl Augmenter<Vec<FeatureVector>> for JitterAugmenter {
    fn representations(&self, image: &Vec<FeatureVector>) -> Vec<Vec<FeatureVector>> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut out = Vec::with_capacity(self.copies + 1);
        out.push(image.clone());
        for _ in 0..self.copies {
            let variant: Vec<FeatureVector> = image
                .iter()
                .map(|patch| {
                    patch
                        .iter()
                        .map(|x| x + rng.random_range(-self.spread..=self.spread))
                        .collect()
                })
                .collect();
            out.push(variant);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_first_then_deterministic_variants() {
        let image = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let aug = JitterAugmenter::new(2, 0.1, 5);
        let a = aug.representations(&image);
        let b = aug.representations(&image);
        assert_eq!(a.len(), 3);
        assert_eq!(a[0], image);
        assert_eq!(a, b);
        assert_ne!(a[1], image);
    }
}
