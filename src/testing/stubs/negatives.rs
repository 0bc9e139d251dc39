use crate::classifiers::ensemble::NegativeSource;
use crate::core::FeatureVector;
use crate::error::{EsvmError, Result};

/// Delegates to `inner` but fails for one patch.
#[derive(Debug, Clone)]
pub struct FailingNegatives<S> {
    inner: S,
    failing_patch: usize,
}

impl<S: NegativeSource> FailingNegatives<S> {
    pub fn new(inner: S, failing_patch: usize) -> Self {
        Self {
            inner,
            failing_patch,
        }
    }
}

impl<S: NegativeSource> NegativeSource for FailingNegatives<S> {
    fn negatives(&self, patch: usize) -> Result<Vec<FeatureVector>> {
        if patch == self.failing_patch {
            return Err(EsvmError::Io(std::io::Error::other(format!(
                "negative pool for patch {patch} is unavailable"
            ))));
        }
        self.inner.negatives(patch)
    }
}
