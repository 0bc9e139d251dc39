use crate::classifiers::ensemble::PatchDescriptor;
use crate::core::FeatureVector;
use crate::error::{EsvmError, Result};

/// "Images" that already are per-patch descriptors.
#[derive(Debug, Clone, Copy)]
pub struct VectorDescriptor {
    patch_count: usize,
}

impl VectorDescriptor {
    pub fn new(patch_count: usize) -> Self {
        Self { patch_count }
    }
}

impl PatchDescriptor<Vec<FeatureVector>> for VectorDescriptor {
    fn describe_patches(&self, image: &Vec<FeatureVector>) -> Result<Vec<FeatureVector>> {
        if image.len() != self.patch_count {
            return Err(EsvmError::DimensionMismatch {
                expected: self.patch_count,
                actual: image.len(),
            });
        }
        Ok(image.clone())
    }
}
