use std::path::{Path, PathBuf};

use tracing::warn;

use crate::classifiers::ensemble::negatives_file_name;
use crate::codec::{self, DataFormat};
use crate::core::samples::split_by_label;
use crate::core::{FeatureVector, Ragged, Sample};
use crate::error::Result;

/// Turns an image into one descriptor per configured patch, in patch order.
pub trait PatchDescriptor<I: ?Sized> {
    fn describe_patches(&self, image: &I) -> Result<Vec<FeatureVector>>;
}

/// Expands an image into the representations an identity is trained from:
/// the original plus any synthetic variants.
pub trait Augmenter<I> {
    fn representations(&self, image: &I) -> Vec<I>;
}

/// Trains from the original image only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAugmentation;

impl<I: Clone> Augmenter<I> for NoAugmentation {
    fn representations(&self, image: &I) -> Vec<I> {
        vec![image.clone()]
    }
}

/// Shared negative pool, one set per patch.
pub trait NegativeSource: Sync {
    fn negatives(&self, patch: usize) -> Result<Vec<FeatureVector>>;
}

/// Negatives held in memory, indexed `[patch][sample]`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNegatives {
    patches: Ragged<Ragged<FeatureVector>>,
}

impl InMemoryNegatives {
    pub fn new(patches: Ragged<Ragged<FeatureVector>>) -> Self {
        Self { patches }
    }

    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }

    pub fn patches(&self) -> &Ragged<Ragged<FeatureVector>> {
        &self.patches
    }
}

impl From<Ragged<Ragged<FeatureVector>>> for InMemoryNegatives {
    fn from(patches: Ragged<Ragged<FeatureVector>>) -> Self {
        Self::new(patches)
    }
}

impl NegativeSource for InMemoryNegatives {
    fn negatives(&self, patch: usize) -> Result<Vec<FeatureVector>> {
        Ok(self.patches.get(patch)?.as_slice().to_vec())
    }
}

/// Negatives stored one dataset file per patch under a directory, named by
/// [`negatives_file_name`].
#[derive(Debug, Clone)]
pub struct FileNegativeSource {
    dir: PathBuf,
    format: DataFormat,
}

impl FileNegativeSource {
    pub fn new(dir: impl Into<PathBuf>, format: DataFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn path_for(&self, patch: usize) -> PathBuf {
        self.dir.join(negatives_file_name(patch, self.format))
    }

    /// Writes every patch of `patches` where [`FileNegativeSource`] will look
    /// for it.
    pub fn write_all(
        dir: impl AsRef<Path>,
        patches: &Ragged<Ragged<FeatureVector>>,
        format: DataFormat,
    ) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let source = Self::new(dir, format);
        for (p, patch) in patches.iter().enumerate() {
            let samples: Vec<Sample> = patch.iter().cloned().map(Sample::negative).collect();
            codec::write_samples(source.path_for(p), &samples, format)?;
        }
        Ok(source)
    }
}

impl NegativeSource for FileNegativeSource {
    fn negatives(&self, patch: usize) -> Result<Vec<FeatureVector>> {
        let path = self.path_for(patch);
        let (positives, negatives) = split_by_label(codec::read_samples(&path, self.format)?);
        if !positives.is_empty() {
            warn!(
                path = %path.display(),
                dropped = positives.len(),
                "ignoring positive samples in negative pool"
            );
        }
        Ok(negatives)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EsvmError;

    fn pool() -> Ragged<Ragged<FeatureVector>> {
        let mut p: Ragged<Ragged<FeatureVector>> = Ragged::new();
        p.push(vec![vec![0.0, 1.0]].into());
        p.push(vec![vec![1.0, 0.0], vec![0.5, 0.5], vec![0.2, 0.1]].into());
        p
    }

    #[test]
    fn no_augmentation_is_identity() {
        let reps = NoAugmentation.representations(&vec![1, 2, 3]);
        assert_eq!(reps, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn in_memory_patches_may_differ_in_size() {
        let source = InMemoryNegatives::new(pool());
        assert_eq!(source.patch_count(), 2);
        assert_eq!(source.negatives(0).unwrap().len(), 1);
        assert_eq!(source.negatives(1).unwrap().len(), 3);
        assert!(matches!(
            source.negatives(2),
            Err(EsvmError::Index { index: 2, len: 2 })
        ));
    }

    #[test]
    fn file_source_reads_what_was_written() {
        let dir = tempfile::tempdir().unwrap();
        for format in [DataFormat::Text, DataFormat::Binary] {
            let source = FileNegativeSource::write_all(dir.path(), &pool(), format).unwrap();
            assert!(source.path_for(1).ends_with(negatives_file_name(1, format)));
            assert_eq!(source.negatives(1).unwrap(), pool()[1].as_slice().to_vec());
        }
    }

    #[test]
    fn file_source_drops_positives_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileNegativeSource::new(dir.path(), DataFormat::Text);
        codec::write_samples(
            source.path_for(0),
            &[Sample::positive(vec![9.0]), Sample::negative(vec![1.0])],
            DataFormat::Text,
        )
        .unwrap();
        assert_eq!(source.negatives(0).unwrap(), vec![vec![1.0]]);
        assert!(matches!(source.negatives(1), Err(EsvmError::Io(_))));
    }
}
