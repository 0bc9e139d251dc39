use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::classifiers::Classifier;
use crate::classifiers::ensemble::{
    Augmenter, NegativeSource, PatchDescriptor, fuse_mean, model_file_name,
};
use crate::classifiers::exemplar_svm::ExemplarSvm;
use crate::codec::DataFormat;
use crate::config::EnsembleConfig;
use crate::core::{FeatureVector, Ragged};
use crate::error::{EsvmError, Result};
use crate::normalization::{NormalizationPlan, discover};

/// Patch-grid Exemplar-SVM ensemble.
///
/// Every enrolled identity owns one classifier per patch. The grid is indexed
/// `[patch][identity]`: the patch axis is fixed by the configuration, the
/// identity axis grows by one column per new enrollment. A probe is scored by
/// every cell and the per-patch scores of an identity are averaged.
#[derive(Debug, Clone)]
pub struct EnsembleEsvm {
    config: EnsembleConfig,
    normalization: Option<NormalizationPlan>,
    grid: Ragged<Ragged<ExemplarSvm>>,
    identities: Vec<String>,
}

fn check_identity(identity: &str) -> Result<()> {
    if identity.is_empty() || identity.contains(['/', '\\']) {
        return Err(EsvmError::IllegalState(format!(
            "identity '{identity}' cannot be used as a model file name"
        )));
    }
    Ok(())
}

impl EnsembleEsvm {
    pub fn new(config: EnsembleConfig, normalization: Option<NormalizationPlan>) -> Result<Self> {
        config.validate()?;
        if let Some(bound) = normalization.as_ref().and_then(NormalizationPlan::patch_count) {
            if bound != config.patch_count {
                return Err(EsvmError::DimensionMismatch {
                    expected: config.patch_count,
                    actual: bound,
                });
            }
        }
        if !config.patch_thresholds.is_empty() {
            warn!(
                thresholds = config.patch_thresholds.len(),
                "patch_thresholds are configured but fusion does not apply them"
            );
        }
        debug!(
            patches = config.patch_count,
            normalized = normalization.is_some(),
            parallel = config.parallel,
            "created ensemble"
        );
        Ok(Self {
            grid: Ragged::with_sizes(&[config.patch_count]),
            config,
            normalization,
            identities: Vec::new(),
        })
    }

    /// Discovers the normalization plan from a reference population indexed
    /// `[patch][sample]`, using the configured method and scope.
    pub fn with_reference_population(
        config: EnsembleConfig,
        reference: &Ragged<Ragged<FeatureVector>>,
    ) -> Result<Self> {
        let fnorm = &config.feature_normalization;
        let plan = discover(reference, fnorm.scope, fnorm.method)?;
        Self::new(config, Some(plan))
    }

    fn normalize(&self, patch: usize, features: &[f64]) -> Result<FeatureVector> {
        match &self.normalization {
            Some(plan) => plan.apply(patch, features, self.config.feature_normalization.clip),
            None => Ok(features.to_vec()),
        }
    }

    fn check_patch_count(&self, descriptors: &[FeatureVector]) -> Result<()> {
        if descriptors.len() != self.config.patch_count {
            return Err(EsvmError::DimensionMismatch {
                expected: self.config.patch_count,
                actual: descriptors.len(),
            });
        }
        Ok(())
    }

    /// Describes every representation of every image and enrolls the
    /// identity from them. Returns the identity's column index.
    pub fn enroll<I, D, A>(
        &mut self,
        identity: &str,
        images: &[I],
        describer: &D,
        augmenter: &A,
        negatives: &dyn NegativeSource,
    ) -> Result<usize>
    where
        D: PatchDescriptor<I> + ?Sized,
        A: Augmenter<I> + ?Sized,
    {
        let mut representations = Vec::new();
        for image in images {
            for rep in augmenter.representations(image) {
                representations.push(describer.describe_patches(&rep)?);
            }
        }
        self.enroll_descriptors(identity, &representations, negatives)
    }

    /// Enrolls from already-computed descriptors, one `Vec` of per-patch
    /// vectors per representation.
    ///
    /// The new column is committed only if every patch trains. Enrolling a
    /// known identity replaces its column in place.
    pub fn enroll_descriptors(
        &mut self,
        identity: &str,
        representations: &[Vec<FeatureVector>],
        negatives: &dyn NegativeSource,
    ) -> Result<usize> {
        check_identity(identity)?;
        if representations.is_empty() {
            return Err(EsvmError::Training(format!(
                "no representations to enroll '{identity}' from"
            )));
        }
        for rep in representations {
            self.check_patch_count(rep)?;
        }

        let patch_count = self.config.patch_count;
        let positives: Vec<Vec<FeatureVector>> = (0..patch_count)
            .map(|p| {
                representations
                    .iter()
                    .map(|rep| self.normalize(p, &rep[p]))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<_>>()?;

        let train_patch = |p: usize| -> Result<ExemplarSvm> {
            let mut pool = negatives.negatives(p)?;
            if self.config.feature_normalization.normalize_negatives {
                pool = pool
                    .iter()
                    .map(|v| self.normalize(p, v))
                    .collect::<Result<_>>()?;
            }
            ExemplarSvm::train(
                &positives[p],
                &pool,
                Some(identity.to_string()),
                &self.config.esvm,
            )
        };

        let column: Vec<ExemplarSvm> = if self.config.parallel {
            (0..patch_count)
                .into_par_iter()
                .map(train_patch)
                .collect::<Result<_>>()?
        } else {
            (0..patch_count).map(train_patch).collect::<Result<_>>()?
        };

        let index = match self.identities.iter().position(|id| id == identity) {
            Some(existing) => {
                for (branch, cell) in self.grid.iter_mut().zip(column) {
                    branch.set(existing, cell)?;
                }
                info!(identity, index = existing, "re-enrolled identity");
                existing
            }
            None => {
                for (branch, cell) in self.grid.iter_mut().zip(column) {
                    branch.push(cell);
                }
                self.identities.push(identity.to_string());
                info!(
                    identity,
                    index = self.identities.len() - 1,
                    representations = representations.len(),
                    "enrolled identity"
                );
                self.identities.len() - 1
            }
        };
        Ok(index)
    }

    pub fn classify<I, D>(&self, probe: &I, describer: &D) -> Result<Vec<f64>>
    where
        D: PatchDescriptor<I> + ?Sized,
    {
        self.classify_descriptors(&describer.describe_patches(probe)?)
    }

    /// Raw cell scores indexed `[patch][identity]`.
    pub fn classify_patch_scores(
        &self,
        descriptors: &[FeatureVector],
    ) -> Result<Ragged<Ragged<f64>>> {
        self.check_patch_count(descriptors)?;
        let score_patch = |p: usize| -> Result<Ragged<f64>> {
            let x = self.normalize(p, &descriptors[p])?;
            self.grid[p].iter().map(|cell| cell.predict(&x)).collect()
        };
        let patches: Vec<Ragged<f64>> = if self.config.parallel {
            (0..self.config.patch_count)
                .into_par_iter()
                .map(score_patch)
                .collect::<Result<_>>()?
        } else {
            (0..self.config.patch_count)
                .map(score_patch)
                .collect::<Result<_>>()?
        };
        Ok(patches.into())
    }

    /// One fused similarity per enrolled identity, in enrollment order.
    pub fn classify_descriptors(&self, descriptors: &[FeatureVector]) -> Result<Vec<f64>> {
        let per_patch = self.classify_patch_scores(descriptors)?;
        let fuse_identity = |i: usize| -> Result<f64> {
            let scores: Vec<f64> = per_patch.iter().map(|patch| patch[i]).collect();
            let fused = fuse_mean(&scores)?;
            match &self.config.score_normalization {
                Some(s) => s.params.apply(fused, s.clip),
                None => Ok(fused),
            }
        };
        let fused: Vec<f64> = if self.config.parallel {
            (0..self.identities.len())
                .into_par_iter()
                .map(fuse_identity)
                .collect::<Result<_>>()?
        } else {
            (0..self.identities.len())
                .map(fuse_identity)
                .collect::<Result<_>>()?
        };
        debug!(identities = fused.len(), "classified probe");
        Ok(fused)
    }

    pub fn positive_count(&self) -> usize {
        self.identities.len()
    }

    pub fn patch_count(&self) -> usize {
        self.config.patch_count
    }

    /// Identity enrolled at `index`, or `""` if there is none.
    pub fn positive_id(&self, index: usize) -> &str {
        self.identities.get(index).map_or("", String::as_str)
    }

    pub fn identities(&self) -> &[String] {
        &self.identities
    }

    pub fn cell(&self, patch: usize, identity: usize) -> Result<&ExemplarSvm> {
        self.grid.get(patch)?.get(identity)
    }

    pub fn normalization(&self) -> Option<&NormalizationPlan> {
        self.normalization.as_ref()
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Writes every cell to `dir` in the configured `model_format`.
    pub fn save_models(&self, dir: impl AsRef<Path>) -> Result<()> {
        self.save_models_as(dir, self.config.model_format)
    }

    /// Writes every cell to `dir`, one file per `(patch, identity)`.
    pub fn save_models_as(&self, dir: impl AsRef<Path>, format: DataFormat) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let cells: Vec<(usize, usize)> = (0..self.config.patch_count)
            .flat_map(|p| (0..self.identities.len()).map(move |i| (p, i)))
            .collect();
        let save_cell = |&(p, i): &(usize, usize)| -> Result<()> {
            let path = dir.join(model_file_name(p, &self.identities[i], format));
            self.grid[p][i].save(path, format)
        };
        if self.config.parallel {
            cells.par_iter().try_for_each(save_cell)?;
        } else {
            cells.iter().try_for_each(save_cell)?;
        }
        info!(
            dir = %dir.display(),
            %format,
            models = cells.len(),
            "saved ensemble models"
        );
        Ok(())
    }

    /// Rebuilds the grid from files in the configured `model_format`.
    pub fn load_models(&mut self, dir: impl AsRef<Path>, identities: &[String]) -> Result<()> {
        self.load_models_as(dir, identities, self.config.model_format)
    }

    /// Rebuilds the grid from files written by [`EnsembleEsvm::save_models_as`].
    /// The current grid is kept if any file fails to load.
    pub fn load_models_as(
        &mut self,
        dir: impl AsRef<Path>,
        identities: &[String],
        format: DataFormat,
    ) -> Result<()> {
        let dir = dir.as_ref();
        for id in identities {
            check_identity(id)?;
        }
        let load_patch = |p: usize| -> Result<Ragged<ExemplarSvm>> {
            identities
                .iter()
                .map(|id| {
                    let path = dir.join(model_file_name(p, id, format));
                    ExemplarSvm::from_model_file(path, format, Some(id.clone()))
                })
                .collect()
        };
        let grid: Vec<Ragged<ExemplarSvm>> = if self.config.parallel {
            (0..self.config.patch_count)
                .into_par_iter()
                .map(load_patch)
                .collect::<Result<_>>()?
        } else {
            (0..self.config.patch_count)
                .map(load_patch)
                .collect::<Result<_>>()?
        };
        self.grid = grid.into();
        self.identities = identities.to_vec();
        info!(
            dir = %dir.display(),
            %format,
            identities = identities.len(),
            "loaded ensemble models"
        );
        Ok(())
    }
}
