use std::path::Path;

use tracing::{debug, info};

use crate::classifiers::Classifier;
use crate::classifiers::exemplar_svm::LinearModel;
use crate::classifiers::exemplar_svm::solver::fit_linear;
use crate::codec::{self, DataFormat};
use crate::config::EsvmParams;
use crate::core::samples::split_by_label;
use crate::core::{FeatureVector, Label};
use crate::error::{EsvmError, Result};

/// Scores of a labelled dataset, aligned with its ground truths.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePredictions {
    pub scores: Vec<f64>,
    pub ground_truths: Vec<Label>,
}

/// One linear classifier trained from few positives against a large negative
/// pool.
///
/// Holds at most one model. An unset classifier refuses to predict; `Clone`
/// deep-copies the model and [`ExemplarSvm::take`] moves it out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExemplarSvm {
    model: Option<LinearModel>,
    id: Option<String>,
}

crate::nested_leaf!(ExemplarSvm);

impl ExemplarSvm {
    pub fn new(id: Option<String>) -> Self {
        Self { model: None, id }
    }

    pub fn train(
        positives: &[FeatureVector],
        negatives: &[FeatureVector],
        id: Option<String>,
        params: &EsvmParams,
    ) -> Result<Self> {
        let mut esvm = Self::new(id);
        esvm.retrain(positives, negatives, params)?;
        Ok(esvm)
    }

    /// Replaces the current model with one trained on the given sets. On
    /// failure the previous model is kept.
    pub fn retrain(
        &mut self,
        positives: &[FeatureVector],
        negatives: &[FeatureVector],
        params: &EsvmParams,
    ) -> Result<()> {
        params.validate()?;
        let model = fit_linear(positives, negatives, params)?;
        debug!(
            id = self.id.as_deref().unwrap_or(""),
            positives = positives.len(),
            negatives = negatives.len(),
            support_vectors = model.support_vectors,
            "trained exemplar svm"
        );
        self.model = Some(model);
        Ok(())
    }

    pub fn from_training_file(
        path: impl AsRef<Path>,
        format: DataFormat,
        id: Option<String>,
        params: &EsvmParams,
    ) -> Result<Self> {
        let (positives, negatives) = split_by_label(codec::read_samples(path, format)?);
        Self::train(&positives, &negatives, id, params)
    }

    pub fn from_model_file(
        path: impl AsRef<Path>,
        format: DataFormat,
        id: Option<String>,
    ) -> Result<Self> {
        let mut esvm = Self::new(id);
        esvm.load(path, format)?;
        Ok(esvm)
    }

    fn trained_model(&self) -> Result<&LinearModel> {
        self.model
            .as_ref()
            .ok_or_else(|| EsvmError::IllegalState("exemplar svm has no trained model".into()))
    }

    /// Raw margin `w · x - rho`, regardless of probability calibration.
    pub fn decision_value(&self, features: &[f64]) -> Result<f64> {
        self.trained_model()?.decision(features)
    }

    pub fn predict_file(
        &self,
        path: impl AsRef<Path>,
        format: DataFormat,
    ) -> Result<FilePredictions> {
        let model = self.trained_model()?;
        let samples = codec::read_samples(path, format)?;
        let mut scores = Vec::with_capacity(samples.len());
        let mut ground_truths = Vec::with_capacity(samples.len());
        for s in samples {
            scores.push(model.score(&s.features)?);
            ground_truths.push(s.label);
        }
        Ok(FilePredictions {
            scores,
            ground_truths,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>, format: DataFormat) -> Result<()> {
        let path = path.as_ref();
        codec::write_model(path, self.trained_model()?, format)?;
        info!(path = %path.display(), %format, "saved exemplar svm");
        Ok(())
    }

    /// Replaces the current model with the one stored at `path`. On failure
    /// the current model is kept.
    pub fn load(&mut self, path: impl AsRef<Path>, format: DataFormat) -> Result<()> {
        let path = path.as_ref();
        let model = codec::read_model(path, format)?;
        debug!(
            path = %path.display(),
            %format,
            features = model.dimension(),
            "loaded exemplar svm"
        );
        self.model = Some(model);
        Ok(())
    }

    pub fn reset(&mut self) {
        self.model = None;
    }

    pub fn reset_with_model(&mut self, model: LinearModel) {
        self.model = Some(model);
    }

    pub fn reset_with_copy(&mut self, model: &LinearModel) {
        self.model = Some(model.clone());
    }

    /// Moves the model out, leaving this classifier unset.
    pub fn take(&mut self) -> Option<LinearModel> {
        self.model.take()
    }

    pub fn model(&self) -> Option<&LinearModel> {
        self.model.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

impl Classifier for ExemplarSvm {
    /// `P(+1 | x)` if the model was trained with probability estimates,
    /// else the decision value.
    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.trained_model()?.score(features)
    }

    fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        let model = self.trained_model()?;
        batch.iter().map(|x| model.score(x)).collect()
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }
}
