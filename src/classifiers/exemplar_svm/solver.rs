use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};

use crate::classifiers::exemplar_svm::{LinearModel, PlattSigmoid};
use crate::config::EsvmParams;
use crate::core::FeatureVector;
use crate::error::{EsvmError, Result};

fn common_dimension(positives: &[FeatureVector], negatives: &[FeatureVector]) -> Result<usize> {
    let dim = positives
        .first()
        .map(Vec::len)
        .ok_or_else(|| EsvmError::Training("no positive samples".into()))?;
    if negatives.is_empty() {
        return Err(EsvmError::Training("no negative samples".into()));
    }
    if dim == 0 {
        return Err(EsvmError::Training("samples have no features".into()));
    }
    if let Some(bad) = positives.iter().chain(negatives).find(|v| v.len() != dim) {
        return Err(EsvmError::Training(format!(
            "inconsistent sample dimensions: expected {dim}, found {}",
            bad.len()
        )));
    }
    Ok(dim)
}

/// Runs the linear C-SVC once over `positives ∪ negatives` and collapses the
/// dual solution to `w = Σ αᵢ xᵢ`.
pub(crate) fn fit_linear(
    positives: &[FeatureVector],
    negatives: &[FeatureVector],
    params: &EsvmParams,
) -> Result<LinearModel> {
    let dim = common_dimension(positives, negatives)?;
    let n = positives.len() + negatives.len();

    let mut data = Vec::with_capacity(n * dim);
    for v in positives.iter().chain(negatives) {
        data.extend_from_slice(v);
    }
    let records = Array2::from_shape_vec((n, dim), data)
        .map_err(|e| EsvmError::Training(format!("failed to build sample matrix: {e}")))?;
    let targets: Array1<bool> = (0..n).map(|i| i < positives.len()).collect();

    let (wp, wn) = params.class_weights.weights(positives.len(), negatives.len());
    let dataset = Dataset::new(records, targets);

    let svm = Svm::<_, bool>::params()
        .pos_neg_weights(params.c * wp, params.c * wn)
        .eps(params.eps)
        .linear_kernel()
        .fit(&dataset)
        .map_err(|e| EsvmError::Training(e.to_string()))?;

    let mut weights = Array1::<f64>::zeros(dim);
    let mut support_vectors = 0;
    for (i, &alpha_i) in svm.alpha.iter().enumerate() {
        if alpha_i != 0.0 {
            support_vectors += 1;
            weights.scaled_add(alpha_i, &dataset.records().row(i));
        }
    }

    let mut model = LinearModel {
        weights: weights.to_vec(),
        rho: svm.rho,
        support_vectors,
        positive_weight: wp,
        negative_weight: wn,
        ..LinearModel::new(Vec::new(), 0.0)
    };

    if params.probability {
        let decisions = positives
            .iter()
            .chain(negatives)
            .map(|v| model.decision(v))
            .collect::<Result<Vec<_>>>()?;
        let labels: Vec<bool> = (0..n).map(|i| i < positives.len()).collect();
        model.probability = Some(PlattSigmoid::fit(&decisions, &labels)?);
    }

    tracing::debug!(
        positives = positives.len(),
        negatives = negatives.len(),
        support_vectors,
        rho = model.rho,
        "fitted linear svm"
    );
    Ok(model)
}
