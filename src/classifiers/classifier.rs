use crate::core::FeatureVector;
use crate::error::Result;

pub trait Classifier {
    fn predict(&self, features: &[f64]) -> Result<f64>;

    /// Scores every vector in order.
    fn predict_batch(&self, batch: &[FeatureVector]) -> Result<Vec<f64>> {
        batch.iter().map(|x| self.predict(x)).collect()
    }

    fn is_trained(&self) -> bool;
}
