//! Core traits for the cancer-risk pipeline

use crate::core::schema::N_FEATURES;
use crate::core::{Label, Prediction, Sample};

/// Labeled dataset abstraction
pub trait Dataset: Send + Sync {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize {
        N_FEATURES
    }

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if index >= len()
    fn get_sample(&self, i: usize) -> Sample;

    /// Get multiple samples
    fn get_batch(&self, indices: &[usize]) -> Vec<Sample> {
        indices.iter().map(|&i| self.get_sample(i)).collect()
    }

    /// Get all labels in row order
    fn get_labels(&self) -> Vec<Label>;

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fitted binary classifier
pub trait Classifier: Send + Sync {
    /// Predict a single sample
    fn predict(&self, sample: &Sample) -> Prediction;

    /// Predict multiple samples
    fn predict_batch(&self, samples: &[Sample]) -> Vec<Prediction> {
        samples.iter().map(|s| self.predict(s)).collect()
    }

    /// Positive-class probability
    fn predict_proba(&self, sample: &Sample) -> f64 {
        self.predict(sample).probability
    }

    /// Per-feature importance in schema order, summing to 1 when any split exists
    fn feature_importances(&self) -> &[f64];
}
