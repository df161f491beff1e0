//! High-level API for random forest cancer-risk models
//!
//! This module provides a user-friendly interface for common tasks,
//! including training, prediction, and model evaluation.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use oncoforest::api::RandomForest;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Train a model on data
//! let model = RandomForest::new()
//!     .with_n_trees(100)
//!     .with_seed(42)
//!     .train_from_csv("The_Cancer_data_1500_V2.csv")?;
//!
//! // Make predictions
//! let predictions = model.predict_from_csv("new_patients.csv")?;
//! println!("Accuracy: {:.2}%", model.evaluate_from_csv("holdout.csv")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{schema, Classifier, Dataset, Prediction, Result, Sample};
use crate::data::TabularDataset;
use crate::evaluation::{self, rank_importances, EvaluationReport, FeatureImportance};
use crate::forest::{cross_val_score, ForestConfig, ForestTrainer, MaxFeatures, TrainedForest};
use std::path::Path;

/// Random forest builder
#[derive(Debug, Clone, Default)]
pub struct RandomForest {
    config: ForestConfig,
}

impl RandomForest {
    /// Create a builder with default hyperparameters (100 trees, seed 42)
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn with_config(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Set the number of trees
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.config.n_trees = n_trees;
        self
    }

    /// Limit tree depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = Some(max_depth);
        self
    }

    /// Set the base seed for bootstrap and feature sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.config.max_features = max_features;
        self
    }

    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.config.min_samples_split = min_samples_split;
        self
    }

    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.config.min_samples_leaf = min_samples_leaf;
        self
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train on a dataset
    pub fn train<D: Dataset>(self, dataset: &D) -> Result<TrainedModel> {
        let forest = ForestTrainer::new(self.config.clone()).train(dataset)?;
        Ok(TrainedModel::new(forest, self.config))
    }

    /// Train on samples
    pub fn train_samples(self, samples: &[Sample]) -> Result<TrainedModel> {
        let forest = ForestTrainer::new(self.config.clone()).train_samples(samples)?;
        Ok(TrainedModel::new(forest, self.config))
    }

    /// Train from a CSV file with a `Diagnosis` column
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel> {
        let dataset = TabularDataset::from_file(path)?;
        self.train(&dataset)
    }

    /// K-fold accuracy scores for this configuration
    pub fn cross_validate<D: Dataset>(&self, dataset: &D, folds: usize) -> Result<Vec<f64>> {
        cross_val_score(&self.config, dataset, folds)
    }
}

/// Trained forest bound to the feature schema it was fitted on
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    forest: TrainedForest,
    feature_names: Vec<String>,
    config: ForestConfig,
}

impl TrainedModel {
    pub(crate) fn new(forest: TrainedForest, config: ForestConfig) -> Self {
        Self {
            forest,
            feature_names: schema::feature_names(),
            config,
        }
    }

    /// Rebuild from persisted parts
    pub(crate) fn from_parts(
        forest: TrainedForest,
        feature_names: Vec<String>,
        config: ForestConfig,
    ) -> Self {
        Self {
            forest,
            feature_names,
            config,
        }
    }

    /// Predict a single sample
    pub fn predict(&self, sample: &Sample) -> Prediction {
        self.forest.predict(sample)
    }

    /// Predict multiple samples
    pub fn predict_batch(&self, samples: &[Sample]) -> Vec<Prediction> {
        self.forest.predict_batch(samples)
    }

    /// Predict from dataset
    pub fn predict_dataset<D: Dataset>(&self, dataset: &D) -> Vec<Prediction> {
        let samples: Vec<Sample> = (0..dataset.len()).map(|i| dataset.get_sample(i)).collect();
        self.predict_batch(&samples)
    }

    /// Predict from a labeled CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = TabularDataset::from_file(path)?;
        Ok(self.predict_dataset(&dataset))
    }

    /// Predict from `(feature name, value)` pairs in schema order
    pub fn predict_named<S: AsRef<str>>(&self, pairs: &[(S, f64)]) -> Result<Prediction> {
        let sample = Sample::from_named(pairs)?;
        Ok(self.predict(&sample))
    }

    /// Evaluate accuracy on a dataset
    pub fn evaluate<D: Dataset>(&self, dataset: &D) -> f64 {
        let predictions = self.predict_dataset(dataset);
        let labels = dataset.get_labels();
        if labels.is_empty() {
            return 0.0;
        }

        let correct = predictions
            .iter()
            .zip(labels.iter())
            .filter(|(pred, &actual)| pred.label == actual)
            .count();

        correct as f64 / labels.len() as f64
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = TabularDataset::from_file(path)?;
        Ok(self.evaluate(&dataset))
    }

    /// Confusion matrix, classification report, ROC curve and importances
    pub fn evaluate_detailed<D: Dataset>(&self, dataset: &D) -> Result<EvaluationReport> {
        evaluation::evaluate(&self.forest, dataset)
    }

    /// Importances paired with feature names, most important first
    pub fn ranked_importances(&self) -> Vec<FeatureImportance> {
        rank_importances(&self.feature_names, self.forest.feature_importances())
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        let trees = self.forest.trees();
        let total_leaves: usize = trees.iter().map(|t| t.n_leaves()).sum();
        ModelInfo {
            n_trees: trees.len(),
            max_tree_depth: trees.iter().map(|t| t.depth()).max().unwrap_or(0),
            mean_leaves: if trees.is_empty() {
                0.0
            } else {
                total_leaves as f64 / trees.len() as f64
            },
            feature_names: self.feature_names.clone(),
        }
    }

    /// Feature names the model was trained on, in input order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Get the underlying forest
    pub fn inner(&self) -> &TrainedForest {
        &self.forest
    }
}

/// Model information
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub n_trees: usize,
    pub max_tree_depth: usize,
    pub mean_leaves: f64,
    pub feature_names: Vec<String>,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;
    use crate::data::train_test_split;

    /// Train a forest on CSV data with default parameters
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel> {
        RandomForest::new().train_from_csv(path)
    }

    /// Hold out `test_ratio` of the rows, train on the rest and return test accuracy
    pub fn simple_validation(dataset: &TabularDataset, test_ratio: f64, seed: u64) -> Result<f64> {
        let partition = train_test_split(dataset, test_ratio, seed)?;
        let model = RandomForest::new()
            .with_seed(seed)
            .train(&partition.train)?;
        Ok(model.evaluate(&partition.test))
    }
}
