//! Random forest training and prediction
//!
//! [`ForestTrainer`] grows `n_trees` decision trees, each on a bootstrap draw
//! of the training rows with its own ChaCha stream (`seed + tree index`), so
//! training is reproducible for a fixed configuration and dataset.

pub mod cross_validation;

pub use self::cross_validation::{cross_val_score, fold_ranges};

use crate::core::{
    Classifier, Dataset, Label, OncoError, Prediction, Result, Sample, N_FEATURES,
};
use crate::tree::{DecisionTree, TreeParams};
use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of features examined at each split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    Sqrt,
    /// Every feature
    All,
    /// A fixed count, clamped to the number of features
    Fixed(usize),
}

impl MaxFeatures {
    /// Resolve to a concrete count for `n_features` columns
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Unbounded depth when `None`
    pub max_depth: Option<usize>,
    pub seed: u64,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            seed: 42,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestConfig {
    /// Reject configurations that cannot grow a forest
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(OncoError::InvalidParameter(
                "n_trees must be at least 1".to_string(),
            ));
        }
        if self.max_depth == Some(0) {
            return Err(OncoError::InvalidParameter(
                "max_depth must be at least 1 when set".to_string(),
            ));
        }
        if self.min_samples_split < 2 {
            return Err(OncoError::InvalidParameter(format!(
                "min_samples_split must be at least 2, got {}",
                self.min_samples_split
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(OncoError::InvalidParameter(
                "min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let MaxFeatures::Fixed(0) = self.max_features {
            return Err(OncoError::InvalidParameter(
                "max_features must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.resolve(N_FEATURES),
        }
    }
}

/// Grows random forests from labeled data
#[derive(Debug, Clone, Default)]
pub struct ForestTrainer {
    config: ForestConfig,
}

impl ForestTrainer {
    pub fn new(config: ForestConfig) -> Self {
        Self { config }
    }

    /// Train a forest on every row of the dataset
    pub fn train<D: Dataset>(&self, dataset: &D) -> Result<TrainedForest> {
        let samples: Vec<Sample> = (0..dataset.len()).map(|i| dataset.get_sample(i)).collect();
        self.train_samples(&samples)
    }

    /// Train a forest on a slice of labeled samples
    pub fn train_samples(&self, samples: &[Sample]) -> Result<TrainedForest> {
        self.config.validate()?;
        if samples.is_empty() {
            return Err(OncoError::EmptyData(
                "Cannot train a forest on zero samples".to_string(),
            ));
        }

        let x: Vec<[f64; N_FEATURES]> = samples.iter().map(|s| s.features).collect();
        let y = samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                s.label.ok_or_else(|| {
                    OncoError::EmptyData(format!("Training sample {i} has no label"))
                })
            })
            .collect::<Result<Vec<Label>>>()?;

        let params = self.config.tree_params();
        let n = samples.len();

        let trees: Vec<DecisionTree> = (0..self.config.n_trees)
            .map(|tree_idx| {
                let mut rng =
                    ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(tree_idx as u64));
                let rows: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let tree = DecisionTree::fit(&x, &y, rows, &params, &mut rng);
                debug!(
                    "Tree {}: depth {}, {} leaves",
                    tree_idx,
                    tree.depth(),
                    tree.n_leaves()
                );
                tree
            })
            .collect();

        Ok(TrainedForest::from_trees(trees))
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

/// A fitted random forest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedForest {
    trees: Vec<DecisionTree>,
    feature_importances: Vec<f64>,
}

impl TrainedForest {
    /// Assemble a forest, averaging and renormalizing the trees' importances
    pub(crate) fn from_trees(trees: Vec<DecisionTree>) -> Self {
        let mut importances = vec![0.0; N_FEATURES];
        for tree in &trees {
            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
        }
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self {
            trees,
            feature_importances: importances,
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    fn positive_votes(&self, features: &[f64; N_FEATURES]) -> usize {
        self.trees
            .iter()
            .filter(|t| t.predict(features) == Label::Positive)
            .count()
    }
}

impl Classifier for TrainedForest {
    /// Majority vote of the trees; a tied vote predicts negative.
    /// The probability is the fraction of trees voting positive.
    fn predict(&self, sample: &Sample) -> Prediction {
        let total = self.trees.len();
        let positive = self.positive_votes(&sample.features);
        let label = if positive * 2 > total {
            Label::Positive
        } else {
            Label::Negative
        };
        let probability = if total == 0 {
            0.0
        } else {
            positive as f64 / total as f64
        };
        Prediction::new(label, probability)
    }

    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
