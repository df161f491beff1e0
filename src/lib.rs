//! Random forest cancer-risk classifier
//!
//! Trains a bootstrap-aggregated decision-tree ensemble on tabular patient
//! records (eight clinical and lifestyle features, binary diagnosis), reports
//! held-out metrics, persists the model, and serves predictions from the
//! console or over HTTP.

pub mod api;
pub mod core;
pub mod data;
pub mod evaluation;
pub mod forest;
pub mod interactive;
pub mod persistence;
pub mod plots;
pub mod predict;
pub mod server;
pub mod tree;
pub mod utils;

// Re-export main types for convenience
pub use crate::api::{ModelInfo, RandomForest, TrainedModel};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{OncoError, Result};
pub use crate::data::{train_test_split, Partition, TabularDataset};
pub use crate::evaluation::{ConfusionMatrix, EvaluationReport};
pub use crate::forest::{ForestConfig, MaxFeatures, TrainedForest};
pub use crate::predict::ModelSlot;
pub use crate::utils::FeatureStats;

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
