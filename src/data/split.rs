//! Seeded train/test partitioning
//!
//! Rows are shuffled uniformly; classes are not stratified, so the class
//! balance of the two sides can drift from the full dataset's on small inputs.

use crate::core::{Dataset, OncoError, Result};
use crate::data::TabularDataset;
use log::info;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Disjoint train/test subsets of one dataset
#[derive(Debug, Clone)]
pub struct Partition {
    pub train: TabularDataset,
    pub test: TabularDataset,
    /// Row indices of the training side in the source dataset
    pub train_indices: Vec<usize>,
    /// Row indices of the test side in the source dataset
    pub test_indices: Vec<usize>,
}

/// Hold out `test_ratio` of the rows for testing.
///
/// The test side gets `ceil(test_ratio * n)` rows. The same seed and ratio
/// always produce the same partition.
pub fn train_test_split(dataset: &TabularDataset, test_ratio: f64, seed: u64) -> Result<Partition> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(OncoError::InvalidRatio(test_ratio));
    }

    let n = dataset.len();
    // Guard against products like 0.7 * 10 = 7.000000000000001
    let n_test = (test_ratio * n as f64 - 1e-9).ceil().max(0.0) as usize;
    if n_test == 0 || n_test >= n {
        return Err(OncoError::InsufficientData(format!(
            "Cannot hold out {test_ratio} of {n} rows with both sides non-empty"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_indices = indices.split_off(n_test);
    let test_indices = indices;

    info!(
        "Split {} rows into {} train / {} test (seed {})",
        n,
        train_indices.len(),
        test_indices.len(),
        seed
    );

    Ok(Partition {
        train: dataset.subset(&train_indices),
        test: dataset.subset(&test_indices),
        train_indices,
        test_indices,
    })
}
