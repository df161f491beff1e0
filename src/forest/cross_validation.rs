//! K-fold cross-validation over contiguous row groups

use crate::core::{Classifier, Dataset, OncoError, Result, Sample};
use crate::forest::{ForestConfig, ForestTrainer};
use log::info;
use std::ops::Range;

/// Split `n` rows into `folds` contiguous ranges; the first `n % folds`
/// ranges get one extra row.
pub fn fold_ranges(n: usize, folds: usize) -> Result<Vec<Range<usize>>> {
    if folds < 2 {
        return Err(OncoError::InvalidParameter(format!(
            "Cross-validation needs at least 2 folds, got {folds}"
        )));
    }
    if folds > n {
        return Err(OncoError::InsufficientData(format!(
            "Cannot split {n} rows into {folds} folds"
        )));
    }

    let base = n / folds;
    let extra = n % folds;
    let mut ranges = Vec::with_capacity(folds);
    let mut start = 0;
    for k in 0..folds {
        let len = base + usize::from(k < extra);
        ranges.push(start..start + len);
        start += len;
    }
    Ok(ranges)
}

/// Accuracy of a fresh forest on each held-out fold, in fold order
pub fn cross_val_score<D: Dataset>(
    config: &ForestConfig,
    dataset: &D,
    folds: usize,
) -> Result<Vec<f64>> {
    let n = dataset.len();
    let ranges = fold_ranges(n, folds)?;
    let samples: Vec<Sample> = (0..n).map(|i| dataset.get_sample(i)).collect();
    let trainer = ForestTrainer::new(config.clone());

    let mut scores = Vec::with_capacity(folds);
    for (k, held_out) in ranges.into_iter().enumerate() {
        let train: Vec<Sample> = samples[..held_out.start]
            .iter()
            .chain(&samples[held_out.end..])
            .copied()
            .collect();
        let test = &samples[held_out];

        let forest = trainer.train_samples(&train)?;
        let correct = test
            .iter()
            .filter(|s| s.label == Some(forest.predict(s).label))
            .count();
        let score = correct as f64 / test.len() as f64;

        info!("Fold {}/{}: accuracy {:.4}", k + 1, folds, score);
        scores.push(score);
    }

    Ok(scores)
}
