//! Utility functions for dataset inspection

use crate::core::{Dataset, Label, FEATURES, N_FEATURES};

/// Class balance checks
pub mod validation {
    use super::*;
    use log::{info, warn};

    /// Count positives and negatives; the ratio is positives per negative
    pub fn check_label_balance<D: Dataset>(dataset: &D) -> (usize, usize, f64) {
        let labels = dataset.get_labels();
        let positive_count = labels.iter().filter(|&&l| l == Label::Positive).count();
        let negative_count = labels.len() - positive_count;
        let balance_ratio = if negative_count == 0 {
            f64::INFINITY
        } else {
            positive_count as f64 / negative_count as f64
        };
        (positive_count, negative_count, balance_ratio)
    }

    /// Log the class counts of a named partition, warning if a class is missing
    pub fn log_class_distribution<D: Dataset>(name: &str, dataset: &D) {
        let (positive, negative, _) = check_label_balance(dataset);
        let total = positive + negative;
        if total == 0 {
            warn!("{name}: no samples");
            return;
        }
        info!(
            "{}: {} samples, {} positive ({:.1}%), {} negative",
            name,
            total,
            positive,
            100.0 * positive as f64 / total as f64,
            negative
        );
        if positive == 0 || negative == 0 {
            warn!("{name} contains a single class");
        }
    }
}

/// Statistical utilities for datasets
pub mod stats {
    use super::*;

    /// Calculate per-feature summary statistics in schema order
    pub fn feature_stats<D: Dataset>(dataset: &D) -> Vec<FeatureStats> {
        let n = dataset.len();
        let mut sums = [0.0; N_FEATURES];
        let mut mins = [f64::INFINITY; N_FEATURES];
        let mut maxs = [f64::NEG_INFINITY; N_FEATURES];

        for i in 0..n {
            let sample = dataset.get_sample(i);
            for (j, &v) in sample.features.iter().enumerate() {
                sums[j] += v;
                mins[j] = mins[j].min(v);
                maxs[j] = maxs[j].max(v);
            }
        }

        let means: Vec<f64> = sums
            .iter()
            .map(|&s| if n == 0 { 0.0 } else { s / n as f64 })
            .collect();

        // Calculate sample variance
        let mut squares = [0.0; N_FEATURES];
        for i in 0..n {
            let sample = dataset.get_sample(i);
            for (j, &v) in sample.features.iter().enumerate() {
                squares[j] += (v - means[j]).powi(2);
            }
        }

        FEATURES
            .iter()
            .enumerate()
            .map(|(j, spec)| FeatureStats {
                name: spec.name,
                min: if n == 0 { 0.0 } else { mins[j] },
                max: if n == 0 { 0.0 } else { maxs[j] },
                mean: means[j],
                std_dev: if n > 1 {
                    (squares[j] / (n - 1) as f64).sqrt()
                } else {
                    0.0
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureStats {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}
