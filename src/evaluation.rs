//! Model evaluation: confusion matrix, classification report, ROC/AUC and
//! feature-importance ranking
//!
//! ```rust,no_run
//! use oncoforest::api::RandomForest;
//! use oncoforest::data::{train_test_split, TabularDataset};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = TabularDataset::from_file("The_Cancer_data_1500_V2.csv")?;
//! let partition = train_test_split(&data, 0.2, 42)?;
//! let model = RandomForest::new().train(&partition.train)?;
//!
//! let report = model.evaluate_detailed(&partition.test)?;
//! println!("{}", report.classification);
//! println!("{}", report.confusion);
//! # Ok(())
//! # }
//! ```

use crate::core::{Classifier, Dataset, Label, OncoError, Result, FEATURES};
use log::warn;
use std::fmt;

/// 2x2 confusion matrix; rows are actual classes, columns predicted,
/// both indexed `[negative, positive]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    /// Tally predicted labels against actual ones
    pub fn from_labels(actual: &[Label], predicted: &[Label]) -> Self {
        let mut counts = [[0usize; 2]; 2];
        for (a, p) in actual.iter().zip(predicted) {
            counts[a.index()][p.index()] += 1;
        }
        Self { counts }
    }

    pub fn true_negatives(&self) -> usize {
        self.counts[0][0]
    }

    pub fn false_positives(&self) -> usize {
        self.counts[0][1]
    }

    pub fn false_negatives(&self) -> usize {
        self.counts[1][0]
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Calculate accuracy: (TP + TN) / (TP + TN + FP + FN)
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives() + self.true_negatives(), self.total())
    }

    /// Calculate precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_positives(),
        )
    }

    /// Calculate recall (sensitivity): TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(
            self.true_positives(),
            self.true_positives() + self.false_negatives(),
        )
    }

    /// Calculate F1 score: 2 * (precision * recall) / (precision + recall)
    pub fn f1_score(&self) -> f64 {
        f1(self.precision(), self.recall())
    }

    /// Calculate specificity: TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(
            self.true_negatives(),
            self.true_negatives() + self.false_positives(),
        )
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        writeln!(
            f,
            "[True Neg  False Pos]    [{:<4} {}]",
            self.true_negatives(),
            self.false_positives()
        )?;
        write!(
            f,
            "[False Neg True Pos]     [{:<4} {}]",
            self.false_negatives(),
            self.true_positives()
        )
    }
}

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and support-weighted averages
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    /// Indexed `[negative, positive]`
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let class = |k: usize| {
            let other = 1 - k;
            let tp = cm.counts[k][k];
            let precision = ratio(tp, tp + cm.counts[other][k]);
            let recall = ratio(tp, tp + cm.counts[k][other]);
            ClassMetrics {
                precision,
                recall,
                f1: f1(precision, recall),
                support: cm.counts[k][0] + cm.counts[k][1],
            }
        };
        let classes = [class(0), class(1)];
        let total = cm.total();

        let macro_avg = ClassMetrics {
            precision: (classes[0].precision + classes[1].precision) / 2.0,
            recall: (classes[0].recall + classes[1].recall) / 2.0,
            f1: (classes[0].f1 + classes[1].f1) / 2.0,
            support: total,
        };

        let weighted = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes
                    .iter()
                    .map(|c| pick(c) * c.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|c: &ClassMetrics| c.precision),
            recall: weighted(|c: &ClassMetrics| c.recall),
            f1: weighted(|c: &ClassMetrics| c.f1),
            support: total,
        };

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg,
            weighted_avg,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        write_row(f, "0", &self.classes[0])?;
        write_row(f, "1", &self.classes[1])?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>10} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, "macro avg", &self.macro_avg)?;
        write_row(f, "weighted avg", &self.weighted_avg)
    }
}

/// One operating point of the ROC curve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocPoint {
    pub fpr: f64,
    pub tpr: f64,
    /// Scores `>= threshold` are called positive
    pub threshold: f64,
}

/// ROC curve over every distinct score threshold
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RocCurve {
    pub points: Vec<RocPoint>,
    /// `None` when the labels contain a single class
    pub auc: Option<f64>,
}

impl RocCurve {
    /// Build the curve from positive-class scores and true labels.
    ///
    /// Starts at `(0, 0)` with an infinite threshold and adds one point per
    /// distinct score, highest first. Empty with no AUC if either class is absent.
    pub fn from_scores(scores: &[f64], labels: &[Label]) -> Self {
        let positives = labels.iter().filter(|&&l| l == Label::Positive).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            warn!(
                "ROC curve is undefined: test set has {} positive and {} negative samples",
                positives, negatives
            );
            return Self::default();
        }

        let mut order: Vec<usize> = (0..scores.len().min(labels.len())).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));

        let mut points = vec![RocPoint {
            fpr: 0.0,
            tpr: 0.0,
            threshold: f64::INFINITY,
        }];
        let (mut tp, mut fp) = (0usize, 0usize);
        for (pos, &i) in order.iter().enumerate() {
            match labels[i] {
                Label::Positive => tp += 1,
                Label::Negative => fp += 1,
            }
            let last_of_score = order
                .get(pos + 1)
                .map_or(true, |&next| scores[next] != scores[i]);
            if last_of_score {
                points.push(RocPoint {
                    fpr: fp as f64 / negatives as f64,
                    tpr: tp as f64 / positives as f64,
                    threshold: scores[i],
                });
            }
        }

        let auc = points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[1].tpr + w[0].tpr) / 2.0)
            .sum();

        Self {
            points,
            auc: Some(auc),
        }
    }
}

/// Importance of one named feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// Pair importances with names and sort descending; equal values keep schema order
pub fn rank_importances(names: &[String], importances: &[f64]) -> Vec<FeatureImportance> {
    let mut ranked: Vec<FeatureImportance> = names
        .iter()
        .zip(importances)
        .map(|(name, &importance)| FeatureImportance {
            name: name.clone(),
            importance,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    ranked
}

/// Everything reported about a model on a held-out set
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub confusion: ConfusionMatrix,
    pub classification: ClassificationReport,
    pub roc: RocCurve,
    pub importances: Vec<FeatureImportance>,
}

impl EvaluationReport {
    pub fn accuracy(&self) -> f64 {
        self.confusion.accuracy()
    }
}

/// Score a classifier on a labeled dataset
pub fn evaluate<C: Classifier + ?Sized, D: Dataset>(
    classifier: &C,
    dataset: &D,
) -> Result<EvaluationReport> {
    if dataset.is_empty() {
        return Err(OncoError::EmptyData(
            "Cannot evaluate on an empty test set".to_string(),
        ));
    }

    let samples: Vec<_> = (0..dataset.len()).map(|i| dataset.get_sample(i)).collect();
    let predictions = classifier.predict_batch(&samples);
    let actual = dataset.get_labels();

    let predicted: Vec<Label> = predictions.iter().map(|p| p.label).collect();
    let scores: Vec<f64> = predictions.iter().map(|p| p.probability).collect();

    let confusion = ConfusionMatrix::from_labels(&actual, &predicted);
    let names: Vec<String> = FEATURES.iter().map(|f| f.name.to_string()).collect();

    Ok(EvaluationReport {
        classification: ClassificationReport::from_confusion(&confusion),
        confusion,
        roc: RocCurve::from_scores(&scores, &actual),
        importances: rank_importances(&names, classifier.feature_importances()),
    })
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
    writeln!(
        f,
        "{:>12} {:>10.2} {:>9.2} {:>9.2} {:>9}",
        name, m.precision, m.recall, m.f1, m.support
    )
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * (precision * recall) / (precision + recall)
    }
}
