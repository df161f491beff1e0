//! Binary decision tree used as the forest's base learner
//!
//! Trees are grown on a list of row indices (a bootstrap draw may repeat
//! rows) and split on Gini impurity. At every node a fresh random subset of
//! features is examined; constant features do not count toward that subset,
//! so a node only becomes a leaf early when every feature is constant on it.

use crate::core::{Label, OncoError, Result, N_FEATURES};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf holding the training class counts `[negative, positive]`
    Leaf { counts: [usize; 2] },
    /// Internal node: rows with `features[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// Maximum depth (root is depth 0); unbounded when `None`
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split
    pub max_features: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: N_FEATURES,
        }
    }
}

/// A fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    /// Impurity decrease per feature, normalized to sum to 1 (all zero for a stump leaf)
    importances: [f64; N_FEATURES],
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

struct Grower<'a> {
    x: &'a [[f64; N_FEATURES]],
    y: &'a [Label],
    params: &'a TreeParams,
    rng: &'a mut ChaCha8Rng,
    importances: [f64; N_FEATURES],
}

impl DecisionTree {
    /// Grow a tree on the rows of `x`/`y` listed in `rows`
    pub fn fit(
        x: &[[f64; N_FEATURES]],
        y: &[Label],
        rows: Vec<usize>,
        params: &TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let mut grower = Grower {
            x,
            y,
            params,
            rng,
            importances: [0.0; N_FEATURES],
        };
        let root = grower.grow(rows, 0);

        let mut importances = grower.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }

        Self { root, importances }
    }

    /// Class counts of the leaf a feature vector lands in
    pub fn leaf_counts(&self, features: &[f64; N_FEATURES]) -> [usize; 2] {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { counts } => return *counts,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// This tree's vote: the leaf's majority class, negative on ties
    pub fn predict(&self, features: &[f64; N_FEATURES]) -> Label {
        let counts = self.leaf_counts(features);
        if counts[1] > counts[0] {
            Label::Positive
        } else {
            Label::Negative
        }
    }

    /// Normalized impurity-decrease importances in schema order
    pub fn feature_importances(&self) -> &[f64; N_FEATURES] {
        &self.importances
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    /// Number of levels (a single leaf has depth 1)
    pub fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    pub fn n_leaves(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }

    /// Check that every split refers to a schema feature with a finite threshold.
    ///
    /// Decoded trees are otherwise trusted by [`DecisionTree::leaf_counts`],
    /// which indexes the feature vector directly.
    pub fn validate(&self) -> Result<()> {
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= N_FEATURES {
                    return Err(OncoError::CorruptArtifact(format!(
                        "split on feature {feature}, but samples have {N_FEATURES}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(OncoError::CorruptArtifact(format!(
                        "split on feature {feature} has threshold {threshold}"
                    )));
                }
                stack.push(left);
                stack.push(right);
            }
        }
        Ok(())
    }
}

impl Grower<'_> {
    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> TreeNode {
        let counts = class_counts(self.y, &rows);
        let n = rows.len();

        let stop = n < self.params.min_samples_split
            || counts[0] == 0
            || counts[1] == 0
            || self.params.max_depth.map_or(false, |d| depth >= d);
        if stop {
            return TreeNode::Leaf { counts };
        }

        let Some(best) = self.best_split(&rows, &counts) else {
            return TreeNode::Leaf { counts };
        };

        self.importances[best.feature] += n as f64 * best.gain;

        let x = self.x;
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&i| x[i][best.feature] <= best.threshold);

        let left = Box::new(self.grow(left_rows, depth + 1));
        let right = Box::new(self.grow(right_rows, depth + 1));

        TreeNode::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        }
    }

    fn best_split(&mut self, rows: &[usize], parent: &[usize; 2]) -> Option<Candidate> {
        let x = self.x;
        let y = self.y;
        let n = rows.len();
        let parent_gini = gini(parent);
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut features: Vec<usize> = (0..N_FEATURES).collect();
        features.shuffle(&mut *self.rng);

        let mut best: Option<Candidate> = None;
        let mut examined = 0usize;
        let mut sorted = rows.to_vec();

        for feature in features {
            if examined >= self.params.max_features {
                break;
            }

            sorted.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));
            if x[sorted[0]][feature] == x[sorted[n - 1]][feature] {
                continue;
            }
            examined += 1;

            let mut left = [0usize; 2];
            for pos in 0..n - 1 {
                left[y[sorted[pos]].index()] += 1;

                let here = x[sorted[pos]][feature];
                let next = x[sorted[pos + 1]][feature];
                if here == next {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right = [parent[0] - left[0], parent[1] - left[1]];
                let weighted =
                    (n_left as f64 * gini(&left) + n_right as f64 * gini(&right)) / n as f64;
                let gain = parent_gini - weighted;

                if best.map_or(true, |b| gain > b.gain) {
                    let mut threshold = here / 2.0 + next / 2.0;
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(Candidate {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }
}

fn class_counts(y: &[Label], rows: &[usize]) -> [usize; 2] {
    let mut counts = [0usize; 2];
    for &i in rows {
        counts[y[i].index()] += 1;
    }
    counts
}

fn gini(counts: &[usize; 2]) -> f64 {
    let total = (counts[0] + counts[1]) as f64;
    if total == 0.0 {
        return 0.0;
    }
    let p0 = counts[0] as f64 / total;
    let p1 = counts[1] as f64 / total;
    1.0 - p0 * p0 - p1 * p1
}
