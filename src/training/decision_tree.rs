//! Decision tree classifier

use super::models::{check_training_data, check_width, class_count, not_fitted, Classifier};
use crate::error::Result;
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the predicted class index
    Leaf { class: usize, n_samples: usize },
    /// Internal node: rows with `x[feature_idx] <= threshold` go left
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

/// Split quality measure
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    #[default]
    Gini,
    Entropy,
    /// Same impurity as `Entropy`
    LogLoss,
}

impl Criterion {
    fn impurity(self, counts: &[usize], total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let n = total as f64;
        match self {
            Criterion::Gini => {
                1.0 - counts
                    .iter()
                    .map(|&c| (c as f64 / n).powi(2))
                    .sum::<f64>()
            }
            Criterion::Entropy | Criterion::LogLoss => -counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.log2()
                })
                .sum::<f64>(),
        }
    }
}

/// CART classification tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Option<TreeNode>,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub criterion: Criterion,
    n_features: usize,
    n_classes: usize,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Best split found for one feature: (feature, threshold, gain)
type SplitCandidate = (usize, f64, f64);

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            min_samples_split: 2,
            criterion: Criterion::Gini,
            n_features: 0,
            n_classes: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_criterion(mut self, criterion: Criterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Depth of the fitted tree (a lone leaf has depth 0)
    pub fn depth(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    fn class_counts(&self, y: &Array1<f64>, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i] as usize] += 1;
        }
        counts
    }

    fn build_tree(&self, x: &Array2<f64>, y: &Array1<f64>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(y, indices);
        let leaf = || TreeNode::Leaf {
            class: majority(&counts),
            n_samples,
        };

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if n_samples < self.min_samples_split || self.max_depth.is_some_and(|d| depth >= d) || is_pure {
            return leaf();
        }

        let Some((feature_idx, threshold, _)) = self.find_best_split(x, y, indices, &counts) else {
            return leaf();
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, feature_idx]] <= threshold);

        TreeNode::Split {
            feature_idx,
            threshold,
            left: Box::new(self.build_tree(x, y, &left_indices, depth + 1)),
            right: Box::new(self.build_tree(x, y, &right_indices, depth + 1)),
            n_samples,
        }
    }

    /// Scan every feature in parallel; ties on gain go to the lowest feature index.
    fn find_best_split(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_counts: &[usize],
    ) -> Option<SplitCandidate> {
        let parent_impurity = self.criterion.impurity(parent_counts, indices.len());

        let per_feature: Vec<Option<SplitCandidate>> = (0..x.ncols())
            .into_par_iter()
            .map(|feature_idx| {
                self.best_split_for_feature(x, y, indices, parent_counts, parent_impurity, feature_idx)
            })
            .collect();

        per_feature
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, cand| match best {
                Some(b) if b.2 >= cand.2 => Some(b),
                _ => Some(cand),
            })
    }

    /// Sweep sorted values once, moving rows from right to left
    fn best_split_for_feature(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        indices: &[usize],
        parent_counts: &[usize],
        parent_impurity: f64,
        feature_idx: usize,
    ) -> Option<SplitCandidate> {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature_idx]]
                .partial_cmp(&x[[b, feature_idx]])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let n = order.len();
        let mut left = vec![0usize; self.n_classes];
        let mut right = parent_counts.to_vec();
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n - 1 {
            let row = order[pos];
            let class = y[row] as usize;
            left[class] += 1;
            right[class] -= 1;

            let current = x[[row, feature_idx]];
            let next = x[[order[pos + 1], feature_idx]];
            if current == next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            let weighted = (n_left as f64 * self.criterion.impurity(&left, n_left)
                + n_right as f64 * self.criterion.impurity(&right, n_right))
                / n as f64;
            let gain = parent_impurity - weighted;

            if gain > 1e-12 && best.map_or(true, |b| gain > b.2) {
                best = Some((feature_idx, (current + next) / 2.0, gain));
            }
        }

        best
    }

    fn predict_row(node: &TreeNode, row: ArrayView1<f64>) -> usize {
        match node {
            TreeNode::Leaf { class, .. } => *class,
            TreeNode::Split {
                feature_idx,
                threshold,
                left,
                right,
                ..
            } => {
                if row[*feature_idx] <= *threshold {
                    Self::predict_row(left, row)
                } else {
                    Self::predict_row(right, row)
                }
            }
        }
    }
}

/// Most frequent class, lowest index on ties
fn majority(counts: &[usize]) -> usize {
    let mut best = 0;
    for (class, &c) in counts.iter().enumerate() {
        if c > counts[best] {
            best = class;
        }
    }
    best
}

impl Classifier for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(self.name(), x, y)?;

        self.n_features = x.ncols();
        self.n_classes = class_count(y);

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root = self.build_tree(x, y, &indices, 0);
        self.root = Some(root);

        tracing::debug!(depth = self.depth(), "decision tree fitted");
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_width(self.n_features, x)?;

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::predict_row(root, row) as f64)
            .collect())
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}
