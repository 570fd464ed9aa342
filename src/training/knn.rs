//! K-Nearest Neighbors classifier

use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::models::{check_training_data, check_width, class_count, not_fitted, Classifier};
use crate::error::{PlaygroundError, Result};

/// Weighting scheme for neighbor votes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    /// All neighbors have equal weight
    #[default]
    Uniform,
    /// Closer neighbors have more weight (inverse distance)
    Distance,
}

/// K-Nearest Neighbors classifier with Euclidean distance
#[derive(Debug, Clone)]
pub struct KNNClassifier {
    n_neighbors: usize,
    weights: WeightScheme,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
    n_classes: usize,
}

impl KNNClassifier {
    pub fn new(n_neighbors: usize, weights: WeightScheme) -> Self {
        Self {
            n_neighbors,
            weights,
            x_train: None,
            y_train: None,
            n_classes: 0,
        }
    }
}

impl Classifier for KNNClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(self.name(), x, y)?;
        if self.n_neighbors == 0 || self.n_neighbors > x.nrows() {
            return Err(PlaygroundError::invalid_params(
                self.name(),
                format!(
                    "n_neighbors = {} but the training partition has {} rows",
                    self.n_neighbors,
                    x.nrows()
                ),
            ));
        }

        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        self.n_classes = class_count(y);
        Ok(())
    }

    /// Predict class indices (parallelized over query rows)
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        let y_train = self.y_train.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_width(x_train.ncols(), x)?;

        let k = self.n_neighbors;
        let weights = self.weights;
        let n_classes = self.n_classes;

        let predictions: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let neighbors = find_k_nearest(row, x_train, y_train, k);
                vote_classify(&neighbors, n_classes, weights)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn name(&self) -> &'static str {
        "knn"
    }
}

/// Max-heap entry: (distance, training row index, label).
/// Ties on distance are broken by row index so neighbor sets are stable.
#[derive(PartialEq)]
struct Neighbor(f64, usize, f64);

impl Eq for Neighbor {}
impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .partial_cmp(&other.0)
            .unwrap_or(Ordering::Equal)
            .then(self.1.cmp(&other.1))
    }
}

/// Find k nearest neighbors with a bounded max-heap, O(n log k)
fn find_k_nearest(
    point: ArrayView1<f64>,
    x_train: &Array2<f64>,
    y_train: &Array1<f64>,
    k: usize,
) -> Vec<(f64, f64)> {
    let mut heap = BinaryHeap::with_capacity(k + 1);

    for (i, row) in x_train.rows().into_iter().enumerate() {
        let dist = point
            .iter()
            .zip(row.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum::<f64>()
            .sqrt();
        let candidate = Neighbor(dist, i, y_train[i]);
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(top) = heap.peek() {
            if candidate < *top {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_iter().map(|n| (n.0, n.2)).collect()
}

/// Weighted majority vote. Ties go to the lowest class index.
fn vote_classify(neighbors: &[(f64, f64)], n_classes: usize, weights: WeightScheme) -> f64 {
    let mut votes = vec![0.0; n_classes.max(1)];

    // exact matches dominate distance weighting
    let exact: Vec<&(f64, f64)> = neighbors.iter().filter(|(d, _)| *d == 0.0).collect();
    let use_exact = weights == WeightScheme::Distance && !exact.is_empty();

    for &(dist, label) in neighbors {
        let weight = match weights {
            WeightScheme::Uniform => 1.0,
            WeightScheme::Distance if use_exact => {
                if dist == 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            WeightScheme::Distance => 1.0 / dist,
        };
        if let Some(slot) = votes.get_mut(label as usize) {
            *slot += weight;
        }
    }

    let mut best = 0;
    for (class, &v) in votes.iter().enumerate() {
        if v > votes[best] {
            best = class;
        }
    }
    best as f64
}
