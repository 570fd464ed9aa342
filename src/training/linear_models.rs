//! Linear classification models

use super::models::{check_training_data, check_width, class_count, not_fitted, Classifier};
use super::scaler::StandardScaler;
use crate::error::{PlaygroundError, Result};
use ndarray::{Array1, Array2, Axis};

/// Multinomial logistic regression fitted by full-batch gradient descent.
///
/// `c` is the inverse L2 strength: the penalty is `||W||² / (2 C n)`.
/// Features are standardized internally.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    pub c: f64,
    pub max_iter: usize,
    pub tol: f64,
    pub learning_rate: f64,
    weights: Option<Array2<f64>>,
    intercept: Option<Array1<f64>>,
    scaler: Option<StandardScaler>,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-6,
            learning_rate: 0.5,
            weights: None,
            intercept: None,
            scaler: None,
        }
    }

    /// Set inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Row-wise softmax, shifted by the row max for stability
    fn softmax(mut logits: Array2<f64>) -> Array2<f64> {
        for mut row in logits.rows_mut() {
            let max = row.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        logits
    }

    /// Class probabilities, one column per class index
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (weights, intercept, scaler) = match (&self.weights, &self.intercept, &self.scaler) {
            (Some(w), Some(b), Some(s)) => (w, b, s),
            _ => return Err(not_fitted(self.name())),
        };
        check_width(scaler.n_features(), x)?;

        let xs = scaler.transform(x);
        Ok(Self::softmax(xs.dot(weights) + intercept))
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(self.name(), x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let n_classes = class_count(y).max(2);

        let scaler = StandardScaler::fit(x);
        let xs = scaler.transform(x);

        let mut one_hot = Array2::<f64>::zeros((n_samples, n_classes));
        for (i, &label) in y.iter().enumerate() {
            one_hot[[i, label as usize]] = 1.0;
        }

        let mut weights = Array2::<f64>::zeros((n_features, n_classes));
        let mut intercept = Array1::<f64>::zeros(n_classes);
        let alpha = 1.0 / (self.c * n_samples as f64);
        let lr = self.learning_rate;

        for _iter in 0..self.max_iter {
            let probs = Self::softmax(xs.dot(&weights) + &intercept);
            let errors = probs - &one_hot;

            let dw = xs.t().dot(&errors) / n_samples as f64 + alpha * &weights;
            let db = errors
                .mean_axis(Axis(0))
                .unwrap_or_else(|| Array1::zeros(n_classes));

            let grad_norm = (dw.mapv(|v| v * v).sum() + db.mapv(|v| v * v).sum()).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            intercept = intercept - lr * db;
        }

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(PlaygroundError::TrainingFailed(
                "logistic regression diverged".to_string(),
            ));
        }

        self.weights = Some(weights);
        self.intercept = Some(intercept);
        self.scaler = Some(scaler);
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (class, &p) in row.iter().enumerate() {
                    if p > row[best] {
                        best = class;
                    }
                }
                best as f64
            })
            .collect())
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}
