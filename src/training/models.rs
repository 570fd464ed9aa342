//! Classifier trait and evaluation helpers

use crate::error::{PlaygroundError, Result};
use ndarray::{Array1, Array2};

/// A classifier over dense class indices `0..k` encoded as `f64`
pub trait Classifier: Send {
    /// Fit the model to training data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predict class indices
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Fraction of rows whose prediction matches `y`
    fn score(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(x)?;
        Ok(accuracy(y, &predictions))
    }

    /// Short identifier used in logs
    fn name(&self) -> &'static str;
}

/// Classification accuracy. Empty input scores 0.
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    correct as f64 / y_true.len() as f64
}

pub(crate) fn not_fitted(model: &str) -> PlaygroundError {
    PlaygroundError::TrainingFailed(format!("{} model not fitted", model))
}

/// Number of classes in an encoded target (`max + 1`)
pub(crate) fn class_count(y: &Array1<f64>) -> usize {
    y.iter().fold(0usize, |acc, &v| acc.max(v as usize + 1))
}

/// Check that `x` and `y` describe the same, non-empty set of rows
pub(crate) fn check_training_data(model: &str, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(PlaygroundError::Shape {
            expected: format!("{} labels", x.nrows()),
            actual: format!("{} labels", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(PlaygroundError::TrainingFailed(format!(
            "{}: no training rows",
            model
        )));
    }
    Ok(())
}

/// Check that prediction input matches the fitted width
pub(crate) fn check_width(expected: usize, x: &Array2<f64>) -> Result<()> {
    if x.ncols() != expected {
        return Err(PlaygroundError::Shape {
            expected: format!("{} features", expected),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}
