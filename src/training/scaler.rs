//! Z-score feature scaling for gradient- and kernel-based models

use ndarray::{Array1, Array2, Axis};

/// Per-column standardization: (x - mean) / std
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit to the columns of `x`. Constant columns get a unit scale.
    pub fn fit(x: &Array2<f64>) -> Self {
        let mean = x
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(x.ncols()));
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 1e-12 { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn transform(&self, x: &Array2<f64>) -> Array2<f64> {
        (x - &self.mean) / &self.scale
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standardizes_columns() {
        let x = array![[1.0, 10.0], [3.0, 10.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);
        assert_eq!(z, array![[-1.0, 0.0], [1.0, 0.0]]);
        assert_eq!(scaler.n_features(), 2);
    }
}
