//! Support Vector Machine classifier
//!
//! Binary machines are trained with simplified SMO (Sequential Minimal
//! Optimization); more than two classes use One-vs-Rest. Inputs are
//! standardized before training.

use super::models::{check_training_data, check_width, class_count, not_fitted, Classifier};
use super::scaler::StandardScaler;
use crate::error::{PlaygroundError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training returns an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

const POLY_DEGREE: i32 = 3;
const TOL: f64 = 1e-3;
const MAX_PASSES: usize = 5;
/// Cap on full passes over the data
const MAX_ITER: usize = 200;
const SEED: u64 = 42;

/// Kernel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KernelType {
    /// K(x, y) = x · y
    Linear,
    /// K(x, y) = (γ x · y)^3
    Poly,
    /// K(x, y) = exp(-γ ||x - y||²)
    #[default]
    Rbf,
    /// K(x, y) = tanh(γ x · y)
    Sigmoid,
}

/// Kernel with its resolved coefficient
#[derive(Debug, Clone, Copy)]
struct Kernel {
    kind: KernelType,
    gamma: f64,
}

impl Kernel {
    fn eval(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self.kind {
            KernelType::Linear => a.dot(&b),
            KernelType::Poly => (self.gamma * a.dot(&b)).powi(POLY_DEGREE),
            KernelType::Rbf => {
                let sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
                (-self.gamma * sq).exp()
            }
            KernelType::Sigmoid => (self.gamma * a.dot(&b)).tanh(),
        }
    }
}

/// A single binary machine: positive class vs the rest
#[derive(Debug, Clone)]
struct BinarySVM {
    support_vectors: Array2<f64>,
    /// alpha_i * y_i per support vector
    coefficients: Array1<f64>,
    bias: f64,
}

impl BinarySVM {
    fn decision(&self, kernel: &Kernel, sample: ArrayView1<f64>) -> f64 {
        self.support_vectors
            .rows()
            .into_iter()
            .zip(self.coefficients.iter())
            .map(|(sv, c)| c * kernel.eval(sample, sv))
            .sum::<f64>()
            + self.bias
    }
}

#[derive(Debug, Clone)]
struct FittedSvm {
    scaler: StandardScaler,
    kernel: Kernel,
    /// One machine when binary (positive = class 1), else one per class
    machines: Vec<BinarySVM>,
}

/// Support Vector Classifier
#[derive(Debug, Clone)]
pub struct SVMClassifier {
    c: f64,
    kernel: KernelType,
    fitted: Option<FittedSvm>,
}

impl SVMClassifier {
    pub fn new(c: f64, kernel: KernelType) -> Self {
        Self {
            c,
            kernel,
            fitted: None,
        }
    }

    /// SMO for labels in {-1, +1}
    fn smo_train(&self, x: &Array2<f64>, kernel_matrix: &Array2<f64>, y: &Array1<f64>) -> BinarySVM {
        let n = x.nrows();
        let c = self.c;
        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(SEED);

        let decision = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            let mut sum = bias;
            for i in 0..n {
                if alphas[i] != 0.0 {
                    sum += alphas[i] * y[i] * kernel_matrix[[i, idx]];
                }
            }
            sum
        };

        let mut passes = 0;
        let mut total_iter = 0;

        while n > 1 && passes < MAX_PASSES && total_iter < MAX_ITER {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = decision(&alphas, bias, i) - y[i];

                // KKT violation
                if !((y[i] * e_i < -TOL && alphas[i] < c) || (y[i] * e_i > TOL && alphas[i] > 0.0)) {
                    continue;
                }

                let j = loop {
                    let j = rng.gen_range(0..n);
                    if j != i {
                        break j;
                    }
                };
                let e_j = decision(&alphas, bias, j) - y[j];

                let alpha_i_old = alphas[i];
                let alpha_j_old = alphas[j];

                let (l, h) = if y[i] != y[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if (l - h).abs() < 1e-10 {
                    continue;
                }

                let eta = 2.0 * kernel_matrix[[i, j]] - kernel_matrix[[i, i]] - kernel_matrix[[j, j]];
                if eta >= 0.0 {
                    continue;
                }

                let alpha_j = (alpha_j_old - y[j] * (e_i - e_j) / eta).clamp(l, h);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue;
                }
                let alpha_i = alpha_i_old + y[i] * y[j] * (alpha_j_old - alpha_j);
                alphas[i] = alpha_i;
                alphas[j] = alpha_j;

                let b1 = bias
                    - e_i
                    - y[i] * (alpha_i - alpha_i_old) * kernel_matrix[[i, i]]
                    - y[j] * (alpha_j - alpha_j_old) * kernel_matrix[[i, j]];
                let b2 = bias
                    - e_j
                    - y[i] * (alpha_i - alpha_i_old) * kernel_matrix[[i, j]]
                    - y[j] * (alpha_j - alpha_j_old) * kernel_matrix[[j, j]];

                bias = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                num_changed += 1;
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        let support: Vec<usize> = (0..n).filter(|&i| alphas[i] > 1e-8).collect();
        let mut support_vectors = Array2::zeros((support.len(), x.ncols()));
        let mut coefficients = Array1::zeros(support.len());
        for (k, &idx) in support.iter().enumerate() {
            support_vectors.row_mut(k).assign(&x.row(idx));
            coefficients[k] = alphas[idx] * y[idx];
        }

        BinarySVM {
            support_vectors,
            coefficients,
            bias,
        }
    }

    /// Kernel matrix, rows computed in parallel
    fn compute_kernel_matrix(kernel: &Kernel, x: &Array2<f64>) -> Result<Array2<f64>> {
        let n = x.nrows();
        let values: Vec<f64> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| (0..n).map(move |j| kernel.eval(x.row(i), x.row(j))))
            .collect();
        Ok(Array2::from_shape_vec((n, n), values)?)
    }
}

/// gamma = 1 / (n_features * Var(X))
fn scale_gamma(x: &Array2<f64>) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 1.0;
    }
    let mean = x.sum() / n;
    let var = x.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    if var > 0.0 {
        1.0 / (x.ncols() as f64 * var)
    } else {
        1.0
    }
}

impl Classifier for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        check_training_data(self.name(), x, y)?;

        let n = x.nrows();
        if n > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(PlaygroundError::TrainingFailed(format!(
                "{} training rows exceed the SVM limit of {}",
                n, MAX_KERNEL_MATRIX_SAMPLES
            )));
        }

        let n_classes = class_count(y);
        let mut present = vec![false; n_classes];
        for &v in y {
            present[v as usize] = true;
        }
        if present.iter().filter(|&&p| p).count() < 2 {
            return Err(PlaygroundError::TrainingFailed(
                "SVM requires at least 2 distinct classes in the training partition".to_string(),
            ));
        }

        let scaler = StandardScaler::fit(x);
        let xs = scaler.transform(x);
        let kernel = Kernel {
            kind: self.kernel,
            gamma: scale_gamma(&xs),
        };
        let kernel_matrix = Self::compute_kernel_matrix(&kernel, &xs)?;

        let positives: Vec<usize> = if n_classes == 2 { vec![1] } else { (0..n_classes).collect() };
        let machines = positives
            .into_iter()
            .map(|class| {
                let y_binary = y.mapv(|v| if v as usize == class { 1.0 } else { -1.0 });
                self.smo_train(&xs, &kernel_matrix, &y_binary)
            })
            .collect();

        self.fitted = Some(FittedSvm {
            scaler,
            kernel,
            machines,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(self.name()))?;
        check_width(fitted.scaler.n_features(), x)?;
        let xs = fitted.scaler.transform(x);

        let predictions: Vec<f64> = (0..xs.nrows())
            .into_par_iter()
            .map(|i| {
                let sample = xs.row(i);
                if let [machine] = fitted.machines.as_slice() {
                    return if machine.decision(&fitted.kernel, sample) >= 0.0 { 1.0 } else { 0.0 };
                }
                let mut best_class = 0;
                let mut best_score = f64::NEG_INFINITY;
                for (class, machine) in fitted.machines.iter().enumerate() {
                    let score = machine.decision(&fitted.kernel, sample);
                    if score > best_score {
                        best_score = score;
                        best_class = class;
                    }
                }
                best_class as f64
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    fn name(&self) -> &'static str {
        "svm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn blobs() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [1.0, 1.0],
            [1.5, 1.2],
            [1.2, 1.8],
            [0.8, 1.4],
            [6.0, 6.0],
            [6.5, 5.8],
            [5.7, 6.3],
            [6.2, 6.6],
            [1.0, 6.0],
            [1.3, 6.4],
            [0.7, 5.8],
            [1.1, 6.6]
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0];
        (x, y)
    }

    #[test]
    fn test_binary_kernels_separate_blobs() {
        let (x, y) = blobs();
        let x = x.slice(ndarray::s![0..8, ..]).to_owned();
        let y = y.slice(ndarray::s![0..8]).to_owned();

        for kernel in [KernelType::Linear, KernelType::Rbf] {
            let mut svm = SVMClassifier::new(1.0, kernel);
            svm.fit(&x, &y).unwrap();
            assert_eq!(svm.score(&x, &y).unwrap(), 1.0, "kernel {:?}", kernel);
        }
    }

    #[test]
    fn test_poly_and_sigmoid_predict() {
        let (x, y) = blobs();
        for kernel in [KernelType::Poly, KernelType::Sigmoid] {
            let mut svm = SVMClassifier::new(0.5, kernel);
            svm.fit(&x, &y).unwrap();
            let predictions = svm.predict(&x).unwrap();
            assert_eq!(predictions.len(), 12);
            assert!(predictions.iter().all(|&p| p == 0.0 || p == 1.0 || p == 2.0));
        }
    }

    #[test]
    fn test_multiclass_ovr() {
        let (x, y) = blobs();
        let mut svm = SVMClassifier::new(1.0, KernelType::Rbf);
        svm.fit(&x, &y).unwrap();
        assert!(svm.score(&x, &y).unwrap() > 0.9);
    }

    #[test]
    fn test_single_class_fails() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];
        let mut svm = SVMClassifier::new(1.0, KernelType::Linear);
        assert!(matches!(svm.fit(&x, &y), Err(PlaygroundError::TrainingFailed(_))));
    }

    #[test]
    fn test_kernel_names() {
        let k: KernelType = serde_json::from_str("\"poly\"").unwrap();
        assert_eq!(k, KernelType::Poly);
        assert!(serde_json::from_str::<KernelType>("\"invalid_kernel\"").is_err());
    }
}
