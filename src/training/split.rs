//! Seeded train/test partitioning

use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Seed for the train/test shuffle
pub const SPLIT_SEED: u64 = 42;
/// Fraction of rows held out for scoring
pub const TEST_FRACTION: f64 = 0.2;

/// Rows selected for each side of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_samples` with `seed` and hold out `ceil(test_fraction * n)` rows.
pub fn split_indices(n_samples: usize, test_fraction: f64, seed: u64) -> SplitIndices {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // absorb float error so exact products like 0.2 * 150 do not round up
    let n_test = ((n_samples as f64) * test_fraction - 1e-9).ceil().max(0.0) as usize;
    let n_test = n_test.min(n_samples);
    let train = indices.split_off(n_test);

    SplitIndices {
        train,
        test: indices,
    }
}

/// Feature/label matrices for both partitions
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Deterministic 80/20 split with [`SPLIT_SEED`]
pub fn train_test_split(x: &Array2<f64>, y: &Array1<f64>) -> TrainTestSplit {
    let SplitIndices { train, test } = split_indices(x.nrows(), TEST_FRACTION, SPLIT_SEED);
    TrainTestSplit {
        x_train: x.select(Axis(0), &train),
        x_test: x.select(Axis(0), &test),
        y_train: y.select(Axis(0), &train),
        y_test: y.select(Axis(0), &test),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        let split = split_indices(150, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(split.test.len(), 30);
        assert_eq!(split.train.len(), 120);

        // ceil(0.2 * 178) = 36
        assert_eq!(split_indices(178, TEST_FRACTION, SPLIT_SEED).test.len(), 36);
        assert_eq!(split_indices(3, TEST_FRACTION, SPLIT_SEED).test.len(), 1);
    }

    #[test]
    fn test_partition_covers_all_rows_once() {
        let split = split_indices(50, TEST_FRACTION, SPLIT_SEED);
        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(split_indices(100, 0.2, 42), split_indices(100, 0.2, 42));
        assert_ne!(split_indices(100, 0.2, 42), split_indices(100, 0.2, 7));
    }

    #[test]
    fn test_matrices_follow_indices() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 10 + j) as f64);
        let y = Array1::from_shape_fn(10, |i| i as f64);
        let split = train_test_split(&x, &y);
        assert_eq!(split.x_test.nrows(), 2);
        for (row, &label) in split.x_test.rows().into_iter().zip(split.y_test.iter()) {
            assert_eq!(row[0], label * 10.0);
        }
    }
}
