//! Reproducible dataset previews

use super::{Dataset, TARGET_COLUMN};
use crate::error::{PlaygroundError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Seed for preview sampling
pub const PREVIEW_SEED: u64 = 42;

/// Counts plus a sample of rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Total rows in the dataset, not in the sample
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    /// Sampled rows keyed by column name, features first then `target`
    pub samples: Vec<Map<String, Value>>,
}

/// Draw `size` distinct rows with a fixed seed.
///
/// Fails when `size` is zero or exceeds the row count.
pub fn preview(dataset: &Dataset, size: usize) -> Result<PreviewResult> {
    let n_rows = dataset.n_samples();
    if size == 0 {
        return Err(PlaygroundError::Sampling(
            "Preview size must be greater than zero".to_string(),
        ));
    }
    if size > n_rows {
        return Err(PlaygroundError::Sampling(format!(
            "Dataset {} does not have {} data entries",
            dataset.name, size
        )));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(PREVIEW_SEED);
    let indices = rand::seq::index::sample(&mut rng, n_rows, size);

    let samples = indices
        .iter()
        .map(|row| {
            let mut record = Map::with_capacity(dataset.n_features() + 1);
            for (j, feature) in dataset.feature_names.iter().enumerate() {
                let value = dataset.features[[row, j]];
                let rendered = if dataset.integer_features[j] {
                    Value::from(value as i64)
                } else {
                    json_number(value)
                };
                record.insert(feature.clone(), rendered);
            }
            record.insert(
                TARGET_COLUMN.to_string(),
                serde_json::to_value(&dataset.target[row]).unwrap_or(Value::Null),
            );
            record
        })
        .collect();

    Ok(PreviewResult {
        n_samples: n_rows,
        n_features: dataset.n_features(),
        n_classes: dataset.n_classes(),
        samples,
    })
}

fn json_number(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
