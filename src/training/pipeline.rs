//! Resolve, split, fit and score

use super::registry::ModelSpec;
use super::split::train_test_split;
use crate::data::DatasetStore;
use crate::error::{PlaygroundError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::info;

/// Dataset trained on when a request names none
pub const DEFAULT_DATASET: &str = "wine";

fn default_dataset() -> String {
    DEFAULT_DATASET.to_string()
}

fn empty_params() -> Value {
    Value::Object(Default::default())
}

/// A training request as received from a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub model_name: String,
    #[serde(default = "empty_params")]
    pub hyperparameters: Value,
    #[serde(default = "default_dataset")]
    pub dataset_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub accuracy: f64,
}

/// Train `identifier` with `params` on `dataset_name` and return held-out accuracy.
///
/// The model spec is checked before the dataset is looked up, so an unknown
/// model never reaches storage.
pub fn train(store: &DatasetStore, identifier: &str, params: &Value, dataset_name: &str) -> Result<f64> {
    let spec = ModelSpec::parse(identifier, params)?;

    let dataset = store.resolve(dataset_name).map_err(|e| match e {
        PlaygroundError::NotFound(name) => PlaygroundError::UnsupportedDataset(name),
        other => other,
    })?;

    let (_, y) = dataset.encoded_target();
    let split = train_test_split(&dataset.features, &y);

    let start = Instant::now();
    let mut model = spec.build();
    model.fit(&split.x_train, &split.y_train).map_err(|e| {
        if e.is_client_error() || matches!(e, PlaygroundError::TrainingFailed(_)) {
            e
        } else {
            PlaygroundError::TrainingFailed(e.to_string())
        }
    })?;
    let accuracy = model.score(&split.x_test, &split.y_test)?;

    info!(
        model = identifier,
        dataset = dataset_name,
        train_rows = split.y_train.len(),
        test_rows = split.y_test.len(),
        accuracy,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "model trained"
    );

    Ok(accuracy)
}

impl TrainingRequest {
    pub fn run(&self, store: &DatasetStore) -> Result<TrainingResult> {
        let accuracy = train(store, &self.model_name, &self.hyperparameters, &self.dataset_name)?;
        Ok(TrainingResult { accuracy })
    }
}
