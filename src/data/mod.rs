//! Dataset module
//!
//! Resolves dataset names to feature/target matrices regardless of origin:
//! - [`builtin`] - bundled reference datasets generated on demand
//! - [`storage`] - persistence of uploaded datasets (filesystem or memory)
//! - [`validator`] - shape/content checks run before an upload is admitted
//! - [`preview`] - deterministic row sampling with class/feature counts
//! - [`store`] - the uniform accessor combining all of the above

pub mod builtin;
mod frame;
pub mod preview;
pub mod storage;
pub mod store;
pub mod validator;

pub use builtin::BuiltinDataset;
pub use preview::{preview, PreviewResult, PREVIEW_SEED};
pub use storage::{DatasetStorage, FsDatasetStorage, MemoryDatasetStorage};
pub use store::{DatasetStore, UploadSummary};
pub use validator::validate_upload;

use crate::error::{PlaygroundError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Name of the target column in uploaded tables
pub const TARGET_COLUMN: &str = "target";

/// A class label.
///
/// Integral numeric targets are kept as integers, everything else as text.
/// Integers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Integer(i64),
    Text(String),
}

impl Label {
    /// Convert a numeric target value
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            Label::Integer(value as i64)
        } else {
            Label::Text(value.to_string())
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Integer(v) => write!(f, "{}", v),
            Label::Text(s) => f.write_str(s),
        }
    }
}

/// A resolved classification dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    pub name: String,
    pub feature_names: Vec<String>,
    /// Row-major feature matrix (samples x features)
    pub features: Array2<f64>,
    pub target: Vec<Label>,
    /// Per feature: values came from an integer column
    pub integer_features: Vec<bool>,
}

impl Dataset {
    /// Build a dataset, checking that the parts agree with each other.
    pub fn new(
        name: impl Into<String>,
        feature_names: Vec<String>,
        features: Array2<f64>,
        target: Vec<Label>,
    ) -> Result<Self> {
        if features.nrows() != target.len() {
            return Err(PlaygroundError::Shape {
                expected: format!("target length = {}", features.nrows()),
                actual: format!("target length = {}", target.len()),
            });
        }
        if features.ncols() != feature_names.len() {
            return Err(PlaygroundError::Shape {
                expected: format!("{} feature names", features.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        if feature_names.is_empty() {
            return Err(PlaygroundError::Data("dataset has no feature columns".to_string()));
        }

        let integer_features = vec![false; feature_names.len()];
        Ok(Self {
            name: name.into(),
            feature_names,
            features,
            target,
            integer_features,
        })
    }

    /// Mark which features hold integers; missing trailing flags are `false`.
    pub fn with_integer_features(mut self, flags: &[bool]) -> Self {
        for (slot, &flag) in self.integer_features.iter_mut().zip(flags) {
            *slot = flag;
        }
        self
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Distinct labels in sorted order
    pub fn classes(&self) -> Vec<Label> {
        self.target
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn n_classes(&self) -> usize {
        self.classes().len()
    }

    /// Encode labels as dense class indices `0..k` following [`Dataset::classes`].
    pub fn encoded_target(&self) -> (Vec<Label>, Array1<f64>) {
        let classes = self.classes();
        let encoded = self
            .target
            .iter()
            .map(|label| {
                // classes is sorted and contains every label
                classes.binary_search(label).unwrap_or(0) as f64
            })
            .collect();
        (classes, encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_label_from_f64() {
        assert_eq!(Label::from_f64(2.0), Label::Integer(2));
        assert_eq!(Label::from_f64(-1.0), Label::Integer(-1));
        assert_eq!(Label::from_f64(0.5), Label::Text("0.5".to_string()));
    }

    #[test]
    fn test_label_ordering() {
        let mut labels = vec![
            Label::Text("b".to_string()),
            Label::Integer(10),
            Label::Text("a".to_string()),
            Label::Integer(2),
        ];
        labels.sort();
        assert_eq!(labels[0], Label::Integer(2));
        assert_eq!(labels[1], Label::Integer(10));
        assert_eq!(labels[2], Label::Text("a".to_string()));
    }

    #[test]
    fn test_dataset_shape_mismatch() {
        let result = Dataset::new(
            "bad",
            vec!["a".to_string()],
            array![[1.0], [2.0]],
            vec![Label::Integer(0)],
        );
        assert!(matches!(result, Err(PlaygroundError::Shape { .. })));
    }

    #[test]
    fn test_encoded_target() {
        let ds = Dataset::new(
            "labels",
            vec!["a".to_string()],
            array![[1.0], [2.0], [3.0]],
            vec![
                Label::Text("yes".to_string()),
                Label::Text("no".to_string()),
                Label::Text("yes".to_string()),
            ],
        )
        .unwrap();

        let (classes, y) = ds.encoded_target();
        assert_eq!(classes, vec![Label::Text("no".to_string()), Label::Text("yes".to_string())]);
        assert_eq!(y.to_vec(), vec![1.0, 0.0, 1.0]);
        assert_eq!(ds.n_classes(), 2);
    }
}
