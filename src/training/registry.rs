//! Model identifiers and their hyperparameter schemas
//!
//! Every supported model is a variant of [`ModelSpec`] carrying its own
//! parameter struct. Payloads are checked against that struct (unknown or
//! mistyped fields are refused) and then range-checked, all before any
//! classifier is built.

use super::decision_tree::{Criterion, DecisionTree};
use super::knn::{KNNClassifier, WeightScheme};
use super::linear_models::LogisticRegression;
use super::models::Classifier;
use super::svm::{KernelType, SVMClassifier};
use crate::error::{PlaygroundError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported model identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    LogisticRegression,
    Svm,
    Knn,
    DecisionTree,
}

impl ModelKind {
    pub const ALL: [ModelKind; 4] = [
        ModelKind::LogisticRegression,
        ModelKind::Svm,
        ModelKind::Knn,
        ModelKind::DecisionTree,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::Svm => "svm",
            ModelKind::Knn => "knn",
            ModelKind::DecisionTree => "decision_tree",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = PlaygroundError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| PlaygroundError::UnsupportedModel(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogisticRegressionParams {
    #[serde(rename = "C")]
    pub c: f64,
    pub max_iter: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SvmParams {
    #[serde(rename = "C")]
    pub c: f64,
    pub kernel: KernelType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnnParams {
    pub n_neighbors: usize,
    #[serde(default)]
    pub weights: WeightScheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionTreeParams {
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub criterion: Criterion,
}

/// A model identifier with validated hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSpec {
    LogisticRegression(LogisticRegressionParams),
    Svm(SvmParams),
    Knn(KnnParams),
    DecisionTree(DecisionTreeParams),
}

fn decode<T: DeserializeOwned>(kind: ModelKind, params: &Value) -> Result<T> {
    T::deserialize(params).map_err(|e| PlaygroundError::invalid_params(kind.as_str(), e.to_string()))
}

fn require(kind: ModelKind, ok: bool, detail: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(PlaygroundError::invalid_params(kind.as_str(), detail))
    }
}

impl ModelSpec {
    /// Map an identifier and a JSON payload to a validated spec.
    pub fn parse(identifier: &str, params: &Value) -> Result<Self> {
        let kind: ModelKind = identifier.parse()?;

        let spec = match kind {
            ModelKind::LogisticRegression => {
                let p: LogisticRegressionParams = decode(kind, params)?;
                require(kind, p.c.is_finite() && p.c > 0.0, "C must be a positive number")?;
                require(kind, p.max_iter > 0, "max_iter must be positive")?;
                ModelSpec::LogisticRegression(p)
            }
            ModelKind::Svm => {
                let p: SvmParams = decode(kind, params)?;
                require(kind, p.c.is_finite() && p.c > 0.0, "C must be a positive number")?;
                ModelSpec::Svm(p)
            }
            ModelKind::Knn => {
                let p: KnnParams = decode(kind, params)?;
                require(kind, p.n_neighbors > 0, "n_neighbors must be positive")?;
                ModelSpec::Knn(p)
            }
            ModelKind::DecisionTree => {
                let p: DecisionTreeParams = decode(kind, params)?;
                require(kind, p.max_depth != Some(0), "max_depth must be positive")?;
                ModelSpec::DecisionTree(p)
            }
        };

        Ok(spec)
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            ModelSpec::LogisticRegression(_) => ModelKind::LogisticRegression,
            ModelSpec::Svm(_) => ModelKind::Svm,
            ModelSpec::Knn(_) => ModelKind::Knn,
            ModelSpec::DecisionTree(_) => ModelKind::DecisionTree,
        }
    }

    /// Construct the configured, unfitted classifier
    pub fn build(&self) -> Box<dyn Classifier> {
        match self {
            ModelSpec::LogisticRegression(p) => Box::new(
                LogisticRegression::new()
                    .with_c(p.c)
                    .with_max_iter(p.max_iter),
            ),
            ModelSpec::Svm(p) => Box::new(SVMClassifier::new(p.c, p.kernel)),
            ModelSpec::Knn(p) => Box::new(KNNClassifier::new(p.n_neighbors, p.weights)),
            ModelSpec::DecisionTree(p) => Box::new(
                DecisionTree::new()
                    .with_max_depth(p.max_depth)
                    .with_criterion(p.criterion),
            ),
        }
    }
}
