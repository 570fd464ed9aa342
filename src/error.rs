//! Error types for the classifier playground

use thiserror::Error;

/// Result type alias for playground operations
pub type Result<T> = std::result::Result<T, PlaygroundError>;

/// Reasons an uploaded table is refused by the validator.
///
/// The display strings are part of the public contract: clients match on them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("Dataset must include 'target' column.")]
    MissingTargetColumn,

    #[error("Target must have at least 2 distinct classes.")]
    InsufficientTargetClasses,

    #[error("Dataset must include at least one feature column.")]
    NoFeatureColumns,

    #[error("Feature data contains missing values.")]
    MissingFeatureValues,

    #[error("Target column contains missing values.")]
    MissingTargetValues,

    #[error("Feature column '{0}' must be numeric.")]
    NonNumericFeature(String),
}

/// Main error type for the playground
#[derive(Error, Debug)]
pub enum PlaygroundError {
    #[error("No dataset found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Schema(#[from] SchemaViolation),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Unsupported dataset: {0}")]
    UnsupportedDataset(String),

    #[error("Invalid hyperparameters for {model}: {detail}")]
    InvalidHyperparameters { model: String, detail: String },

    #[error("{0}")]
    Sampling(String),

    #[error("Dataset name '{0}' is reserved by a built-in dataset")]
    ReservedName(String),

    #[error("Invalid dataset name '{0}': use 1-64 letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("Training failed: {0}")]
    TrainingFailed(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PlaygroundError {
    /// Whether the caller is at fault (bad name, payload or table).
    ///
    /// Everything else is an unanticipated failure and is reported to clients
    /// without detail.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PlaygroundError::NotFound(_)
                | PlaygroundError::Schema(_)
                | PlaygroundError::UnsupportedModel(_)
                | PlaygroundError::UnsupportedDataset(_)
                | PlaygroundError::InvalidHyperparameters { .. }
                | PlaygroundError::Sampling(_)
                | PlaygroundError::ReservedName(_)
                | PlaygroundError::InvalidName(_)
        )
    }

    pub(crate) fn invalid_params(model: &str, detail: impl Into<String>) -> Self {
        PlaygroundError::InvalidHyperparameters {
            model: model.to_string(),
            detail: detail.into(),
        }
    }
}

impl From<polars::error::PolarsError> for PlaygroundError {
    fn from(err: polars::error::PolarsError) -> Self {
        PlaygroundError::Data(err.to_string())
    }
}

impl From<serde_json::Error> for PlaygroundError {
    fn from(err: serde_json::Error) -> Self {
        PlaygroundError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PlaygroundError {
    fn from(err: ndarray::ShapeError) -> Self {
        PlaygroundError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
