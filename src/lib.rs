//! Classifier Playground - dataset registry and classifier training service
//!
//! Register tabular classification datasets (built-in or uploaded CSV) and
//! train one of several classifiers against them for a held-out accuracy.
//!
//! # Modules
//!
//! - [`data`] - Dataset resolution, storage, validation and previews
//! - [`training`] - Classifiers, model registry, seeded split and pipeline
//! - [`server`] - HTTP API (axum)
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types

pub mod error;

pub mod data;
pub mod training;

pub mod server;
pub mod cli;

pub use error::{PlaygroundError, Result, SchemaViolation};

/// Prelude for common imports
pub mod prelude {
    pub use crate::data::{BuiltinDataset, Dataset, DatasetStore, Label, PreviewResult, UploadSummary};
    pub use crate::error::{PlaygroundError, Result, SchemaViolation};
    pub use crate::training::{train, Classifier, ModelKind, ModelSpec, TrainingRequest, TrainingResult};
}
