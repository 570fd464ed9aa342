//! Uniform access to built-in and uploaded datasets

use super::storage::{is_valid_name, parse_csv, DatasetStorage, FsDatasetStorage, MemoryDatasetStorage};
use super::{preview, validate_upload, BuiltinDataset, Dataset, PreviewResult};
use crate::error::{PlaygroundError, Result};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    pub message: String,
    pub rows: usize,
    pub features: usize,
}

/// Resolves dataset names, built-ins first, then storage.
#[derive(Clone)]
pub struct DatasetStore {
    storage: Arc<dyn DatasetStorage>,
}

impl DatasetStore {
    pub fn new(storage: Arc<dyn DatasetStorage>) -> Self {
        Self { storage }
    }

    /// Store backed by `<dir>/<name>.csv` files
    pub fn filesystem(dir: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FsDatasetStorage::new(dir)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryDatasetStorage::new()))
    }

    /// Look up a dataset by name. Names no upload could carry are not found.
    pub fn resolve(&self, name: &str) -> Result<Dataset> {
        if let Some(builtin) = BuiltinDataset::from_name(name) {
            return builtin.load();
        }
        if !is_valid_name(name) {
            return Err(PlaygroundError::NotFound(name.to_string()));
        }
        let df = self.storage.load(name)?;
        Dataset::from_frame(name, &df)
    }

    /// Built-ins in fixed order, then uploads
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = BuiltinDataset::names().into_iter().map(String::from).collect();
        names.extend(
            self.storage
                .list()?
                .into_iter()
                .filter(|n| BuiltinDataset::from_name(n).is_none()),
        );
        Ok(names)
    }

    /// Write a table as-is, replacing any dataset of the same name
    pub fn persist(&self, name: &str, df: &mut DataFrame) -> Result<()> {
        self.storage.persist(name, df)
    }

    /// Parse, validate and persist an uploaded CSV
    pub fn upload(&self, name: &str, csv: &[u8]) -> Result<UploadSummary> {
        check_name(name)?;
        if BuiltinDataset::from_name(name).is_some() {
            warn!(dataset = name, "upload rejected: name reserved");
            return Err(PlaygroundError::ReservedName(name.to_string()));
        }

        let mut df = parse_csv(csv)?;
        if let Err(e) = validate_upload(&df) {
            warn!(dataset = name, error = %e, "upload rejected");
            return Err(e);
        }

        let replaced = self.storage.contains(name)?;
        self.persist(name, &mut df)?;

        let rows = df.height();
        let features = df.width() - 1;
        info!(dataset = name, rows, features, replaced, "dataset uploaded");

        Ok(UploadSummary {
            message: format!("Dataset '{}' uploaded successfully", name),
            rows,
            features,
        })
    }

    /// Resolve then sample `size` rows
    pub fn preview(&self, name: &str, size: usize) -> Result<PreviewResult> {
        let dataset = self.resolve(name)?;
        let result = preview(&dataset, size)?;
        info!(dataset = name, size, "preview generated");
        Ok(result)
    }
}

impl std::fmt::Debug for DatasetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetStore").finish_non_exhaustive()
    }
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(PlaygroundError::InvalidName(name.to_string()))
    }
}
