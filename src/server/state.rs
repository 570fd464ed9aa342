//! Application state shared by handlers

use crate::data::DatasetStore;

use super::ServerConfig;

/// Server-wide state behind an `Arc`
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub store: DatasetStore,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// State with a filesystem store rooted at `config.dataset_dir`
    pub fn new(config: ServerConfig) -> Self {
        let store = DatasetStore::filesystem(&config.dataset_dir);
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: DatasetStore) -> Self {
        Self {
            config,
            store,
            started_at: chrono::Utc::now(),
        }
    }
}
