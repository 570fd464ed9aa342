//! HTTP request handlers
//!
//! Every handler hands its core call to the blocking pool; dataset
//! generation, CSV parsing and model fitting are all CPU bound.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::data::{PreviewResult, UploadSummary};
use crate::training::{TrainingRequest, TrainingResult};

use super::error::{Result, ServerError};
use super::state::AppState;

/// Run a synchronous core call on the blocking pool
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": "backend is up and running" }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
    }))
}

pub async fn list_datasets(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let store = state.store.clone();
    let datasets = blocking(move || store.list()).await?;
    Ok(Json(json!({ "datasets": datasets })))
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    preview_size: Option<usize>,
}

pub async fn preview_dataset(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    query: std::result::Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<PreviewResult>> {
    let Query(query) = query.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    let size = match query.preview_size {
        Some(size) if size > 0 => size,
        Some(_) => {
            return Err(ServerError::BadRequest(
                "preview_size must be greater than zero".to_string(),
            ))
        }
        None => return Err(ServerError::BadRequest("preview_size is required".to_string())),
    };

    let store = state.store.clone();
    let result = blocking(move || store.preview(&name, size)).await?;
    Ok(Json(result))
}

pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadSummary>> {
    let mut name: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("name") => {
                name = Some(field.text().await.map_err(|e| ServerError::BadRequest(e.to_string()))?);
            }
            Some("dataset") => {
                let file_name = field.file_name().unwrap_or("dataset.csv").to_string();
                let bytes = field.bytes().await.map_err(|e| ServerError::BadRequest(e.to_string()))?;
                info!(file = %file_name, bytes = bytes.len(), "Received dataset file");
                data = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ServerError::BadRequest("Missing 'name' field".to_string()))?;
    let data = data.ok_or_else(|| ServerError::BadRequest("Missing 'dataset' file".to_string()))?;

    let store = state.store.clone();
    let summary = blocking(move || store.upload(name.trim(), &data)).await?;
    Ok(Json(summary))
}

pub async fn train(
    State(state): State<Arc<AppState>>,
    request: std::result::Result<Json<TrainingRequest>, JsonRejection>,
) -> Result<Json<TrainingResult>> {
    let Json(request) = request.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let store = state.store.clone();
    let result = blocking(move || request.run(&store)).await?;
    Ok(Json(result))
}
