//! Classifier Playground CLI Module
//!
//! Command-line access to the dataset store and training pipeline, plus the
//! `serve` entry point for the HTTP API.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::DatasetStore;
use crate::server::{run_server, ServerConfig};
use crate::training::{train, DEFAULT_DATASET};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn kv(key: &str, val: &str) {
    println!("  {:<12} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "classifier-playground")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Register classification datasets and train classifiers on them")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory holding uploaded datasets (overrides DATASET_DIR)
    #[arg(long, global = true)]
    pub dataset_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List built-in and uploaded datasets
    List,

    /// Show a reproducible sample of a dataset
    Preview {
        /// Dataset name
        #[arg(short, long)]
        name: String,

        /// Number of rows to sample
        #[arg(short, long, default_value = "5")]
        size: usize,
    },

    /// Validate and store a CSV file as a dataset
    Upload {
        /// CSV file with a `target` column
        #[arg(short, long)]
        file: PathBuf,

        /// Name to register the dataset under
        #[arg(short, long)]
        name: String,
    },

    /// Train a model and report held-out accuracy
    Train {
        /// Model identifier (logistic_regression, svm, knn, decision_tree)
        #[arg(short, long)]
        model: String,

        /// Hyperparameters as a JSON object
        #[arg(short, long, default_value = "{}")]
        params: String,

        /// Dataset name
        #[arg(short, long, default_value = DEFAULT_DATASET)]
        dataset: String,
    },

    /// Start the HTTP API server
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
    },
}

/// Configuration with CLI overrides applied on top of the environment
pub fn resolve_config(dataset_dir: Option<&PathBuf>) -> ServerConfig {
    let mut config = ServerConfig::default();
    if let Some(dir) = dataset_dir {
        config.dataset_dir = dir.display().to_string();
    }
    config
}

fn open_store(config: &ServerConfig) -> DatasetStore {
    DatasetStore::filesystem(&config.dataset_dir)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_list(config: &ServerConfig) -> anyhow::Result<()> {
    section("Datasets");
    let store = open_store(config);
    for name in store.list()? {
        println!("  {} {}", accent("•"), name);
    }
    println!();
    Ok(())
}

pub fn cmd_preview(config: &ServerConfig, name: &str, size: usize) -> anyhow::Result<()> {
    section("Preview");
    let store = open_store(config);
    let result = store.preview(name, size)?;

    kv("Dataset", name);
    kv("Samples", &result.n_samples.to_string());
    kv("Features", &result.n_features.to_string());
    kv("Classes", &result.n_classes.to_string());
    println!();

    for row in &result.samples {
        println!("  {}", dim(&serde_json::to_string(row)?));
    }
    println!();
    Ok(())
}

pub fn cmd_upload(config: &ServerConfig, file: &Path, name: &str) -> anyhow::Result<()> {
    section("Upload");
    let bytes = std::fs::read(file)?;

    step_run(&format!("Validating {}", file.display()));
    let store = open_store(config);
    let summary = store.upload(name, &bytes)?;
    step_done(&format!("{} rows × {} features", summary.rows, summary.features));

    println!("  {} {}", ok("✓"), summary.message);
    println!();
    Ok(())
}

pub fn cmd_train(config: &ServerConfig, model: &str, params: &str, dataset: &str) -> anyhow::Result<()> {
    section("Train");
    let params: serde_json::Value = serde_json::from_str(params)?;
    let store = open_store(config);

    step_run(&format!("Training {} on {}", model.cyan(), dataset));
    let start = Instant::now();
    let accuracy = train(&store, model, &params, dataset)?;
    step_done(&format!("{:?}", start.elapsed()));

    println!();
    kv("Accuracy", &format!("{:.4}", accuracy));
    println!();
    Ok(())
}

pub async fn cmd_serve(mut config: ServerConfig, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    println!();
    println!("  {}", "Classifier Playground".white().bold());
    println!("  {}", dim(&format!("v{}", env!("CARGO_PKG_VERSION"))));
    println!();
    kv("API", &format!("http://{}:{}", config.host, config.port));
    kv("Health", &format!("http://{}:{}/health", config.host, config.port));
    kv("Datasets", &config.dataset_dir);
    println!();
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    run_server(config).await
}
