//! Classifier Playground - Main Entry Point
//!
//! Runs one CLI command, or the HTTP server when no command is given.

use clap::Parser;
use classifier_playground::cli::{
    cmd_list, cmd_preview, cmd_serve, cmd_train, cmd_upload, resolve_config, Cli, Commands,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classifier_playground=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.dataset_dir.as_ref());

    match cli.command {
        Some(Commands::List) => cmd_list(&config)?,
        Some(Commands::Preview { name, size }) => cmd_preview(&config, &name, size)?,
        Some(Commands::Upload { file, name }) => cmd_upload(&config, &file, &name)?,
        Some(Commands::Train { model, params, dataset }) => {
            cmd_train(&config, &model, &params, &dataset)?
        }
        Some(Commands::Serve { port, host }) => cmd_serve(config, host, port).await?,
        None => cmd_serve(config, None, None).await?,
    }

    Ok(())
}
