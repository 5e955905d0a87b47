use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use vecfs::config::Config;
use vecfs::dispatcher::{EmbedderFactory, ToolDispatcher};
use vecfs::store::EntryStore;
use vecfs::transport::stdio::StdioTransport;
use vecfs::transport::Transport;

#[derive(Debug, Parser)]
#[command(name = "vecfsd")]
#[command(version)]
#[command(about = "Local-first sparse-vector memory store for AI agents")]
struct Cli {
    /// Path to a YAML config file. Defaults to ~/.vecfs/config.yaml.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the log file path (also settable via VECFS_FILE).
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::path);
    let mut config = Config::load_from_path(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    if let Some(file) = cli.file {
        config.storage.file = file;
    }

    tracing::info!(file = %config.storage.file.display(), "starting vecfsd");

    let store = Arc::new(EntryStore::new(config.storage.file.clone()));

    let embedder_factory = build_embedder_factory(&config.embedder);
    let dispatcher = Arc::new(ToolDispatcher::new(store, embedder_factory));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    let transport = StdioTransport::new();
    transport
        .serve(dispatcher, shutdown_rx)
        .await
        .context("stdio transport terminated")?;

    Ok(())
}

/// Resolve the configured embedder provider into a factory the dispatcher
/// can lazily call. Falls back to no embedder (with a warning) for any
/// provider name this binary doesn't recognise — `feedback`/`delete` keep
/// working either way.
fn build_embedder_factory(config: &vecfs::config::EmbedderConfig) -> Option<EmbedderFactory> {
    match config.provider.as_str() {
        #[cfg(feature = "embedder-hashing")]
        "hashing" => {
            let threshold = config.threshold;
            Some(Box::new(move || {
                Arc::new(vecfs::embedder::hashing::HashingEmbedder::new(threshold))
                    as Arc<dyn vecfs::embedder::EmbedderPort>
            }) as EmbedderFactory)
        }
        other => {
            tracing::warn!(provider = other, "unknown embedder provider, search/memorize will fail fast");
            None
        }
    }
}
