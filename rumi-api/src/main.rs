//! rumi-api - HTTP server for the Rumi poetry catalogue
//!
//! Serves Divan and Masnavi poems, books, collections and the verse of the
//! day as JSON for the browser UI.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rumi_api::api::health::BuildInfo;
use rumi_api::{build_router, prepare_store, AppState};
use rumi_common::config::{ConfigOverrides, StorageBackend, TomlConfig};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for rumi-api
#[derive(Parser, Debug)]
#[command(name = "rumi-api")]
#[command(about = "HTTP API for the Rumi poetry catalogue")]
#[command(version)]
struct Args {
    /// Config file (TOML)
    #[arg(short, long, env = "RUMI_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "RUMI_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "RUMI_PORT")]
    port: Option<u16>,

    /// Storage backend: sqlite or memory
    #[arg(long, env = "RUMI_STORAGE")]
    storage: Option<StorageBackend>,

    /// SQLite database file
    #[arg(long, env = "RUMI_DATABASE")]
    database: Option<PathBuf>,

    /// Do not insert sample data into an empty store
    #[arg(long)]
    no_seed: bool,
}

impl Args {
    fn overrides(self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config,
            host: self.host,
            port: self.port,
            backend: self.storage,
            database_path: self.database,
            seed_sample_data: self.no_seed.then_some(false),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Provisional subscriber while the config (and its log level) is resolved
    let config = {
        let _guard = tracing::subscriber::set_default(
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .finish(),
        );
        TomlConfig::resolve(args.overrides())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Rumi API (rumi-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        BuildInfo::CURRENT.git_hash,
        BuildInfo::CURRENT.built_at,
        BuildInfo::CURRENT.profile
    );

    let store = prepare_store(&config.storage)
        .await
        .context("Failed to prepare catalogue store")?;

    let app = build_router(AppState::new(store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("rumi-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
