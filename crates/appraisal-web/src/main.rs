//! Performance appraisal portal server

use std::path::PathBuf;

use anyhow::Context;
use appraisal_web::{AppState, routes};
use clap::Parser;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "appraisal-server")]
#[command(about = "Serve the performance appraisal portal")]
#[command(version)]
struct Args {
    /// Path to the portal config file
    #[arg(short, long, env = "APPRAISAL_CONFIG", default_value = "appraisal.kdl")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = appraisal_config::load(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let config = appraisal_config::apply_env_overrides(config, |key| std::env::var(key).ok())
        .context("invalid environment override")?;

    info!(api = %config.api.base_url, "using backend API");
    let state = AppState::from_config(&config);

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    let listener = TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("failed to bind {}", config.server.listen))?;
    info!("Starting server on {}", config.server.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
