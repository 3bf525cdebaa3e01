// crates/server/src/main.rs
//! Jobwatch server binary.
//!
//! Loads configuration, seeds the in-memory job stores (optionally from a
//! JSON file of status records), then serves the dashboard API.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use jobwatch_core::memory::MemoryBackends;
use jobwatch_core::StatusRecord;
use jobwatch_server::{create_app, init_metrics, AppConfig, AppState};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jobwatch", version, about = "Dashboard API for in-flight background job statuses")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// JSON array of status records to load at startup.
    #[arg(long)]
    seed: Option<PathBuf>,
}

fn load_seed(path: &Path) -> Result<Vec<StatusRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing seed file {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet by default; RUST_LOG opts into more.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    init_metrics();

    let config = AppConfig::load(cli.config.as_deref())?.with_env_overrides();
    let addr = config.socket_addr();

    let backends = MemoryBackends::new();
    if let Some(path) = cli.seed.as_deref() {
        let loaded = backends.seed(load_seed(path)?);
        tracing::info!(records = loaded, path = %path.display(), "Seeded status store");
    }

    let state = AppState::in_memory(&backends, config.dashboard);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    eprintln!("\n  jobwatch v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  \u{2192} http://{addr}/api/statuses\n");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
