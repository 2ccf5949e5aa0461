// Credit Limits - Web Server
// REST API with Axum over the in-memory mock store

use anyhow::{Context, Result};
use clap::Parser;
use credit_limits::server::{router, ServerState};
use credit_limits::{init_logging, AppConfig, AppState, MockApi};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "credit-server", about = "Credit limit back-office REST API", version)]
struct Args {
    /// Address to bind (overrides CREDIT_LIMITS_ADDR)
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// CSV file with applications (overrides CREDIT_LIMITS_SEED)
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging("info");
    let args = Args::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(addr) = args.addr {
        config.bind_addr = addr;
    }
    if let Some(seed) = args.seed {
        config.seed_path = Some(seed);
    }

    let api = MockApi::new(config.seed_applications()?)?;
    let mut app = AppState::new(api);
    app.load_applications();
    if let Some(error) = app.error() {
        anyhow::bail!("Failed to load applications: {}", error);
    }
    tracing::info!(count = app.total_count(), "mock store ready");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    tracing::info!("server running on http://{}", config.bind_addr);
    tracing::info!("API: http://{}/api/applications", config.bind_addr);

    axum::serve(listener, router(ServerState::new(app)))
        .await
        .context("Server terminated")?;

    Ok(())
}
