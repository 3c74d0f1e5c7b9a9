//! `daybook` — journal server binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (structured JSON logs).
//! 3. Open the SQLite store, creating the database file on first run.
//! 4. Build the Axum router and start the HTTP server.

mod config;
mod server;
mod session;
mod store;
mod telemetry;

use anyhow::Result;
use tracing::info;

use config::Config;
use server::state::AppState;
use store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        http_port = cfg.http_port,
        "daybook starting"
    );

    // -----------------------------------------------------------------------
    // 3. Store
    // -----------------------------------------------------------------------
    let store = Store::open(&cfg.database_path)?;
    info!(path = %cfg.database_path, "database opened");

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(store, &cfg);
    let router = server::router::build(state, &cfg.static_dir);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.http_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
