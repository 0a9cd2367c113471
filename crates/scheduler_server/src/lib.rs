//! HTTP server for the task scheduler.
//!
//! # Responsibility
//! - Load configuration, initialize logging and storage.
//! - Expose the task service over axum and serve the web client.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use anyhow::{anyhow, Context};
use config::ServerConfig;
use log::info;
use scheduler_core::db::open_db;
use scheduler_core::{init_logging, FixedClock, SystemClock};
use state::AppState;
use std::sync::Arc;

/// Runs the server until Ctrl-C.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let log_dir = config
        .resolved_log_dir()
        .context("failed to resolve log directory")?;
    init_logging(config.log_level(), &log_dir.to_string_lossy())
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;

    let conn = open_db(&config.db_file)
        .with_context(|| format!("failed to open database `{}`", config.db_file.display()))?;

    let state = match config.today {
        Some(today) => {
            info!("event=clock_config module=server status=ok mode=fixed today={today}");
            AppState::new(conn, FixedClock(today))
        }
        None => AppState::new(conn, SystemClock),
    };
    let app = api::create_router(Arc::new(state), &config.web_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind `{addr}`"))?;
    info!(
        "event=http_listen module=server status=ok addr={} web_dir={}",
        listener.local_addr()?,
        config.web_dir.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("event=http_shutdown module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("event=http_shutdown module=server status=error error={err}");
    }
}
