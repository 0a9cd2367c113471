//! Scheduler server entry point.

use clap::Parser;
use scheduler_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    scheduler_server::run(ServerConfig::parse()).await
}
