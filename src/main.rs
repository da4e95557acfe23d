mod auth;
mod cli;
mod config;
mod error;
mod jenkins;
mod metrics;
mod output;
mod poller;
mod server;
mod sink;
mod snapshot;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.exporter.log_level.as_str()),
    )
    .init();

    output::print_banner();
    info!("Starting jenkins-exporter");

    if let Err(e) = cli.execute(&config).await {
        error!("{e:#}");
        return Err(e);
    }

    Ok(())
}
