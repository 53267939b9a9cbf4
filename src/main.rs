mod config;
mod database;
mod entities;
mod http_server;
mod logging;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::{Result, eyre::Context};

use crate::{
    config::Config,
    database::Database,
    http_server::app::{HttpServerConfig, start},
    logging::setup_logging,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "CONCERT_MANAGER_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug")]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "CONCERT_MANAGER_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// The port to run the server on
    #[arg(short, long, default_value = "8081", env = "CONCERT_MANAGER_HTTP_PORT")]
    port: u16,

    /// Database file location (overrides the config file)
    #[arg(short, long, env = "CONCERT_MANAGER_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("Concert manager starting");
    log::debug!("Loading configuration");

    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load concert-manager config")?;

    let database_path = args.database.unwrap_or_else(|| config.database_path());

    log::debug!("Opening database at: {}", database_path.display());
    let database = Database::open(&database_path).await?;

    log::info!("Starting HTTP server on port: {}", args.port);
    start(HttpServerConfig {
        port: args.port,
        database,
    })
    .await?;

    Ok(())
}
