// ABOUTME: Server binary for the mentorship HTTP API
// ABOUTME: Loads configuration, initializes logging and storage, and serves until shutdown
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Mentorship Server Binary
//!
//! Starts the HTTP API with JWT authentication, `SQLite` storage, and
//! Prometheus metrics.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mentorship_server::{
    config::environment::{DatabaseUrl, ServerConfig},
    logging,
    metrics::RecordingMetrics,
    resources::ServerResources,
    server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "mentorship-server")]
#[command(about = "Mentorship API - training requests, mentor assignment, and learning plans")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL (e.g. `sqlite:./data/mentorship.db` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database.url = DatabaseUrl::parse_url(url)?;
    }

    logging::init_from_env()?;

    info!("Starting Mentorship API");
    info!("{}", config.summary());

    let metrics = Arc::new(RecordingMetrics::new());
    let resources = match ServerResources::from_config(config, metrics).await {
        Ok(resources) => Arc::new(resources),
        Err(e) => {
            error!("Failed to initialize server resources: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = server::run(resources).await {
        error!("Server error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
