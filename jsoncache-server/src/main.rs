use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use jsoncache_server::{JsonCacheServer, ServerConfig};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli = cli::Cli::parse();
    let config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => ServerConfig::default(),
    };

    JsonCacheServer::new(cli.apply(config))
        .serve()
        .await
        .context("server error")
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
