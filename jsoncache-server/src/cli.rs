use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

use jsoncache_server::ServerConfig;

#[derive(Parser, Debug)]
#[command(
    name = "jsoncache-server",
    about = "Embedded JSON document store over HTTP",
    version,
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides the configuration file)
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// BSON data file (overrides the configuration file)
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Flush interval in milliseconds; 0 writes through on every change
    #[arg(long)]
    pub flush_interval_ms: Option<u64>,
}

impl Cli {
    /// Layer command-line overrides on top of `config`.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(ms) = self.flush_interval_ms {
            config.flush_interval_ms = Some(ms);
        }
        config
    }
}
