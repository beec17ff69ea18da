use std::{
    net::{Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// BSON data file the store is loaded from and written to.
    pub data_path: PathBuf,
    /// When set, mutations are only marked dirty and flushed on this interval.
    pub flush_interval_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            data_path: PathBuf::from("./data.bson"),
            flush_interval_ms: None,
        }
    }
}

impl ServerConfig {
    /// Reads a TOML configuration file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> ServerResult<Self> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
