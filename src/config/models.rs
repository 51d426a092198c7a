use crate::humanize::ByteSize;
use crate::registry::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listener, document root and handler limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    /// Overridden by the positional port argument on the command line
    #[serde(default)]
    pub port: u16,
    #[serde(default = "default_document_root")]
    pub document_root: PathBuf,
    /// File served for targets ending in `/`
    #[serde(default = "default_index_document")]
    pub index_document: String,
    /// Maximum number of concurrently registered handlers
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Largest request head read from a client
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: ByteSize,
    /// How long a client may take to send its request head
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 0,
            document_root: default_document_root(),
            index_document: default_index_document(),
            capacity: default_capacity(),
            max_request_bytes: default_max_request_bytes(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_document_root() -> PathBuf {
    PathBuf::from("www")
}

fn default_index_document() -> String {
    "index.html".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_max_request_bytes() -> ByteSize {
    ByteSize::kib(2)
}

fn default_read_timeout_ms() -> u64 {
    10_000
}
