use serde::{Deserialize, Serialize};

pub mod defaults;
pub mod parser;
pub mod substitution;
pub mod validator;

pub use defaults::*;
pub use parser::*;
pub use substitution::*;
pub use validator::*;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FxmatchConfig {
    pub service: ServiceConfig,
    #[serde(default)]
    pub server: HttpConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    /// Currency pairs the service accepts orders for
    #[serde(default = "default_instruments")]
    pub instruments: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
}

impl HttpConfig {
    /// Get the full bind address (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_http_port(),
        }
    }
}

/// Order book index sizing and locking
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Maximum tracked orders per match key
    #[serde(default = "default_key_capacity")]
    pub key_capacity: usize,
    /// Maximum orders appended to a side bucket outside a rebuild
    #[serde(default = "default_side_capacity")]
    pub side_capacity: usize,
    /// Maximum orders a side bucket holds after a rebuild
    #[serde(default = "default_rebuild_capacity")]
    pub rebuild_capacity: usize,
    /// Number of lock stripes guarding mutations (rounded up to a power of two)
    #[serde(default = "default_lock_shards")]
    pub lock_shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            key_capacity: default_key_capacity(),
            side_capacity: default_side_capacity(),
            rebuild_capacity: default_rebuild_capacity(),
            lock_shards: default_lock_shards(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// One of: pretty, json, compact
    #[serde(default = "default_log_format")]
    pub log_format: String,
    /// Port for the Prometheus scrape endpoint; omit to disable the exporter
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            metrics_port: None,
        }
    }
}
