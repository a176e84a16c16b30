//! Server configuration.
//!
//! Configuration is resolved once at startup (optional YAML file, then
//! command-line overrides) and is shared read-only by every connection.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Per-connection resource limits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Seconds a connection may sit idle waiting for the next request.
    pub idle_timeout_secs: u64,
    /// Maximum number of requests served on one connection.
    pub max_requests: usize,
    /// Size of the single read that must hold a whole request.
    pub read_buffer_size: usize,
    /// Value of the `Retry-After` header sent when the pool is saturated.
    pub retry_after_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 30,
            max_requests: 100,
            read_buffer_size: 8192,
            retry_after_secs: 10,
        }
    }
}

impl Limits {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Immutable server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub worker_count: usize,
    /// Root directory that GET requests are served from and uploads land in.
    pub resources_dir: PathBuf,
    pub limits: Limits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 8080,
            worker_count: 10,
            resources_dir: PathBuf::from("resources"),
            limits: Limits::default(),
        }
    }
}

impl ServerConfig {
    /// Loads a configuration from a YAML file. Missing keys take defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The virtual host every request must present in its `Host` header.
    pub fn expected_host(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// Capacity of the worker pool's task queue.
    pub fn queue_capacity(&self) -> usize {
        self.worker_count * 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_host.is_empty() {
            return Err(ConfigError::Invalid("bind_host must not be empty"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("worker_count must be at least 1"));
        }
        if self.limits.max_requests == 0 {
            return Err(ConfigError::Invalid("max_requests must be at least 1"));
        }
        if self.limits.read_buffer_size == 0 {
            return Err(ConfigError::Invalid("read_buffer_size must be at least 1"));
        }
        Ok(())
    }
}

/// Command-line interface.
#[derive(Debug, Parser)]
#[command(name = "warden", version)]
#[command(about = "Concurrent HTTP/1.1 server for static files and JSON uploads")]
pub struct Cli {
    /// Port the server listens on [default: 8080]
    pub port: Option<u16>,

    /// Host address to bind to [default: 127.0.0.1]
    pub host: Option<String>,

    /// Number of workers in the pool [default: 10]
    pub max_threads: Option<usize>,

    /// YAML configuration file; explicit arguments override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory to serve files from and store uploads in
    #[arg(long)]
    pub resources: Option<PathBuf>,
}

impl Cli {
    /// Resolves the final configuration: file (or defaults), then overrides.
    pub fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => ServerConfig::from_yaml_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            cfg.bind_port = port;
        }
        if let Some(host) = self.host {
            cfg.bind_host = host;
        }
        if let Some(workers) = self.max_threads {
            cfg.worker_count = workers;
        }
        if let Some(dir) = self.resources {
            cfg.resources_dir = dir;
        }

        cfg.validate()?;
        Ok(cfg)
    }
}
