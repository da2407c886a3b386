//! Shared configuration for the agent runtime adapter.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! TOML file (`--config-path` or `AGENTCORE_CONFIG_PATH`), then `AGENTCORE_*`
//! environment variables, and finally command-line flags. The runtime reads
//! the listener address, logging settings, per-route rate limits, and
//! streaming buffer sizes from the resulting [`Config`].

mod defaults;
mod listen;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_MAX_TRACKED_CLIENTS, DEFAULT_PORT,
    DEFAULT_STREAM_BUFFER, default_host, default_log_filter, default_log_filter_string,
    default_log_format, default_max_tracked_clients, default_port, default_rate_limit,
    default_stream_buffer,
};
pub use listen::{ListenAddress, ListenAddressParseError};
pub use logging::{LogFormat, LogFormatParseError};

/// Runtime configuration resolved from every configured source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "AGENTCORE")]
pub struct Config {
    /// Interface the HTTP listener binds to.
    #[serde(default = "defaults::default_host")]
    #[ortho_config(default = defaults::default_host())]
    pub host: String,
    /// TCP port the HTTP listener binds to.
    #[serde(default = "defaults::default_port")]
    #[ortho_config(default = defaults::DEFAULT_PORT)]
    pub port: u16,
    /// `tracing` filter directive applied to runtime telemetry.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for runtime telemetry.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Requests per minute allowed on `/invocations` per client; zero disables
    /// throttling.
    #[serde(default = "defaults::default_rate_limit")]
    #[ortho_config(default = 0)]
    pub invocations_limit: u32,
    /// Requests per minute allowed on `/ping` per client; zero disables
    /// throttling.
    #[serde(default = "defaults::default_rate_limit")]
    #[ortho_config(default = 0)]
    pub ping_limit: u32,
    /// Maximum number of `(client, route)` buckets retained before the least
    /// recently used one is evicted.
    #[serde(default = "defaults::default_max_tracked_clients")]
    #[ortho_config(default = defaults::DEFAULT_MAX_TRACKED_CLIENTS)]
    pub max_tracked_clients: usize,
    /// Streamed events buffered between the handler and a slow client.
    #[serde(default = "defaults::default_stream_buffer")]
    #[ortho_config(default = defaults::DEFAULT_STREAM_BUFFER)]
    pub stream_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            invocations_limit: default_rate_limit(),
            ping_limit: default_rate_limit(),
            max_tracked_clients: default_max_tracked_clients(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

impl Config {
    /// Address the HTTP listener binds to.
    #[must_use]
    pub fn listen_address(&self) -> ListenAddress {
        ListenAddress::new(self.host.as_str(), self.port)
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the configured log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Requests per minute allowed on `/invocations`.
    #[must_use]
    pub fn invocations_limit(&self) -> u32 {
        self.invocations_limit
    }

    /// Requests per minute allowed on `/ping`.
    #[must_use]
    pub fn ping_limit(&self) -> u32 {
        self.ping_limit
    }

    /// Upper bound on tracked rate-limit buckets.
    #[must_use]
    pub fn max_tracked_clients(&self) -> usize {
        self.max_tracked_clients
    }

    /// Capacity of the channel feeding streamed responses.
    #[must_use]
    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer
    }

    /// Rejects values that parse cleanly but cannot drive the runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.max_tracked_clients == 0 {
            return Err(ConfigError::ZeroTrackedClients);
        }
        if self.stream_buffer == 0 {
            return Err(ConfigError::ZeroStreamBuffer);
        }
        Ok(())
    }
}

/// Semantic configuration errors detected after loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The listener host was blank.
    #[error("listener host must not be empty")]
    EmptyHost,
    /// Bucket tracking was disabled entirely.
    #[error("max_tracked_clients must be at least 1")]
    ZeroTrackedClients,
    /// Streaming responses need room for at least one event.
    #[error("stream_buffer must be at least 1")]
    ZeroStreamBuffer,
}
