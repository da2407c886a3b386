//! Built-in configuration values.
//!
//! The hosting platform connects to the container on port 8080, so the
//! listener defaults to every interface on that port.

use crate::logging::LogFormat;

/// Default interface the HTTP listener binds to.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Port mandated by the hosting platform's container contract.
pub const DEFAULT_PORT: u16 = 8080;

/// Default log filter expression used by the runtime.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Upper bound on rate-limit buckets retained at once.
pub const DEFAULT_MAX_TRACKED_CLIENTS: usize = 10_000;

/// Number of streamed events buffered ahead of a slow client.
pub const DEFAULT_STREAM_BUFFER: usize = 16;

/// Owned host value used where allocation is required (e.g. serde).
pub fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

/// Default listener port.
pub const fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Default log filter expression used by the runtime.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the runtime.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Rate limits default to zero, which disables throttling for the route.
pub const fn default_rate_limit() -> u32 {
    0
}

/// Default bound on tracked rate-limit buckets.
pub const fn default_max_tracked_clients() -> usize {
    DEFAULT_MAX_TRACKED_CLIENTS
}

/// Default streaming channel capacity.
pub const fn default_stream_buffer() -> usize {
    DEFAULT_STREAM_BUFFER
}
