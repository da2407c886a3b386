//! Process-wide `tracing` setup for the runtime.
//!
//! Events go to standard error as flattened JSON lines or as compact text,
//! stamped with RFC 3339 UTC times. Colour is only used when standard error
//! is a terminal. The subscriber is installed once per process; bootstrapping
//! again reuses it.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;

use agentcore_config::{Config, LogFormat};

/// Remembers the format of the subscriber this process installed.
static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that the global subscriber is in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

/// Reasons telemetry could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Another subscriber already owns the global slot.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

impl From<ParseError> for TelemetryError {
    fn from(error: ParseError) -> Self {
        Self::Filter(error.to_string())
    }
}

/// Installs the global subscriber described by `config`.
///
/// Only the first successful call has an effect. Later calls, even with a
/// different configuration, return a handle to the subscriber already in
/// place, which lets tests bootstrap the runtime many times in one process.
///
/// # Errors
///
/// Fails when the filter does not parse or when a subscriber this module did
/// not install already owns the global slot.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED.get_or_try_init(|| {
        let format = config.log_format();
        let filter = EnvFilter::try_new(config.log_filter())?;
        tracing::subscriber::set_global_default(subscriber_for(format, filter))
            .map_err(TelemetryError::Subscriber)?;
        Ok::<_, TelemetryError>(format)
    })?;
    Ok(TelemetryHandle)
}

fn subscriber_for(format: LogFormat, filter: EnvFilter) -> BoxedSubscriber {
    let base = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true);
    match format {
        LogFormat::Json => Box::new(base.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(base.compact().finish()),
    }
}
