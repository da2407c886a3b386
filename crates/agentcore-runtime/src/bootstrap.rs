//! Runtime bootstrap orchestration.
//!
//! Bootstrap loads configuration, installs telemetry, builds the shared
//! collaborators (task counter, health service, rate limiter), and binds the
//! invocation handler. Any failure is reported and aborts start-up; a missing
//! handler does not, because `/ping` must still answer.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use agentcore_config::{Config, ConfigError};
use axum::Router;
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::handler::{
    HandlerRegistry, InvocationMarker, RegistrationError, RuntimeServices, discover,
    linked_markers,
};
use crate::health::{HealthService, LivenessProbe};
use crate::invoke::Invoker;
use crate::reporter::{LifecycleReporter, StructuredLifecycleReporter};
use crate::tasks::TaskCounter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::throttle::{RateLimiter, RouteLimits};
use crate::transport::{self, BoundListener, ListenerError, RuntimeState};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the runtime configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader(pub Config);

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.0.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Configuration loaded but holds unusable values.
    #[error("invalid configuration: {source}")]
    InvalidConfiguration {
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// More than one invocation handler was declared.
    #[error("failed to register invocation handler: {source}")]
    Discovery {
        #[source]
        source: RegistrationError,
    },
}

/// A bootstrapped runtime, ready to serve.
pub struct Runtime {
    config: Config,
    registry: Arc<HandlerRegistry>,
    tasks: Arc<TaskCounter>,
    health: Arc<HealthService>,
    limiter: Arc<RateLimiter>,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn LifecycleReporter>,
}

impl Runtime {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The handler registry populated by discovery.
    #[must_use]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Shared in-flight work counter.
    #[must_use]
    pub fn tasks(&self) -> &Arc<TaskCounter> {
        &self.tasks
    }

    /// Health service answering `/ping`.
    #[must_use]
    pub fn health(&self) -> &Arc<HealthService> {
        &self.health
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Builds the HTTP router over the runtime's collaborators.
    #[must_use]
    pub fn router(&self) -> Router {
        transport::router(RuntimeState::new(
            Invoker::new(Arc::clone(&self.registry)),
            Arc::clone(&self.health),
            Arc::clone(&self.limiter),
            Arc::clone(&self.tasks),
            self.config.stream_buffer(),
        ))
    }

    /// Binds the configured listen address.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the address cannot be resolved or bound.
    pub async fn bind(&self) -> Result<BoundListener, ListenerError> {
        BoundListener::bind(&self.config.listen_address()).await
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when binding fails or the server stops with
    /// an I/O error.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.bind().await?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] when the server stops with an I/O error.
    pub async fn serve_on<F>(self, listener: BoundListener, shutdown: F) -> Result<(), ListenerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.reporter.listener_ready(listener.local_addr());
        let outcome = listener.serve(self.router(), shutdown).await;
        self.reporter.listener_stopped();
        outcome
    }
}

/// Bootstraps the runtime from the markers linked into the binary, using the
/// system configuration loader and structured lifecycle reporting.
///
/// # Errors
///
/// Returns [`BootstrapError`] when any bootstrap stage fails.
pub fn bootstrap(probe: Option<Arc<dyn LivenessProbe>>) -> Result<Runtime, BootstrapError> {
    bootstrap_with(
        &SystemConfigLoader,
        Arc::new(StructuredLifecycleReporter::new()),
        probe,
        linked_markers(),
    )
}

/// Bootstraps the runtime using the supplied collaborators.
///
/// # Errors
///
/// Returns [`BootstrapError`] when configuration cannot be loaded or
/// validated, telemetry cannot be installed, or more than one marker is
/// supplied.
pub fn bootstrap_with<'a, I>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn LifecycleReporter>,
    probe: Option<Arc<dyn LivenessProbe>>,
    markers: I,
) -> Result<Runtime, BootstrapError>
where
    I: IntoIterator<Item = &'a InvocationMarker>,
{
    reporter.bootstrap_starting();
    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;
    let max_tracked = validated_capacity(&config)
        .map_err(|source| fail(BootstrapError::InvalidConfiguration { source }))?;
    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;

    let tasks = Arc::new(TaskCounter::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let registry = Arc::new(HandlerRegistry::new());
    let services = RuntimeServices::new(Arc::clone(&tasks));

    match discover(&registry, &services, markers) {
        Ok(Some(name)) => reporter.handler_registered(name),
        Ok(None) => reporter.handler_missing(),
        Err(source) => return Err(fail(BootstrapError::Discovery { source })),
    }

    let health = Arc::new(HealthService::with_probe(
        probe,
        Arc::clone(&tasks),
        Arc::clone(&clock),
    ));
    let limiter = Arc::new(RateLimiter::new(
        RouteLimits::from_config(&config),
        max_tracked,
        clock,
    ));

    reporter.bootstrap_succeeded(&config);
    Ok(Runtime {
        config,
        registry,
        tasks,
        health,
        limiter,
        telemetry,
        reporter,
    })
}

fn validated_capacity(config: &Config) -> Result<NonZeroUsize, ConfigError> {
    config.validate()?;
    NonZeroUsize::new(config.max_tracked_clients()).ok_or(ConfigError::ZeroTrackedClients)
}
