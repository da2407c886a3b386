//! Structured reporting of runtime lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use agentcore_config::Config;

use crate::bootstrap::BootstrapError;

const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::lifecycle");

/// Observer notified as the runtime boots, binds, and shuts down.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a discovered handler is bound to the registry.
    fn handler_registered(&self, name: &str);

    /// Invoked when discovery finds no handler; every invocation will fail
    /// until one is registered.
    fn handler_missing(&self);

    /// Invoked once the listener is accepting connections.
    fn listener_ready(&self, address: SocketAddr);

    /// Invoked after the listener has drained and stopped.
    fn listener_stopped(&self);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn handler_registered(&self, name: &str) {
        (**self).handler_registered(name);
    }

    fn handler_missing(&self) {
        (**self).handler_missing();
    }

    fn listener_ready(&self, address: SocketAddr) {
        (**self).listener_ready(address);
    }

    fn listener_stopped(&self) {
        (**self).listener_stopped();
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_starting",
            "starting runtime bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen_address(),
            invocations_limit = config.invocations_limit(),
            ping_limit = config.ping_limit(),
            log_format = ?config.log_format(),
            "runtime bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: LIFECYCLE_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "runtime bootstrap failed"
        );
    }

    fn handler_registered(&self, name: &str) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "handler_registered",
            handler = name,
            "invocation handler bound"
        );
    }

    fn handler_missing(&self) {
        tracing::warn!(
            target: LIFECYCLE_TARGET,
            event = "handler_missing",
            "no invocation handler registered; /invocations will fail"
        );
    }

    fn listener_ready(&self, address: SocketAddr) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "listener_ready",
            address = %address,
            "runtime accepting requests"
        );
    }

    fn listener_stopped(&self) {
        tracing::info!(
            target: LIFECYCLE_TARGET,
            event = "listener_stopped",
            "runtime stopped"
        );
    }
}
