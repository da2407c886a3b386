use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error};

use crate::handler::{HandlerError, HandlerRegistry, Reply};

use super::DISPATCH_TARGET;
use super::arguments::Arguments;
use super::errors::InvocationError;
use super::payload::RequestEnvelope;

/// Calls the registered handler with arguments resolved from a request.
#[derive(Debug, Clone)]
pub struct Invoker {
    registry: Arc<HandlerRegistry>,
}

impl Invoker {
    /// Builds an invoker over `registry`.
    #[must_use]
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    /// The registry consulted on every call.
    #[must_use]
    pub fn registry(&self) -> &Arc<HandlerRegistry> {
        &self.registry
    }

    /// Invokes the handler and awaits its reply.
    ///
    /// Streams are returned as soon as the handler hands them back; their
    /// elements are produced while the response is being written. A panic in
    /// the handler is reported as an untyped [`HandlerError`].
    pub async fn invoke(&self, envelope: RequestEnvelope) -> Result<Reply, InvocationError> {
        let registration = self
            .registry
            .registration()
            .ok_or(InvocationError::NoHandler)?;
        let kind = registration.kind()?;

        debug!(
            target: DISPATCH_TARGET,
            handler = registration.name(),
            kind = ?kind,
            "invoking handler"
        );

        let arguments = Arguments::for_kind(kind, envelope);
        let target = registration.target();
        let pending = panic::catch_unwind(AssertUnwindSafe(|| target.call(arguments)))
            .map_err(|payload| panicked(registration.name(), payload))??;

        match AssertUnwindSafe(pending).catch_unwind().await {
            Ok(outcome) => Ok(outcome?),
            Err(payload) => Err(panicked(registration.name(), payload)),
        }
    }
}

fn panicked(handler: &str, payload: Box<dyn std::any::Any + Send>) -> InvocationError {
    let failure = HandlerError::from_panic(payload);
    error!(
        target: DISPATCH_TARGET,
        handler,
        error = %failure,
        "handler panicked"
    );
    InvocationError::Handler(failure)
}
