//! Runtime adapter exposing one business handler behind the agent hosting
//! contract.
//!
//! The runtime serves two routes. `POST /invocations` decodes the request
//! body, adapts it to the registered handler's signature, and encodes the
//! reply as text, JSON, or a stream of server-sent events. `GET /ping`
//! reports `Healthy`, `HealthyBusy`, or `Unhealthy` from an optional
//! liveness probe and the count of in-flight work. Both routes are throttled
//! per client and route with token buckets.
//!
//! Applications declare their handler once with [`agent_invocation!`] and
//! start the runtime with [`bootstrap`]:
//!
//! ```ignore
//! use agentcore_runtime::{Handler, HandlerError, RuntimeServices};
//!
//! fn build(_services: &RuntimeServices) -> Handler {
//!     Handler::with_request(|prompt: String| async move {
//!         Ok::<_, HandlerError>(format!("You said: {prompt}"))
//!     })
//! }
//!
//! agentcore_runtime::agent_invocation!(echo, build);
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runtime = agentcore_runtime::bootstrap(None)?;
//!     runtime.serve(async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     Ok(())
//! }
//! ```
//!
//! Every stage of start-up and shutdown is surfaced through a
//! [`LifecycleReporter`], and all logging goes through `tracing` with a
//! subscriber configured from [`agentcore_config::Config`].

mod bootstrap;
pub mod clock;
mod handler;
mod health;
mod invoke;
mod reporter;
mod tasks;
mod telemetry;
mod throttle;
mod transport;

#[doc(hidden)]
pub use inventory;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Runtime, StaticConfigLoader, SystemConfigLoader, bootstrap,
    bootstrap_with,
};
pub use handler::{
    Chunk, Handler, HandlerError, HandlerKind, HandlerRegistration, HandlerRegistry, IntoChunk,
    IntoReply, InvocationMarker, InvocationTarget, Json, ParamType, RegistrationError, Reply,
    ReplyFuture, ReplyStream, RuntimeServices, Signature, UnsupportedSignature, discover,
    discover_linked, linked_markers,
};
pub use health::{
    HealthService, HealthSnapshot, LivenessProbe, PingStatus, ProbeError, ProbeStatus,
};
pub use invoke::{
    Argument, Arguments, InvocationContext, InvocationError, Invoker, Payload, RequestEnvelope,
    headers,
};
pub use reporter::{LifecycleReporter, StructuredLifecycleReporter};
pub use tasks::{TaskCounter, TaskGuard};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use throttle::{
    ClientId, DEFAULT_CLIENT, FORWARDED_FOR, RateLimiter, Route, RouteLimits, TokenBucket,
};
pub use transport::{
    BoundListener, DispatchError, ListenerError, RATE_LIMITED_BODY, RuntimeState, router,
};

#[cfg(test)]
mod tests;
