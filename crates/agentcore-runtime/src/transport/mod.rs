//! HTTP surface of the runtime: `POST /invocations` and `GET /ping`.
//!
//! Every request first passes the rate-limit middleware. `/invocations`
//! decodes the body, runs the handler through the [`Invoker`], and encodes the
//! reply by shape: text as `text/plain`, JSON as `application/json`, and
//! streams as server-sent events. `/ping` reads the [`HealthService`].

mod errors;
mod invocations;
mod listener;
mod ping;
mod stream;
mod throttle;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

use crate::health::HealthService;
use crate::invoke::Invoker;
use crate::tasks::TaskCounter;
use crate::throttle::{RateLimiter, Route};

pub use self::errors::{DispatchError, ListenerError};
pub use self::listener::BoundListener;

const TRANSPORT_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::transport");

/// Body returned with `429 Too Many Requests`.
pub const RATE_LIMITED_BODY: &str = r#"{"error":"Rate limit exceeded"}"#;

/// Shared state behind both routes.
#[derive(Clone)]
pub struct RuntimeState {
    invoker: Invoker,
    health: Arc<HealthService>,
    limiter: Arc<RateLimiter>,
    tasks: Arc<TaskCounter>,
    stream_buffer: usize,
}

impl RuntimeState {
    /// Bundles the collaborators the routes depend on.
    #[must_use]
    pub fn new(
        invoker: Invoker,
        health: Arc<HealthService>,
        limiter: Arc<RateLimiter>,
        tasks: Arc<TaskCounter>,
        stream_buffer: usize,
    ) -> Self {
        Self {
            invoker,
            health,
            limiter,
            tasks,
            stream_buffer: stream_buffer.max(1),
        }
    }
}

/// Builds the runtime's router.
///
/// Serve it with [`Router::into_make_service_with_connect_info`] so the rate
/// limiter can fall back to the peer address.
pub fn router(state: RuntimeState) -> Router {
    let limiter = Arc::clone(&state.limiter);
    Router::new()
        .route(Route::Invocations.path(), post(invocations::invoke))
        .route(Route::Ping.path(), get(ping::ping))
        .layer(middleware::from_fn_with_state(
            limiter,
            throttle::enforce_rate_limit,
        ))
        .with_state(state)
}
