use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::throttle::{ClientId, RateLimiter, Route};

use super::{RATE_LIMITED_BODY, TRANSPORT_TARGET};

/// Admits or rejects a request before it reaches its route.
///
/// Paths outside the runtime's routes are never throttled.
pub(super) async fn enforce_rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(route) = Route::from_path(request.uri().path()) else {
        return next.run(request).await;
    };
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| *address);
    let client = ClientId::resolve(request.headers(), peer);

    if limiter.admit(&client, route) {
        return next.run(request).await;
    }

    warn!(
        target: TRANSPORT_TARGET,
        client = %client,
        route = %route,
        "rate limit exceeded"
    );
    rate_limited()
}

fn rate_limited() -> Response {
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Body::from(RATE_LIMITED_BODY)).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
