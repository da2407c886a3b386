//! Errors surfaced by the HTTP layer.

use std::io;
use std::net::SocketAddr;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::invoke::InvocationError;

use super::TRANSPORT_TARGET;

/// Failures converted into `/invocations` error responses.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A `text/plain` body was not valid UTF-8.
    #[error("request body is not valid UTF-8: {source}")]
    InvalidUtf8 {
        #[source]
        source: std::string::FromUtf8Error,
    },
    /// A JSON body could not be parsed.
    #[error("malformed JSON request body: {source}")]
    MalformedJson {
        #[source]
        source: serde_json::Error,
    },
    /// The body's content type is neither JSON nor plain text.
    #[error("unsupported content type '{content_type}'")]
    UnsupportedMediaType { content_type: String },
    /// Invocation failed.
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl DispatchError {
    /// HTTP status reported to the caller.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUtf8 { .. } | Self::MalformedJson { .. } => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::Invocation(inner) => inner.status(),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                target: TRANSPORT_TARGET,
                status = status.as_u16(),
                error = %self,
                "invocation failed"
            );
        } else {
            warn!(
                target: TRANSPORT_TARGET,
                status = status.as_u16(),
                error = %self,
                "invocation rejected"
            );
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors surfaced while binding or running the HTTP listener.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to resolve TCP address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    #[error("no TCP addresses resolved for {host}:{port}")]
    ResolveEmpty { host: String, port: u16 },
    #[error("failed to bind TCP listener at {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to read the bound listener address: {source}")]
    LocalAddress {
        #[source]
        source: io::Error,
    },
    #[error("HTTP server terminated: {source}")]
    Serve {
        #[source]
        source: io::Error,
    },
}
