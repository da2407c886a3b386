use axum::http::StatusCode;
use thiserror::Error;

use crate::handler::{HandlerError, UnsupportedSignature};

/// Failures raised while invoking the registered handler.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// No handler was discovered at start-up.
    #[error("no invocation handler is registered")]
    NoHandler,
    /// The handler's parameter shape cannot be invoked.
    #[error(transparent)]
    UnsupportedSignature(#[from] UnsupportedSignature),
    /// The payload could not be converted into the declared request type.
    #[error("cannot convert request payload into {target}: {message}")]
    TypeConversion {
        /// Name of the requested type.
        target: &'static str,
        /// Converter diagnostic.
        message: String,
        /// Underlying serde error, when one was raised.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The handler itself failed; the error is passed through unchanged.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

impl InvocationError {
    /// Creates a type conversion error from a serde failure.
    pub fn type_conversion(target: &'static str, source: serde_json::Error) -> Self {
        Self::TypeConversion {
            target,
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an unsupported signature error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedSignature(UnsupportedSignature::new(reason))
    }

    /// HTTP status reported to the caller.
    ///
    /// Unconvertible payloads are client errors. Missing or unusable handlers
    /// are server errors, and handler failures use their own status intent
    /// when they carry one.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::TypeConversion { .. } => StatusCode::BAD_REQUEST,
            Self::NoHandler | Self::UnsupportedSignature(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Handler(error) => error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }
}
