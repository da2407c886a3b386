//! Errors raised by handlers and by handler registration.

use std::any::Any;
use std::error::Error as StdError;

use axum::http::StatusCode;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Business failure reported by a handler.
///
/// A handler may attach an HTTP status to express a specific failure intent
/// (for example `400 Bad Request` for invalid input); failures without one
/// surface as `500 Internal Server Error`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    status: Option<StatusCode>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandlerError {
    /// Creates a failure without status intent.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a failure that should be answered with `status`.
    pub fn with_status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it as the source.
    pub fn from_source(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            status: None,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Convenience for `400 Bad Request`.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, message)
    }

    /// Status intent attached by the handler, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Converts a caught panic into an untyped failure, keeping the panic
    /// message when it is a string.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|text| (*text).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned());
        match detail {
            Some(detail) => Self::new(format!("handler panicked: {detail}")),
            None => Self::new("handler panicked"),
        }
    }
}

/// Errors raised while populating the handler registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// A handler is already registered; registrations are never replaced.
    #[error(
        "cannot register invocation handler '{rejected}': '{existing}' is already registered"
    )]
    MultipleHandlers {
        /// Name of the handler that holds the registration.
        existing: String,
        /// Name of the handler that was turned away.
        rejected: String,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use axum::http::StatusCode;
    use rstest::rstest;

    use super::HandlerError;

    #[rstest]
    #[case(Box::new("static text"), "handler panicked: static text")]
    #[case(Box::new(String::from("owned text")), "handler panicked: owned text")]
    #[case(Box::new(7_u8), "handler panicked")]
    fn panics_become_untyped_failures(
        #[case] payload: Box<dyn std::any::Any + Send>,
        #[case] message: &str,
    ) {
        let error = HandlerError::from_panic(payload);
        assert_eq!(error.message(), message);
        assert_eq!(error.status(), None);
    }

    #[rstest]
    fn status_intent_is_optional() {
        assert_eq!(HandlerError::new("boom").status(), None);
        assert_eq!(
            HandlerError::bad_request("missing prompt").status(),
            Some(StatusCode::BAD_REQUEST)
        );
    }

    #[rstest]
    fn wrapped_sources_remain_reachable() {
        let error = HandlerError::from_source(io::Error::other("disk full"));
        assert_eq!(error.message(), "disk full");
        assert!(error.source().is_some());
    }
}
