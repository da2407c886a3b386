use std::any::{Any, TypeId, type_name};

use axum::http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::errors::InvocationError;

/// Decoded `/invocations` request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body sent as `text/plain`.
    Text(String),
    /// Body parsed as JSON.
    Json(Value),
}

impl Payload {
    /// Converts the payload into `T`.
    ///
    /// Text requested as `String`, JSON requested as [`Value`], and JSON
    /// objects requested as a [`Map`] pass through unchanged. Anything else is
    /// encoded to JSON text (text payloads already are) and decoded into `T`.
    pub fn resolve<T>(self) -> Result<T, InvocationError>
    where
        T: DeserializeOwned + 'static,
    {
        match self {
            Self::Text(text) if is::<T, String>() => pass_through(text),
            Self::Json(value) if is::<T, Value>() => pass_through(value),
            Self::Json(Value::Object(map)) if is::<T, Map<String, Value>>() => pass_through(map),
            Self::Text(text) => decode(&text),
            Self::Json(value) => {
                let text = serde_json::to_string(&value)
                    .map_err(|source| InvocationError::type_conversion(type_name::<T>(), source))?;
                decode(&text)
            }
        }
    }
}

fn is<T: 'static, U: 'static>() -> bool {
    TypeId::of::<T>() == TypeId::of::<U>()
}

fn pass_through<T: 'static, U: 'static>(value: U) -> Result<T, InvocationError> {
    let boxed: Box<dyn Any> = Box::new(value);
    boxed
        .downcast::<T>()
        .map(|typed| *typed)
        .map_err(|_| InvocationError::unsupported(format!("{} is not a pass-through type", type_name::<T>())))
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, InvocationError> {
    serde_json::from_str(text).map_err(|source| InvocationError::type_conversion(type_name::<T>(), source))
}

/// Request body and headers handed to the invoker.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    payload: Payload,
    headers: HeaderMap,
}

impl RequestEnvelope {
    /// Bundles a payload with its request headers.
    #[must_use]
    pub fn new(payload: Payload, headers: HeaderMap) -> Self {
        Self { payload, headers }
    }

    /// The decoded body.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Splits the envelope into payload and headers.
    #[must_use]
    pub fn into_parts(self) -> (Payload, HeaderMap) {
        (self.payload, self.headers)
    }
}
