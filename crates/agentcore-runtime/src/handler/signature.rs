use std::any::{TypeId, type_name};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::invoke::InvocationContext;

/// Shape of one declared handler parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// The per-request [`InvocationContext`].
    Context,
    /// Raw text; text payloads pass through unchanged.
    Text,
    /// A generic JSON tree or object; JSON payloads pass through unchanged.
    Structured,
    /// Any other deserialisable type, named for diagnostics.
    Typed(&'static str),
}

impl ParamType {
    /// Describes the Rust type `T` as a handler parameter.
    #[must_use]
    pub fn of<T: 'static>() -> Self {
        let id = TypeId::of::<T>();
        if id == TypeId::of::<InvocationContext>() {
            Self::Context
        } else if id == TypeId::of::<String>() {
            Self::Text
        } else if id == TypeId::of::<Value>() || id == TypeId::of::<Map<String, Value>>() {
            Self::Structured
        } else {
            Self::Typed(type_name::<T>())
        }
    }

    /// Whether the parameter receives the invocation context.
    #[must_use]
    pub const fn is_context(&self) -> bool {
        matches!(self, Self::Context)
    }
}

/// Ordered parameter descriptors and return descriptor of a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    params: Vec<ParamType>,
    returns: &'static str,
}

impl Signature {
    /// Builds a signature from its parts.
    #[must_use]
    pub fn new(params: Vec<ParamType>, returns: &'static str) -> Self {
        Self { params, returns }
    }

    /// Declared parameters in order.
    #[must_use]
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Name of the declared return type.
    #[must_use]
    pub const fn returns(&self) -> &'static str {
        self.returns
    }

    /// Determines how arguments are assembled for this signature.
    pub fn classify(&self) -> Result<HandlerKind, UnsupportedSignature> {
        match self.params.as_slice() {
            [] => Ok(HandlerKind::NoArgs),
            [single] if single.is_context() => Ok(HandlerKind::ContextOnly),
            [_] => Ok(HandlerKind::RequestOnly),
            [first, second] => match (first.is_context(), second.is_context()) {
                (true, false) => Ok(HandlerKind::RequestAndContext { context_index: 0 }),
                (false, true) => Ok(HandlerKind::RequestAndContext { context_index: 1 }),
                (true, true) => Err(UnsupportedSignature::new(
                    "both parameters are invocation contexts",
                )),
                (false, false) => Err(UnsupportedSignature::new(
                    "two parameters require exactly one invocation context",
                )),
            },
            params => Err(UnsupportedSignature::new(format!(
                "{} parameters exceed the supported maximum of two",
                params.len()
            ))),
        }
    }
}

/// Supported handler shapes, classified once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerKind {
    /// No parameters.
    NoArgs,
    /// A single context parameter.
    ContextOnly,
    /// A single request parameter.
    RequestOnly,
    /// One request and one context parameter, in either order.
    RequestAndContext {
        /// Position of the context parameter.
        context_index: usize,
    },
}

/// Explains why a signature cannot be invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported handler signature: {reason}")]
pub struct UnsupportedSignature {
    reason: String,
}

impl UnsupportedSignature {
    /// Creates the error with a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Why the signature was rejected.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
