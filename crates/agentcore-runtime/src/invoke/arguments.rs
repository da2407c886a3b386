use serde::de::DeserializeOwned;

use crate::handler::HandlerKind;

use super::context::InvocationContext;
use super::errors::InvocationError;
use super::payload::{Payload, RequestEnvelope};

/// One assembled handler argument.
#[derive(Debug, Clone)]
pub enum Argument {
    /// The invocation context slot.
    Context(InvocationContext),
    /// The request slot, still in wire form.
    Request(Payload),
}

/// Arguments for one invocation, ordered as the handler declares them.
///
/// Each slot can be taken once.
#[derive(Debug, Default)]
pub struct Arguments {
    slots: Vec<Option<Argument>>,
}

impl Arguments {
    /// Wraps explicitly assembled arguments.
    #[must_use]
    pub fn new(arguments: Vec<Argument>) -> Self {
        Self {
            slots: arguments.into_iter().map(Some).collect(),
        }
    }

    /// Lays out the envelope for a handler of the given kind. The context is
    /// built only when the handler declares one.
    #[must_use]
    pub fn for_kind(kind: HandlerKind, envelope: RequestEnvelope) -> Self {
        let (payload, headers) = envelope.into_parts();
        let arguments = match kind {
            HandlerKind::NoArgs => Vec::new(),
            HandlerKind::ContextOnly => vec![Argument::Context(InvocationContext::new(headers))],
            HandlerKind::RequestOnly => vec![Argument::Request(payload)],
            HandlerKind::RequestAndContext { context_index: 0 } => vec![
                Argument::Context(InvocationContext::new(headers)),
                Argument::Request(payload),
            ],
            HandlerKind::RequestAndContext { .. } => vec![
                Argument::Request(payload),
                Argument::Context(InvocationContext::new(headers)),
            ],
        };
        Self::new(arguments)
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the handler takes no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Takes the context at `index`.
    pub fn context(&mut self, index: usize) -> Result<InvocationContext, InvocationError> {
        match self.take(index)? {
            Argument::Context(context) => Ok(context),
            Argument::Request(_) => Err(InvocationError::unsupported(format!(
                "parameter {index} expects the request, not the invocation context"
            ))),
        }
    }

    /// Takes the raw request payload at `index`.
    pub fn payload(&mut self, index: usize) -> Result<Payload, InvocationError> {
        match self.take(index)? {
            Argument::Request(payload) => Ok(payload),
            Argument::Context(_) => Err(InvocationError::unsupported(format!(
                "parameter {index} expects the invocation context, not the request"
            ))),
        }
    }

    /// Takes the request at `index`, resolved into `T`.
    pub fn request<T>(&mut self, index: usize) -> Result<T, InvocationError>
    where
        T: DeserializeOwned + 'static,
    {
        self.payload(index)?.resolve()
    }

    fn take(&mut self, index: usize) -> Result<Argument, InvocationError> {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| InvocationError::unsupported(format!("no argument at position {index}")))
    }
}
