//! Values handlers hand back to the dispatcher.
//!
//! A [`Reply`] is either a single value, encoded once, or a live stream whose
//! [`Chunk`]s are encoded and flushed individually as the handler yields them.

use std::fmt;

use futures::stream::{BoxStream, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

use super::errors::HandlerError;

/// Live sequence of streamed reply elements.
pub type ReplyStream = BoxStream<'static, Result<Chunk, HandlerError>>;

/// Result of a handler invocation.
pub enum Reply {
    /// Plain text, sent verbatim.
    Text(String),
    /// A JSON document.
    Json(Value),
    /// A stream delivered as server-sent events.
    Stream(ReplyStream),
}

impl Reply {
    /// Builds a text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Serialises `value` into a JSON reply.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(HandlerError::from_source)
    }

    /// Wraps a stream of elements; each element becomes one event.
    pub fn stream<S, C>(elements: S) -> Self
    where
        S: Stream<Item = Result<C, HandlerError>> + Send + 'static,
        C: IntoChunk,
    {
        Self::Stream(
            elements
                .map(|element| element.and_then(IntoChunk::into_chunk))
                .boxed(),
        )
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => formatter.debug_tuple("Text").field(text).finish(),
            Self::Json(value) => formatter.debug_tuple("Json").field(value).finish(),
            Self::Stream(_) => formatter.write_str("Stream(..)"),
        }
    }
}

/// One element of a streamed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// Emitted as-is.
    Text(String),
    /// Emitted as compact JSON.
    Json(Value),
}

/// Serialisable value that should be encoded as JSON in a reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

/// Conversion into a reply.
pub trait IntoReply {
    /// Performs the conversion.
    fn into_reply(self) -> Result<Reply, HandlerError>;
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(self)
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Text(self))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Text(self.to_owned()))
    }
}

impl IntoReply for Value {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Ok(Reply::Json(self))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Reply, HandlerError> {
        Reply::json(&self.0)
    }
}

/// Conversion into a streamed element.
pub trait IntoChunk {
    /// Performs the conversion.
    fn into_chunk(self) -> Result<Chunk, HandlerError>;
}

impl IntoChunk for Chunk {
    fn into_chunk(self) -> Result<Chunk, HandlerError> {
        Ok(self)
    }
}

impl IntoChunk for String {
    fn into_chunk(self) -> Result<Chunk, HandlerError> {
        Ok(Chunk::Text(self))
    }
}

impl IntoChunk for &'static str {
    fn into_chunk(self) -> Result<Chunk, HandlerError> {
        Ok(Chunk::Text(self.to_owned()))
    }
}

impl IntoChunk for Value {
    fn into_chunk(self) -> Result<Chunk, HandlerError> {
        Ok(Chunk::Json(self))
    }
}

impl<T: Serialize> IntoChunk for Json<T> {
    fn into_chunk(self) -> Result<Chunk, HandlerError> {
        serde_json::to_value(&self.0)
            .map(Chunk::Json)
            .map_err(HandlerError::from_source)
    }
}
