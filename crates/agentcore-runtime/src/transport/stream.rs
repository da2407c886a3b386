//! Server-sent event encoding for streamed replies.
//!
//! A producer task drains the handler's stream into a bounded channel and the
//! response body drains the channel. The producer stops as soon as the client
//! disconnects, and it owns the request's [`TaskGuard`] so `/ping` reports
//! `HealthyBusy` until the last element is written.

use std::convert::Infallible;
use std::panic::AssertUnwindSafe;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::handler::{Chunk, HandlerError, ReplyStream};
use crate::invoke::InvocationError;
use crate::tasks::TaskGuard;

use super::TRANSPORT_TARGET;
use super::errors::DispatchError;

/// Event name used to report a failure after streaming has started.
const ERROR_EVENT: &str = "error";

/// Starts streaming `elements` as server-sent events.
///
/// The first element is awaited before any headers are sent, so a stream
/// that fails immediately is answered with the failure's status instead of
/// `200`. A panic while polling counts as a failure and ends the stream.
pub(super) async fn respond(
    elements: ReplyStream,
    task: TaskGuard,
    buffer: usize,
) -> Result<Response, DispatchError> {
    let mut elements = contain_panics(elements);
    let first = match elements.next().await {
        Some(Ok(chunk)) => Some(chunk),
        Some(Err(error)) => return Err(InvocationError::Handler(error).into()),
        None => None,
    };

    let (sender, receiver) = mpsc::channel(buffer.max(1));
    tokio::spawn(produce(first, elements, sender, task));

    let events = futures::stream::unfold(receiver, |mut receiver| async move {
        receiver
            .recv()
            .await
            .map(|event| (Ok::<_, Infallible>(event), receiver))
    });
    Ok(Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response())
}

fn contain_panics(elements: ReplyStream) -> ReplyStream {
    AssertUnwindSafe(elements)
        .catch_unwind()
        .map(|element| element.unwrap_or_else(|payload| Err(HandlerError::from_panic(payload))))
        .boxed()
}

async fn produce(
    first: Option<Chunk>,
    mut elements: ReplyStream,
    sender: mpsc::Sender<Event>,
    task: TaskGuard,
) {
    let mut written = 0_usize;
    if let Some(chunk) = first {
        if sender.send(chunk_event(chunk)).await.is_err() {
            debug!(target: TRANSPORT_TARGET, written, "client disconnected before the first event");
            drop(task);
            return;
        }
        written += 1;

        loop {
            let next = tokio::select! {
                () = sender.closed() => {
                    debug!(target: TRANSPORT_TARGET, written, "client disconnected; stopping stream");
                    break;
                }
                next = elements.next() => next,
            };
            let event = match next {
                Some(Ok(chunk)) => chunk_event(chunk),
                Some(Err(error)) => {
                    warn!(
                        target: TRANSPORT_TARGET,
                        written,
                        error = %error,
                        "stream failed after the response started"
                    );
                    let _ = sender.send(error_event(&error)).await;
                    break;
                }
                None => break,
            };
            if sender.send(event).await.is_err() {
                break;
            }
            written += 1;
        }
    }

    debug!(target: TRANSPORT_TARGET, written, "stream finished");
    drop(task);
    drop(sender);
}

fn chunk_event(chunk: Chunk) -> Event {
    match chunk {
        Chunk::Text(text) => Event::default().data(normalise_line_breaks(&text)),
        Chunk::Json(value) => Event::default().data(value.to_string()),
    }
}

fn error_event(error: &HandlerError) -> Event {
    Event::default()
        .event(ERROR_EVENT)
        .data(normalise_line_breaks(error.message()))
}

/// SSE data must not contain bare carriage returns; each line becomes its own
/// `data:` field.
fn normalise_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}
