//! Argument resolution and handler invocation.
//!
//! The [`Invoker`] assembles arguments for the registered handler's
//! [`HandlerKind`](crate::HandlerKind): the per-request [`InvocationContext`]
//! goes to the context slot and the request payload is resolved into the
//! declared request type. Payloads that already have the target shape pass
//! through untouched; everything else takes a JSON round trip.

mod arguments;
mod context;
mod errors;
mod invoker;
mod payload;

pub use self::arguments::{Argument, Arguments};
pub use self::context::{InvocationContext, headers};
pub use self::errors::InvocationError;
pub use self::invoker::Invoker;
pub use self::payload::{Payload, RequestEnvelope};

const DISPATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::dispatch");
