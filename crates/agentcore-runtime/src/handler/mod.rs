//! The single business handler behind `POST /invocations`.
//!
//! A [`Handler`] pairs a [`Signature`] with an [`InvocationTarget`]. The typed
//! constructors derive the signature from the closure's parameter types, so
//! every supported shape (no arguments, a request, a context, or a request and
//! a context in either order) is checked by the compiler. Dynamic targets built
//! with [`Handler::from_target`] may declare any shape; unsupported shapes are
//! recorded at registration and rejected per request.

mod discovery;
mod errors;
mod registry;
mod reply;
mod signature;

use std::any::type_name;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::invoke::{Arguments, InvocationContext, InvocationError};

pub use self::discovery::{
    InvocationMarker, RuntimeServices, discover, discover_linked, linked_markers,
};
pub use self::errors::{HandlerError, RegistrationError};
pub use self::registry::{HandlerRegistration, HandlerRegistry};
pub use self::reply::{Chunk, IntoChunk, IntoReply, Json, Reply, ReplyStream};
pub use self::signature::{HandlerKind, ParamType, Signature, UnsupportedSignature};

const REGISTRY_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::registry");

/// Pending result of a handler call.
pub type ReplyFuture = BoxFuture<'static, Result<Reply, HandlerError>>;

/// Callable behind a registered handler.
///
/// `call` receives the arguments assembled for the handler's
/// [`HandlerKind`], ordered as the signature declares them. Argument
/// resolution failures are returned immediately; the handler's own outcome is
/// carried by the returned future.
pub trait InvocationTarget: Send + Sync {
    /// Starts one invocation.
    fn call(&self, arguments: Arguments) -> Result<ReplyFuture, InvocationError>;
}

struct FnTarget<F>(F);

impl<F> InvocationTarget for FnTarget<F>
where
    F: Fn(Arguments) -> Result<ReplyFuture, InvocationError> + Send + Sync,
{
    fn call(&self, arguments: Arguments) -> Result<ReplyFuture, InvocationError> {
        (self.0)(arguments)
    }
}

/// A handler ready for registration.
#[derive(Clone)]
pub struct Handler {
    signature: Signature,
    target: Arc<dyn InvocationTarget>,
}

impl Handler {
    /// Wraps an arbitrary target described by `signature`.
    #[must_use]
    pub fn from_target(signature: Signature, target: Arc<dyn InvocationTarget>) -> Self {
        Self { signature, target }
    }

    /// Handler taking no arguments.
    pub fn no_args<F, Fut, R>(handler: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply + 'static,
    {
        Self::from_fn(Signature::new(Vec::new(), type_name::<R>()), move |_| {
            Ok(boxed_reply(handler()))
        })
    }

    /// Handler taking the request payload converted into `T`.
    pub fn with_request<T, F, Fut, R>(handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply + 'static,
    {
        let signature = Signature::new(vec![ParamType::of::<T>()], type_name::<R>());
        Self::from_fn(signature, move |mut arguments| {
            let request = arguments.request::<T>(0)?;
            Ok(boxed_reply(handler(request)))
        })
    }

    /// Handler taking only the invocation context.
    pub fn with_context<F, Fut, R>(handler: F) -> Self
    where
        F: Fn(InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply + 'static,
    {
        let signature = Signature::new(vec![ParamType::Context], type_name::<R>());
        Self::from_fn(signature, move |mut arguments| {
            let context = arguments.context(0)?;
            Ok(boxed_reply(handler(context)))
        })
    }

    /// Handler declaring the context first and the request second.
    pub fn with_context_and_request<T, F, Fut, R>(handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(InvocationContext, T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply + 'static,
    {
        let signature = Signature::new(
            vec![ParamType::Context, ParamType::of::<T>()],
            type_name::<R>(),
        );
        Self::from_fn(signature, move |mut arguments| {
            let context = arguments.context(0)?;
            let request = arguments.request::<T>(1)?;
            Ok(boxed_reply(handler(context, request)))
        })
    }

    /// Handler declaring the request first and the context second.
    pub fn with_request_and_context<T, F, Fut, R>(handler: F) -> Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(T, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
        R: IntoReply + 'static,
    {
        let signature = Signature::new(
            vec![ParamType::of::<T>(), ParamType::Context],
            type_name::<R>(),
        );
        Self::from_fn(signature, move |mut arguments| {
            let request = arguments.request::<T>(0)?;
            let context = arguments.context(1)?;
            Ok(boxed_reply(handler(request, context)))
        })
    }

    /// Synchronous handler taking the request payload converted into `T`.
    ///
    /// The closure runs on the blocking thread pool so slow handlers do not
    /// stall the request reactor.
    pub fn blocking<T, F, R>(handler: F) -> Self
    where
        T: DeserializeOwned + Send + 'static,
        F: Fn(T) -> Result<R, HandlerError> + Send + Sync + 'static,
        R: IntoReply + Send + 'static,
    {
        let handler = Arc::new(handler);
        let signature = Signature::new(vec![ParamType::of::<T>()], type_name::<R>());
        Self::from_fn(signature, move |mut arguments| {
            let request = arguments.request::<T>(0)?;
            let handler = Arc::clone(&handler);
            Ok(async move {
                match tokio::task::spawn_blocking(move || handler(request)).await {
                    Ok(outcome) => outcome.and_then(IntoReply::into_reply),
                    Err(join) => Err(HandlerError::from_source(join)),
                }
            }
            .boxed())
        })
    }

    /// Declared signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Target invoked for each request.
    #[must_use]
    pub fn target(&self) -> &Arc<dyn InvocationTarget> {
        &self.target
    }

    fn from_fn<F>(signature: Signature, call: F) -> Self
    where
        F: Fn(Arguments) -> Result<ReplyFuture, InvocationError> + Send + Sync + 'static,
    {
        Self::from_target(signature, Arc::new(FnTarget(call)))
    }

    pub(crate) fn into_parts(self) -> (Signature, Arc<dyn InvocationTarget>) {
        (self.signature, self.target)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Handler")
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

fn boxed_reply<Fut, R>(pending: Fut) -> ReplyFuture
where
    Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    R: IntoReply + 'static,
{
    async move { pending.await.and_then(IntoReply::into_reply) }.boxed()
}
