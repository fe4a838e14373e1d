//! Handler and pre-handler traits and their type erasure.
//!
//! # How async handlers are stored
//!
//! A route keeps handlers of *different* concrete types side by side: its
//! frozen pre-handler chain and its main handler. They are stored as trait
//! objects behind an `Arc` so the chain can be snapshotted into many routes
//! without copying the closures.
//!
//! ```text
//! |ctx: Context| async move { … }            ← user writes this
//!        ↓ router.get("/", handler)
//! handler.into_boxed_handler()              ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(handler))              ← stored as BoxedHandler
//!        ↓
//! handler.call(ctx) at request time         ← one vtable dispatch
//!        ↓
//! Box::pin(async { handler(ctx).await.respond() })
//! ```
//!
//! Every handler is driven through a boxed future, whether or not it ever
//! suspends. The dispatch engine therefore always awaits, and never has to
//! know which handlers are "really" async.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{BoxError, Error};
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, ctx: Context) -> BoxFuture<Result<Response, Error>>;
}

#[doc(hidden)]
pub trait ErasedPreHandler {
    fn call(&self, ctx: Context) -> BoxFuture<Result<Flow, Error>>;
}

#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

#[doc(hidden)]
pub type BoxedPreHandler = Arc<dyn ErasedPreHandler + Send + Sync + 'static>;

// ── Flow ──────────────────────────────────────────────────────────────────────

/// What a pre-handler decided.
///
/// `Continue` hands control to the next pre-handler (or the main handler);
/// `ShortCircuit(value)` stops the chain and `value` becomes the response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Flow<R = Response> {
    Continue,
    ShortCircuit(R),
}

/// Conversion of a pre-handler's output into a [`Flow`].
///
/// | Output                 | Meaning                                    |
/// |------------------------|--------------------------------------------|
/// | `()`                   | continue                                   |
/// | `Option<T>`            | `None` continues, `Some(t)` short-circuits |
/// | `Flow<T>`              | as written                                 |
/// | `Result<O, E>`         | `Ok` as `O`, `Err` fails the request       |
pub trait IntoFlow {
    fn into_flow(self) -> Result<Flow, BoxError>;
}

impl IntoFlow for () {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(Flow::Continue)
    }
}

impl<T: IntoResponse> IntoFlow for Option<T> {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(match self {
            Some(value) => Flow::ShortCircuit(value.into_response()),
            None => Flow::Continue,
        })
    }
}

impl<T: IntoResponse> IntoFlow for Flow<T> {
    fn into_flow(self) -> Result<Flow, BoxError> {
        Ok(match self {
            Flow::ShortCircuit(value) => Flow::ShortCircuit(value.into_response()),
            Flow::Continue => Flow::Continue,
        })
    }
}

impl<O: IntoFlow, E: Into<BoxError>> IntoFlow for Result<O, E> {
    fn into_flow(self) -> Result<Flow, BoxError> {
        match self {
            Ok(out) => out.into_flow(),
            Err(e) => Err(e.into()),
        }
    }
}

// ── Responder ─────────────────────────────────────────────────────────────────

/// Conversion of a main handler's output into a response or a failure.
///
/// Every [`IntoResponse`] type is a `Responder`, and so is
/// `Result<T: IntoResponse, E>`, whose `Err` propagates out of
/// [`App::handle`](crate::App::handle) as [`Error::Handler`].
pub trait Responder {
    fn respond(self) -> Result<Response, BoxError>;
}

impl<T: IntoResponse> Responder for T {
    fn respond(self) -> Result<Response, BoxError> {
        Ok(self.into_response())
    }
}

impl<T: IntoResponse, E: Into<BoxError>> Responder for Result<T, E> {
    fn respond(self) -> Result<Response, BoxError> {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid main handler.
///
/// You never implement this yourself. It is satisfied by any function or
/// closure with the shape:
///
/// ```text
/// async fn name(ctx: Context) -> impl Responder
/// ```
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid pre-handler.
///
/// Satisfied by any function or closure with the shape:
///
/// ```text
/// async fn name(ctx: Context) -> impl IntoFlow
/// ```
pub trait PreHandler: private::SealedPreHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_pre_handler(self) -> BoxedPreHandler;
}

mod private {
    pub trait SealedHandler {}
    pub trait SealedPreHandler {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::SealedHandler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, Fut> private::SealedPreHandler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoFlow,
{
}

impl<F, Fut> PreHandler for F
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoFlow,
{
    fn into_boxed_pre_handler(self) -> BoxedPreHandler {
        Arc::new(FnPreHandler(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: Responder,
{
    fn call(&self, ctx: Context) -> BoxFuture<Result<Response, Error>> {
        let fut = (self.0)(ctx);
        Box::pin(async move { fut.await.respond().map_err(Error::Handler) })
    }
}

struct FnPreHandler<F>(F);

impl<F, Fut> ErasedPreHandler for FnPreHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync,
    Fut: Future + Send + 'static,
    Fut::Output: IntoFlow,
{
    fn call(&self, ctx: Context) -> BoxFuture<Result<Flow, Error>> {
        let fut = (self.0)(ctx);
        Box::pin(async move { fut.await.into_flow().map_err(Error::Handler) })
    }
}
