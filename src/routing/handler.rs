//! Route handler contract.
//!
//! A handler receives the request envelope plus the wildcard captures of the
//! pattern it matched, and resolves to a [`Reply`] or an error. Any async
//! closure with that shape is a handler.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::http::{Reply, Request};

/// Error a handler may fail with. Any error type converts into it with `?`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Future returned by a handler invocation.
pub type HandlerFuture = BoxFuture<'static, Result<Reply, HandlerError>>;

/// Something that can serve a matched request.
pub trait RouteHandler: Send + Sync {
    /// Serve one request. Called at most once per matched request.
    fn call(&self, request: Request, wildcards: Vec<String>) -> HandlerFuture;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(Request, Vec<String>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    fn call(&self, request: Request, wildcards: Vec<String>) -> HandlerFuture {
        Box::pin((self)(request, wildcards))
    }
}

/// Shared handler reference stored in route entries.
pub type SharedHandler = Arc<dyn RouteHandler>;
