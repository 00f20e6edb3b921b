//! Request dispatcher.
//!
//! # Responsibilities
//! - Run the accept loop on the shared listener
//! - Spawn one independent task per accepted connection
//! - Normalize each request into a [`Request`] envelope
//! - Look up the route, invoke the handler, write the reply
//! - Substitute the default not-found reply when nothing answered
//!
//! # Design Decisions
//! - The accept loop does no request work; it never waits on a handler
//! - Handler errors and panics are logged and answered like an unmatched
//!   request (status 200 not-found body)
//! - One request per connection; the connection is closed after the reply
//! - Shutdown stops accepting; in-flight tasks are never cancelled

use std::convert::Infallible;
use std::net::SocketAddr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderValue, Response};
use futures_util::FutureExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::request::Request;
use crate::http::response::Reply;
use crate::lifecycle::ShutdownSignal;
use crate::net::{ConnectionGuard, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{HandlerError, RouteRegistry, SharedHandler};

const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Everything the dispatcher needs, built once at startup.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<RouteRegistry>,
}

impl ServerContext {
    pub fn new(config: ServerConfig, registry: RouteRegistry) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
        }
    }
}

/// Errors that stop the dispatcher.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server header {0:?} is not a valid HTTP header value")]
    InvalidServerHeader(String),
}

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A handler produced the reply.
    Matched,
    /// No route matched.
    NotFound,
    /// A handler failed or panicked.
    HandlerFailed,
    /// The request body could not be read.
    BodyRejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::NotFound => "not_found",
            Outcome::HandlerFailed => "handler_failed",
            Outcome::BodyRejected => "body_rejected",
        }
    }
}

/// Reason a matched handler did not produce a reply.
#[derive(Debug, Error)]
pub enum HandlerFailure {
    #[error("handler returned an error: {0}")]
    Error(HandlerError),

    #[error("handler panicked: {0}")]
    Panic(String),
}

/// Per-request state shared by every connection task.
struct RequestContext {
    registry: Arc<RouteRegistry>,
    server_header: HeaderValue,
    max_body_bytes: usize,
}

/// Accepts connections and dispatches each request to its route.
pub struct Dispatcher {
    context: Arc<RequestContext>,
    drain_timeout: Option<Duration>,
    tracker: ConnectionTracker,
}

impl Dispatcher {
    /// Create a dispatcher from the startup context.
    pub fn new(context: ServerContext) -> Result<Self, ServerError> {
        let header = &context.config.server.header;
        let server_header = HeaderValue::from_str(header)
            .map_err(|_| ServerError::InvalidServerHeader(header.clone()))?;

        metrics::record_routes_registered(context.registry.len());

        Ok(Self {
            context: Arc::new(RequestContext {
                registry: context.registry,
                server_header,
                max_body_bytes: context.config.listener.max_body_bytes,
            }),
            drain_timeout: context.config.server.drain_timeout_secs.map(Duration::from_secs),
            tracker: ConnectionTracker::new(),
        })
    }

    /// Tracker of in-flight connection tasks.
    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    /// Run the accept loop until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.context.registry.len(),
            "Dispatcher accepting connections"
        );

        let task_signal = shutdown.clone();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, remote)) => {
                            let guard = self.tracker.track();
                            tokio::spawn(serve_connection(
                                Arc::clone(&self.context),
                                stream,
                                remote,
                                guard,
                                task_signal.clone(),
                            ));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }

        drop(listener);
        tracing::info!(address = %addr, "Listener stopped");

        let in_flight = self.tracker.active_count();
        match self.drain_timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, self.tracker.wait_idle()).await.is_err() {
                    tracing::warn!(
                        in_flight = self.tracker.active_count(),
                        "Drain deadline reached, leaving requests running"
                    );
                }
            }
            None if in_flight > 0 => {
                tracing::info!(in_flight, "In-flight requests left to finish on their own");
            }
            None => {}
        }

        Ok(())
    }
}

async fn serve_connection(
    context: Arc<RequestContext>,
    stream: TcpStream,
    remote: SocketAddr,
    guard: ConnectionGuard,
    shutdown: ShutdownSignal,
) {
    if shutdown.is_triggered() {
        tracing::debug!(connection_id = %guard.id(), "Shutting down, dropping new connection");
        return;
    }

    let service = service_fn(move |request: hyper::Request<Incoming>| {
        let context = Arc::clone(&context);
        async move { Ok::<_, Infallible>(context.dispatch(request, remote).await) }
    });

    if let Err(e) = http1::Builder::new()
        .keep_alive(false)
        .serve_connection(TokioIo::new(stream), service)
        .await
    {
        tracing::warn!(
            connection_id = %guard.id(),
            peer_addr = %remote,
            error = %e,
            "Connection failed while serving request"
        );
    }
}

impl RequestContext {
    async fn dispatch(
        &self,
        request: hyper::Request<Incoming>,
        remote: SocketAddr,
    ) -> Response<Body> {
        let start = Instant::now();
        let (parts, body) = request.into_parts();
        let method = parts.method.as_str().to_string();
        let raw_path = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());

        let envelope = Request::new(method.clone(), raw_path, remote).with_headers(parts.headers);
        let span = tracing::info_span!(
            "request",
            request_id = %envelope.id(),
            method = %method,
            path = %envelope.raw_path(),
            remote = %remote,
        );

        async move {
            let read = axum::body::to_bytes(Body::new(body), self.max_body_bytes).await;
            let (reply, outcome) = match read {
                Ok(bytes) => self.route(envelope.with_body(bytes)).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read request body");
                    (Reply::not_found(), Outcome::BodyRejected)
                }
            };

            let status = reply.status_code;
            let response = reply.into_response(&self.server_header);
            metrics::record_request(&method, outcome.as_str(), status, start);
            tracing::info!(
                status,
                outcome = outcome.as_str(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request served"
            );
            response
        }
        .instrument(span)
        .await
    }

    /// Match and invoke; the default reply covers every failure.
    async fn route(&self, request: Request) -> (Reply, Outcome) {
        let Some(hit) = self.registry.match_route(request.method(), request.raw_path()) else {
            tracing::debug!("No route matched");
            return (Reply::not_found(), Outcome::NotFound);
        };

        let route = hit.entry.to_string();
        let handler = Arc::clone(hit.entry.handler());
        match invoke(handler, request, hit.wildcards).await {
            Ok(reply) => (reply, Outcome::Matched),
            Err(failure) => {
                tracing::error!(route = %route, error = %failure, "Handler failed");
                (Reply::not_found(), Outcome::HandlerFailed)
            }
        }
    }
}

/// Call a handler, turning errors and panics into [`HandlerFailure`].
pub async fn invoke(
    handler: SharedHandler,
    request: Request,
    wildcards: Vec<String>,
) -> Result<Reply, HandlerFailure> {
    let future = catch_unwind(AssertUnwindSafe(|| handler.call(request, wildcards)))
        .map_err(|panic| HandlerFailure::Panic(panic_message(panic.as_ref())))?;

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(reply)) => Ok(reply),
        Ok(Err(e)) => Err(HandlerFailure::Error(e)),
        Err(panic) => Err(HandlerFailure::Panic(panic_message(panic.as_ref()))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
