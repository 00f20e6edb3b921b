//! Route dispatch server library.
//!
//! # Architecture Overview
//!
//! ```text
//!  startup:  Discovery (controllers / manifest) ──▶ RouteRegistry (immutable, Arc)
//!
//!  serving:  Listener ──accept──▶ task per connection
//!                                   │
//!                                   ├─▶ Request envelope
//!                                   ├─▶ RouteRegistry::match_route
//!                                   ├─▶ handler(request, wildcards) ──▶ Reply
//!                                   │        (error / panic / no match ──▶ not-found reply)
//!                                   └─▶ HTTP/1.1 response, connection closed
//! ```

pub mod config;
pub mod controllers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use config::schema::ServerConfig;
pub use http::{Dispatcher, Reply, Request, ServerContext};
pub use lifecycle::Shutdown;
pub use routing::{Controller, ControllerSet, RouteBinding, RouteManifest, RouteRegistry};
