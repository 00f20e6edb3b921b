//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     Discovery (controllers / manifest)
//!     → discovery.rs (ordered bindings, per-unit failures)
//!     → router.rs (compile via matcher.rs, skip bad bindings)
//!     → Freeze as immutable RouteRegistry
//!
//! Incoming Request (method, raw path)
//!     → router.rs (strip query, scan in registration order)
//!     → matcher.rs (segment compare, capture wildcards)
//!     → Return: RouteMatch or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod discovery;
pub mod handler;
pub mod matcher;
pub mod router;

pub use discovery::{
    Controller, ControllerSet, DeclareError, Discovery, DiscoveryError, RouteBinding, RouteManifest,
};
pub use handler::{HandlerError, HandlerFuture, RouteHandler, SharedHandler};
pub use matcher::{PatternError, RoutePattern, Segment, WILDCARD};
pub use router::{RouteEntry, RouteMatch, RouteRegistry};
