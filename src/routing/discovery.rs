//! Route discovery.
//!
//! # Responsibilities
//! - Produce the ordered list of (method, pattern, handler) bindings at startup
//! - Let handling code declare its own routes ([`Controller`])
//! - Offer an explicit ordered list for small setups ([`RouteManifest`])
//!
//! # Design Decisions
//! - Order is deterministic: controllers are stable-sorted by name, each
//!   keeping its declaration order; manifests keep call order
//! - A unit that fails (error or panic) yields one `Err` and the rest continue
//! - Discovery never compiles patterns; the registry does

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use thiserror::Error;

use crate::routing::handler::{RouteHandler, SharedHandler};
use crate::routing::matcher::PatternError;

/// Error a controller may return while declaring routes.
pub type DeclareError = Box<dyn std::error::Error + Send + Sync>;

/// One discovered binding, not yet compiled.
#[derive(Clone)]
pub struct RouteBinding {
    /// HTTP verb, matched exactly.
    pub method: String,
    /// Pattern string, e.g. `/api/v1/user/%`.
    pub pattern: String,
    pub handler: SharedHandler,
    /// Where the binding came from, for logs.
    pub origin: String,
}

impl RouteBinding {
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler: impl RouteHandler + 'static,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler: Arc::new(handler),
            origin: String::new(),
        }
    }

    pub fn get(pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new("GET", pattern, handler)
    }

    pub fn post(pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new("POST", pattern, handler)
    }

    pub fn put(pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new("PUT", pattern, handler)
    }

    pub fn delete(pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new("DELETE", pattern, handler)
    }

    pub fn patch(pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::new("PATCH", pattern, handler)
    }

    fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_string();
        self
    }
}

impl fmt::Debug for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteBinding")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Failure to discover or compile a single route source.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("controller {controller} failed to declare routes: {reason}")]
    Controller { controller: String, reason: String },

    #[error("route {method} {pattern:?} from {origin} is invalid: {error}")]
    Pattern {
        origin: String,
        method: String,
        pattern: String,
        #[source]
        error: PatternError,
    },

    #[error("route {pattern:?} from {origin} has an invalid method {method:?}")]
    Method {
        origin: String,
        method: String,
        pattern: String,
    },
}

/// Source of route bindings consulted once when the registry is built.
pub trait Discovery {
    fn discover(&self) -> Vec<Result<RouteBinding, DiscoveryError>>;
}

/// A unit of handling code that declares the routes it serves.
pub trait Controller: Send + Sync {
    /// Stable name; controllers are ordered by it.
    fn name(&self) -> &str;

    /// The routes this controller serves, in match order.
    fn routes(&self) -> Result<Vec<RouteBinding>, DeclareError>;
}

/// Discovery over a set of controllers.
#[derive(Default)]
pub struct ControllerSet {
    controllers: Vec<Box<dyn Controller>>,
}

impl ControllerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a controller. Insertion order only breaks ties between equal names.
    pub fn with(mut self, controller: impl Controller + 'static) -> Self {
        self.controllers.push(Box::new(controller));
        self
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

impl Discovery for ControllerSet {
    fn discover(&self) -> Vec<Result<RouteBinding, DiscoveryError>> {
        let mut ordered: Vec<&dyn Controller> =
            self.controllers.iter().map(|c| c.as_ref()).collect();
        ordered.sort_by(|a, b| a.name().cmp(b.name()));

        let mut found = Vec::new();
        for controller in ordered {
            let name = controller.name();
            match catch_unwind(AssertUnwindSafe(|| controller.routes())) {
                Ok(Ok(bindings)) => {
                    found.extend(bindings.into_iter().map(|b| Ok(b.with_origin(name))));
                }
                Ok(Err(e)) => found.push(Err(DiscoveryError::Controller {
                    controller: name.to_string(),
                    reason: e.to_string(),
                })),
                Err(_) => found.push(Err(DiscoveryError::Controller {
                    controller: name.to_string(),
                    reason: "panicked while declaring routes".to_string(),
                })),
            }
        }
        found
    }
}

/// An explicit, ordered route list.
#[derive(Debug, Clone, Default)]
pub struct RouteManifest {
    bindings: Vec<RouteBinding>,
}

impl RouteManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(
        mut self,
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler: impl RouteHandler + 'static,
    ) -> Self {
        self.bindings.push(RouteBinding::new(method, pattern, handler));
        self
    }

    pub fn get(self, pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.route("GET", pattern, handler)
    }

    pub fn post(self, pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.route("POST", pattern, handler)
    }

    pub fn put(self, pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.route("PUT", pattern, handler)
    }

    pub fn delete(self, pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.route("DELETE", pattern, handler)
    }

    pub fn patch(self, pattern: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        self.route("PATCH", pattern, handler)
    }
}

impl Discovery for RouteManifest {
    fn discover(&self) -> Vec<Result<RouteBinding, DiscoveryError>> {
        self.bindings
            .iter()
            .cloned()
            .map(|b| Ok(b.with_origin("manifest")))
            .collect()
    }
}
