//! Route registry and lookup.
//!
//! # Responsibilities
//! - Compile discovered bindings into route entries
//! - Look up the matching entry for a method and raw path
//! - Return the entry with its wildcard captures, or an explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(routes × segments) linear scan; first registered entry wins
//! - Method compared exactly, case-sensitive
//! - Bad bindings are logged and skipped, never fatal

use std::fmt;

use axum::http::Method;

use crate::http::request::strip_query;
use crate::routing::discovery::{Discovery, DiscoveryError, RouteBinding};
use crate::routing::handler::SharedHandler;
use crate::routing::matcher::RoutePattern;

/// One compiled method + pattern + handler binding.
pub struct RouteEntry {
    method: String,
    pattern: RoutePattern,
    handler: SharedHandler,
    origin: String,
}

impl RouteEntry {
    /// Compile a binding. The method must be a valid HTTP token.
    pub fn compile(binding: RouteBinding) -> Result<Self, DiscoveryError> {
        if Method::from_bytes(binding.method.as_bytes()).is_err() {
            return Err(DiscoveryError::Method {
                origin: binding.origin,
                method: binding.method,
                pattern: binding.pattern,
            });
        }

        let pattern = match RoutePattern::parse(&binding.pattern) {
            Ok(p) => p,
            Err(error) => {
                return Err(DiscoveryError::Pattern {
                    origin: binding.origin,
                    method: binding.method,
                    pattern: binding.pattern,
                    error,
                })
            }
        };

        Ok(Self {
            method: binding.method,
            pattern,
            handler: binding.handler,
            origin: binding.origin,
        })
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }

    /// Discovery unit the entry came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// A successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    /// Wildcard captures in path order.
    pub wildcards: Vec<String>,
}

/// The immutable route table.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    entries: Vec<RouteEntry>,
}

impl RouteRegistry {
    /// Build from already compiled entries, keeping their order.
    pub fn new(entries: Vec<RouteEntry>) -> Self {
        Self { entries }
    }

    /// Build from a discovery provider, logging and skipping failures.
    pub fn discover<D: Discovery + ?Sized>(discovery: &D) -> Self {
        let mut entries = Vec::new();

        for found in discovery.discover() {
            match found.and_then(RouteEntry::compile) {
                Ok(entry) => {
                    tracing::info!(
                        method = %entry.method,
                        pattern = %entry.pattern,
                        origin = %entry.origin,
                        "Route discovered"
                    );
                    entries.push(entry);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Skipping route");
                }
            }
        }

        if entries.is_empty() {
            tracing::warn!("No routes registered; every request will fall through to not-found");
        }

        Self { entries }
    }

    /// Find the first entry matching `method` and `raw_path`.
    ///
    /// Any query string is ignored. Literal segments compare against the
    /// lower-cased request path; wildcard segments are captured.
    pub fn match_route(&self, method: &str, raw_path: &str) -> Option<RouteMatch<'_>> {
        let path = strip_query(raw_path);

        self.entries
            .iter()
            .filter(|entry| entry.method == method)
            .find_map(|entry| {
                entry
                    .pattern
                    .captures(path)
                    .map(|wildcards| RouteMatch { entry, wildcards })
            })
    }

    /// Entries in match order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Reply, Request};
    use crate::routing::discovery::RouteManifest;
    use crate::routing::handler::HandlerError;

    async fn first(_req: Request, _wild: Vec<String>) -> Result<Reply, HandlerError> {
        Ok(Reply::json(200, "first"))
    }

    async fn second(_req: Request, _wild: Vec<String>) -> Result<Reply, HandlerError> {
        Ok(Reply::json(200, "second"))
    }

    fn registry(manifest: RouteManifest) -> RouteRegistry {
        RouteRegistry::discover(&manifest)
    }

    #[test]
    fn matches_wildcard_and_strips_query() {
        let reg = registry(RouteManifest::new().get("/api/v1/domain/%", first));

        let hit = reg.match_route("GET", "/api/v1/domain/abc123?x=1").unwrap();
        assert_eq!(hit.entry.pattern().as_str(), "/api/v1/domain/%");
        assert_eq!(hit.wildcards, vec!["abc123"]);
    }

    #[test]
    fn query_string_does_not_change_result() {
        let reg = registry(RouteManifest::new().get("/api/v1/user", first));
        assert!(reg.match_route("GET", "/api/v1/user").is_some());
        assert!(reg.match_route("GET", "/api/v1/user?x=1").is_some());
        assert!(reg.match_route("GET", "/api/v1/user?").is_some());
    }

    #[test]
    fn first_registered_wins() {
        let reg = registry(
            RouteManifest::new()
                .get("/api/v1/user", first)
                .get("/api/v1/%", second),
        );

        let hit = reg.match_route("GET", "/api/v1/user").unwrap();
        assert_eq!(hit.entry.pattern().as_str(), "/api/v1/user");
        assert!(hit.wildcards.is_empty());

        let other = reg.match_route("GET", "/api/v1/account").unwrap();
        assert_eq!(other.entry.pattern().as_str(), "/api/v1/%");
        assert_eq!(other.wildcards, vec!["account"]);
    }

    #[test]
    fn wildcard_first_shadows_later_literal() {
        let reg = registry(
            RouteManifest::new()
                .get("/api/v1/%", second)
                .get("/api/v1/user", first),
        );
        let hit = reg.match_route("GET", "/api/v1/user").unwrap();
        assert_eq!(hit.entry.pattern().as_str(), "/api/v1/%");
    }

    #[test]
    fn method_is_exact_and_case_sensitive() {
        let reg = registry(RouteManifest::new().post("/api/v1/user", first));
        assert!(reg.match_route("POST", "/api/v1/user").is_some());
        assert!(reg.match_route("GET", "/api/v1/user").is_none());
        assert!(reg.match_route("post", "/api/v1/user").is_none());
    }

    #[test]
    fn method_selects_between_same_pattern() {
        let reg = registry(
            RouteManifest::new()
                .get("/api/v1/user/%", first)
                .delete("/api/v1/user/%", second),
        );
        let hit = reg.match_route("DELETE", "/api/v1/user/9").unwrap();
        assert_eq!(hit.entry.method(), "DELETE");
        assert_eq!(hit.wildcards, vec!["9"]);
    }

    #[test]
    fn no_prefix_matches() {
        let reg = registry(RouteManifest::new().get("/api", first));
        assert!(reg.match_route("GET", "/api/v1").is_none());
        assert!(reg.match_route("GET", "/").is_none());
    }

    #[test]
    fn invalid_bindings_are_skipped() {
        let reg = registry(
            RouteManifest::new()
                .route("", "/empty-method", first)
                .route("GE T", "/space", first)
                .get("", first)
                .get("/a?b", first)
                .get("/ok", second),
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.entries()[0].to_string(), "GET /ok");
    }

    #[test]
    fn empty_registry_matches_nothing() {
        let reg = registry(RouteManifest::new());
        assert!(reg.is_empty());
        assert!(reg.match_route("GET", "/").is_none());
    }

    #[test]
    fn compile_reports_pattern_error() {
        let err = RouteEntry::compile(RouteBinding::get("", first)).unwrap_err();
        assert!(matches!(err, DiscoveryError::Pattern { .. }));
    }
}
