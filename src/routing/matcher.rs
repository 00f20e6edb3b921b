//! Path pattern compilation and matching.
//!
//! # Responsibilities
//! - Split a pattern string on `/` into literal and wildcard segments
//! - Match a query-free request path against a compiled pattern
//! - Capture wildcard segments in path order
//!
//! # Design Decisions
//! - `%` as a whole segment is a positional wildcard
//! - The request path is lower-cased before comparison; pattern literals are
//!   kept verbatim, so a literal with upper-case letters never matches
//! - Segment counts must be equal (no prefix or partial matches)
//! - No regex, O(segments) per pattern

use std::fmt;

use thiserror::Error;

/// Segment token that captures any single path segment.
pub const WILDCARD: &str = "%";

/// One compiled path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Wildcard,
}

/// Reasons a pattern string cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,

    #[error("pattern {0:?} contains a query string")]
    QueryString(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    /// Compile a pattern such as `/api/v1/domain/%`.
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }
        if source.contains('?') {
            return Err(PatternError::QueryString(source.to_string()));
        }

        let segments = source
            .split('/')
            .map(|segment| {
                if segment == WILDCARD {
                    Segment::Wildcard
                } else {
                    Segment::Literal(segment.to_string())
                }
            })
            .collect();

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The pattern string as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of wildcard captures a match produces.
    pub fn wildcard_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Wildcard))
            .count()
    }

    /// Match a path that has already had its query string removed.
    ///
    /// Returns the wildcard captures, in order, on success. Captures keep the
    /// request's original casing.
    pub fn captures(&self, path: &str) -> Option<Vec<String>> {
        let lowered = path.to_lowercase();
        if lowered.split('/').count() != self.segments.len() {
            return None;
        }

        let mut values = Vec::new();
        for ((pattern, lower), original) in self
            .segments
            .iter()
            .zip(lowered.split('/'))
            .zip(path.split('/'))
        {
            match pattern {
                Segment::Wildcard => values.push(original.to_string()),
                Segment::Literal(literal) if literal == lower => {}
                Segment::Literal(_) => return None,
            }
        }
        Some(values)
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
