//! Path pattern parsing and matching.
//!
//! # Responsibilities
//! - Parse route paths into literal and `:param` segments
//! - Split request paths into segments
//! - Match a pattern against a prefix of a request
//!
//! # Design Decisions
//! - Matching is segment based: `/api` is a prefix of `/api/models`, not of `/apiary`
//! - Empty segments are collapsed, so trailing slashes never matter
//! - Literal matching is case-sensitive
//! - No regex; a pattern matches in O(segments)

use std::fmt;
use thiserror::Error;

/// One segment of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches exactly this text.
    Static(String),
    /// Matches any single segment and captures it under this name.
    Param(String),
}

impl Segment {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Segment::Static(text) => text == candidate,
            Segment::Param(_) => true,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Static(text) => f.write_str(text),
            Segment::Param(name) => write!(f, ":{}", name),
        }
    }
}

/// Why a path could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("path is empty")]
    Empty,
    #[error("path must start with '/'")]
    NotAbsolute,
    #[error("'*' is only allowed as the whole catch-all path")]
    Wildcard,
    #[error("parameter segment has no name")]
    UnnamedParam,
    #[error("'?' and '#' start a query or fragment and cannot appear in a route")]
    QueryOrFragment,
}

/// A parsed path pattern.
///
/// The root path `/` parses to an empty pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathPattern {
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Parse an absolute route path.
    pub fn parse(path: &str) -> Result<Self, PatternError> {
        if path.is_empty() {
            return Err(PatternError::Empty);
        }
        if !path.starts_with('/') {
            return Err(PatternError::NotAbsolute);
        }
        if path.contains(['?', '#']) {
            return Err(PatternError::QueryOrFragment);
        }

        let mut segments = Vec::new();
        for raw in path.split('/').filter(|s| !s.is_empty()) {
            if raw.contains('*') {
                return Err(PatternError::Wildcard);
            }
            let segment = match raw.strip_prefix(':') {
                Some("") => return Err(PatternError::UnnamedParam),
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Static(raw.to_string()),
            };
            segments.push(segment);
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of literal segments, used to rank otherwise equal candidates.
    pub fn literal_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Static(_)))
            .count()
    }

    /// True if `self` is a strict, textual segment prefix of `other`.
    pub fn is_strict_prefix_of(&self, other: &PathPattern) -> bool {
        self.len() < other.len() && other.segments.starts_with(&self.segments)
    }

    /// The pattern left after dropping the first `n` segments.
    pub fn suffix(&self, n: usize) -> PathPattern {
        PathPattern {
            segments: self.segments.iter().skip(n).cloned().collect(),
        }
    }

    /// Try to match this pattern against the start of `request`.
    ///
    /// Returns `None` if the request is shorter than the pattern or any
    /// segment differs.
    pub fn match_prefix<'r>(&self, request: &[&'r str]) -> Option<PrefixMatch<'r>> {
        if request.len() < self.segments.len() {
            return None;
        }

        let mut captures = Vec::new();
        for (segment, candidate) in self.segments.iter().zip(request) {
            if !segment.matches(candidate) {
                return None;
            }
            if let Segment::Param(name) = segment {
                captures.push((name.clone(), *candidate));
            }
        }

        Some(PrefixMatch {
            consumed: self.segments.len(),
            captures,
        })
    }
}

impl fmt::Display for PathPattern {
    /// Renders the pattern without a leading slash (`api/:id`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Outcome of matching a pattern against a request prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixMatch<'r> {
    /// Number of request segments the pattern covered.
    pub consumed: usize,
    /// Captured parameters in pattern order.
    pub captures: Vec<(String, &'r str)>,
}

/// Split a request path into its segments.
///
/// Query strings and fragments are dropped and empty segments collapsed.
pub fn split_request_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}
