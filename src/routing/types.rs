//! Route descriptor types and error definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Path of the catch-all route.
pub const CATCH_ALL: &str = "*";

/// Opaque identifier linking a route to a lazily loaded component.
///
/// Keys are short content-derived hashes in practice, but nothing here
/// interprets them. The only rule is that a key is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentKey(Arc<str>);

/// A component key was empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("component key must not be empty")]
pub struct EmptyKeyError;

impl ComponentKey {
    /// Create a key, rejecting the empty string.
    pub fn new(key: impl AsRef<str>) -> Result<Self, EmptyKeyError> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(EmptyKeyError);
        }
        Ok(Self(Arc::from(key)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ComponentKey {
    type Err = EmptyKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ComponentKey {
    type Error = EmptyKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ComponentKey> for String {
    fn from(key: ComponentKey) -> Self {
        key.0.to_string()
    }
}

/// One page as produced by content discovery.
///
/// Keys stay as raw strings here so that a descriptor list can be written by
/// hand or deserialized from a manifest; the builder validates them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PageDescriptor {
    /// Absolute path pattern (`/guides/setup`, `/blog/:slug`) or `*`.
    pub path: String,

    /// Component key for the page.
    pub key: String,

    /// Sidebar this page is listed under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<String>,

    /// Match only the full path; never adopt nested routes.
    #[serde(default)]
    pub exact: bool,
}

impl PageDescriptor {
    /// Create a non-exact descriptor with no sidebar.
    pub fn new(path: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            sidebar: None,
            exact: false,
        }
    }

    /// Create the catch-all descriptor.
    pub fn catch_all(key: impl Into<String>) -> Self {
        Self::new(CATCH_ALL, key)
    }

    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    pub fn with_sidebar(mut self, sidebar: impl Into<String>) -> Self {
        self.sidebar = Some(sidebar.into());
        self
    }

    pub fn is_catch_all(&self) -> bool {
        self.path == CATCH_ALL
    }
}

/// Errors raised while assembling a route tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Two descriptors resolve to the same path.
    #[error("duplicate route {path}: claimed by components {first} and {second}")]
    DuplicateRoute {
        path: String,
        first: String,
        second: String,
    },

    /// Path is empty, relative, or has a malformed segment.
    #[error("invalid route path {path:?} (component {key}): {reason}")]
    InvalidPath {
        path: String,
        key: String,
        reason: String,
    },

    /// Descriptor has no component key.
    #[error("route {path} has an empty component key")]
    EmptyKey { path: String },
}

/// Errors raised while resolving a request path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Nothing matched and the tree has no catch-all.
    #[error("no route matches {path}")]
    NoRoute { path: String },
}

/// Result type for tree construction.
pub type BuildResult<T> = Result<T, BuildError>;
