//! Registry error definitions.

use std::sync::Arc;
use thiserror::Error;

use crate::routing::types::ComponentKey;

/// A loader failed to produce its component.
///
/// Cheap to clone: every caller coalesced onto a failed load receives a copy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LoadError {
    message: Arc<str>,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Arc::from(message.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Errors that can occur while registering or materializing components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The key already has a different loader.
    #[error("component key {key} is already registered with a different loader")]
    DuplicateKey { key: ComponentKey },

    /// No loader was registered for the key.
    #[error("no loader registered for component key {0}")]
    UnknownKey(ComponentKey),

    /// A route tree references keys the registry cannot load.
    #[error("route tree references unregistered component keys: {}", join_keys(.keys))]
    MissingLoaders { keys: Vec<ComponentKey> },

    /// The loader rejected. Not cached; the next call retries.
    #[error("failed to load component {key}: {source}")]
    ComponentLoad { key: ComponentKey, source: LoadError },
}

fn join_keys(keys: &[ComponentKey]) -> String {
    keys.iter()
        .map(ComponentKey::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
