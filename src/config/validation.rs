//! Site manifest validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (routes reference declared components)
//! - Detect duplicate routes and conflicting component declarations
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before a manifest is accepted into the system

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::SiteConfig;
use crate::routing::matcher::PathPattern;
use crate::routing::types::CATCH_ALL;

/// A semantic problem in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route {path:?}: {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("route {path} is declared more than once")]
    DuplicateRoute { path: String },

    #[error("route {path} uses undeclared component {key}")]
    UndeclaredComponent { path: String, key: String },

    #[error("component declared with an empty key (file {})", .file.display())]
    EmptyComponentKey { file: PathBuf },

    #[error("component {key} is declared with two sources: {} and {}", .first.display(), .second.display())]
    ConflictingComponent {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),
}

/// Validate a parsed manifest.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // 1. Components: non-empty keys, one source per key
    let mut sources: HashMap<&str, &PathBuf> = HashMap::new();
    for component in &config.components {
        if component.key.is_empty() {
            errors.push(ValidationError::EmptyComponentKey {
                file: component.source.clone(),
            });
            continue;
        }
        match sources.entry(&component.key) {
            Entry::Occupied(first) if *first.get() != &component.source => {
                errors.push(ValidationError::ConflictingComponent {
                    key: component.key.clone(),
                    first: first.get().to_path_buf(),
                    second: component.source.clone(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(&component.source);
            }
        }
    }

    // 2. Routes: well-formed, unique, backed by a component
    let mut seen_paths = HashSet::new();
    let mut referenced = HashSet::new();
    for route in &config.routes {
        let normalized = if route.is_catch_all() {
            CATCH_ALL.to_string()
        } else {
            match PathPattern::parse(&route.path) {
                Ok(pattern) => format!("/{}", pattern),
                Err(e) => {
                    errors.push(ValidationError::InvalidRoute {
                        path: route.path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            }
        };

        if !seen_paths.insert(normalized.clone()) {
            errors.push(ValidationError::DuplicateRoute { path: normalized });
        }

        if route.key.is_empty() {
            errors.push(ValidationError::InvalidRoute {
                path: route.path.clone(),
                reason: "empty component key".to_string(),
            });
        } else if !sources.contains_key(route.key.as_str()) {
            errors.push(ValidationError::UndeclaredComponent {
                path: route.path.clone(),
                key: route.key.clone(),
            });
        } else {
            referenced.insert(route.key.as_str());
        }
    }

    // 3. Observability
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for key in sources.keys().filter(|key| !referenced.contains(*key)) {
        tracing::warn!(key = %key, "Component is declared but no route uses it");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
