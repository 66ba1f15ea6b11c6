//! Site manifest schema definitions.
//!
//! All types derive Serde traits for deserialization from the manifest.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::routing::types::PageDescriptor;

/// Root of the site manifest.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// General site settings.
    pub site: SiteSection,

    /// Page descriptors, in the order content discovery produced them.
    pub routes: Vec<PageDescriptor>,

    /// Component sources keyed by component key.
    pub components: Vec<ComponentConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Manifest watching for `watch` mode.
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Where the source of `component` lives on disk.
    pub fn source_path(&self, component: &ComponentConfig) -> PathBuf {
        self.site.content_dir.join(&component.source)
    }
}

/// General site settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteSection {
    /// Site name, used in logs only.
    pub name: String,

    /// Directory component sources are read from.
    /// Relative paths are resolved against the manifest's directory.
    pub content_dir: PathBuf,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            name: "docs".to_string(),
            content_dir: PathBuf::from("."),
        }
    }
}

/// A loadable component.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ComponentConfig {
    /// Component key routes refer to.
    pub key: String,

    /// Source file, relative to `site.content_dir`.
    pub source: PathBuf,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Manifest watcher settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll interval for backends that poll, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
        }
    }
}
