//! Site manifest subsystem.
//!
//! # Data Flow
//! ```text
//! site manifest (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → lifecycle::startup builds the registry and the first route tree
//!
//! On change:
//!     watcher.rs detects a write to the manifest
//!     → loader.rs loads new manifest
//!     → validation.rs validates
//!     → Router::rebuild swaps the route tree atomically
//! ```
//!
//! # Design Decisions
//! - A manifest is immutable once loaded; changes require a full reload
//! - All sections have defaults to allow minimal manifests
//! - Validation separates syntactic (serde) from semantic checks
//! - Component loaders are fixed at startup; a reload can only rearrange
//!   routes over components that were already declared

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ComponentConfig, ObservabilityConfig, SiteConfig, SiteSection, WatchConfig};
pub use validation::{validate_config, ValidationError};
