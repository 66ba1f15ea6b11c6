//! Route resolution for generated documentation sites.
//!
//! Builds an immutable route tree from page descriptors, resolves request
//! paths against it, and lazily materializes the matched page components.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod registry;
pub mod routing;

pub use config::schema::SiteConfig;
pub use lifecycle::Shutdown;
pub use registry::{ComponentRegistry, RegistryBuilder};
pub use routing::{build, resolve, PageDescriptor, RouteTree, Router};
