//! Component registry subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     (key, loader)[]
//!     → builder.rs (reject conflicting loaders)
//!     → ComponentRegistry (frozen)
//!
//! Navigation:
//!     matched component key
//!     → cache.rs (ready? pending? absent?)
//!     → loader.rs (deferred factory, at most one in-flight per key)
//!     → component shared by every waiting caller
//! ```
//!
//! # Design Decisions
//! - Loaders are fixed after startup; only the component cache changes
//! - Failed loads are retried on the next request, never cached

pub mod builder;
pub mod cache;
pub mod loader;
pub mod types;

pub use builder::RegistryBuilder;
pub use cache::{ComponentRegistry, Materialize};
pub use loader::{loader_fn, ComponentLoader, FileLoader, FnLoader, LoadFuture, PageSource};
pub use types::{LoadError, RegistryError, RegistryResult};
