//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Tree Construction (at startup or on content change):
//!     PageDescriptor[]
//!     → builder.rs (validate, nest by path prefix, hoist catch-all)
//!     → tree.rs (immutable arena of RouteNodes)
//!     → router.rs (atomic swap into the live Router)
//!
//! Navigation:
//!     request path
//!     → matcher.rs (split into segments, match patterns)
//!     → router.rs (walk tree, most specific match or catch-all)
//!     → registry materializes the matched component
//! ```
//!
//! # Design Decisions
//! - Trees are compiled once, immutable at runtime
//! - No regex in the hot path (segment matching only)
//! - Deterministic: same tree and path always give the same match
//! - Sidebar data rides along on nodes but never affects matching

pub mod builder;
pub mod matcher;
pub mod router;
pub mod sidebar;
pub mod tree;
pub mod types;

pub use builder::build;
pub use router::{resolve, Navigation, RouteMatch, Router, RouterError};
pub use tree::{NodeId, RouteNode, RouteTree};
pub use types::{BuildError, ComponentKey, PageDescriptor, ResolveError};
