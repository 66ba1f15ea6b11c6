//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load manifest → Register loaders → Build tree → Router
//!
//! Reload (reload.rs):
//!     Validated manifest from watcher → Rebuild tree → Atomic swap
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     Ctrl-C → Broadcast → Long-running tasks exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: manifest first, then registry, then tree
//! - A failed reload keeps serving the previous tree

pub mod reload;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
