//! Component loaders.
//!
//! # Responsibilities
//! - Define the deferred factory contract used by the registry
//! - Adapt async closures into loaders
//! - Load page sources from disk
//!
//! # Design Decisions
//! - A loader returns a fresh `'static` future per call; the registry decides
//!   when to call it and caches the result
//! - Loader identity is the `Arc` allocation, so registering the same `Arc`
//!   twice is a no-op

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::registry::types::LoadError;
use crate::routing::types::ComponentKey;

/// Future returned by a loader.
pub type LoadFuture<C> = BoxFuture<'static, Result<C, LoadError>>;

/// Deferred factory producing the component for a key.
pub trait ComponentLoader<C>: Send + Sync {
    /// Start loading. Called at most once per successful load.
    fn load(&self, key: &ComponentKey) -> LoadFuture<C>;
}

/// Loader backed by an async closure.
pub struct FnLoader<F> {
    f: F,
}

impl<C, F, Fut> ComponentLoader<C> for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<C, LoadError>> + Send + 'static,
{
    fn load(&self, _key: &ComponentKey) -> LoadFuture<C> {
        (self.f)().boxed()
    }
}

/// Wrap an async closure as a shareable loader.
pub fn loader_fn<C, F, Fut>(f: F) -> Arc<dyn ComponentLoader<C>>
where
    C: 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<C, LoadError>> + Send + 'static,
{
    Arc::new(FnLoader { f })
}

/// A page source read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSource {
    pub key: ComponentKey,
    pub path: PathBuf,
    pub body: Arc<str>,
}

/// Reads a page source file when its route is first visited.
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ComponentLoader<PageSource> for FileLoader {
    fn load(&self, key: &ComponentKey) -> LoadFuture<PageSource> {
        let path = self.path.clone();
        let key = key.clone();
        async move {
            let body = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| LoadError::new(format!("{}: {}", path.display(), e)))?;
            tracing::debug!(key = %key, path = %path.display(), bytes = body.len(), "Page source loaded");
            Ok(PageSource {
                key,
                path,
                body: Arc::from(body),
            })
        }
        .boxed()
    }
}
