//! Memoized, coalesced component materialization.
//!
//! # Responsibilities
//! - Map component keys to their loaders (frozen at startup)
//! - Cache loaded components for the life of the process
//! - Share one in-flight load between concurrent callers of the same key
//!
//! # Slot Lifecycle
//! ```text
//! absent → pending → ready
//!             │
//!             └── load failed → absent (next call retries)
//! ```
//!
//! # Design Decisions
//! - Loads run on a spawned task, so a caller that gives up does not cancel
//!   a load other callers are waiting on
//! - Per-key coordination uses the DashMap shard lock; there is no global lock
//! - Ready entries are never replaced or removed

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};

use crate::observability::metrics;
use crate::registry::loader::ComponentLoader;
use crate::registry::types::{LoadError, RegistryError, RegistryResult};
use crate::routing::tree::RouteTree;
use crate::routing::types::ComponentKey;

/// Future returned by [`ComponentRegistry::materialize`].
pub type Materialize<C> = BoxFuture<'static, Result<C, RegistryError>>;

type SharedLoad<C> = Shared<BoxFuture<'static, Result<C, LoadError>>>;

enum Slot<C> {
    Pending(SharedLoad<C>),
    Ready(C),
}

/// Process-wide key → component registry.
pub struct ComponentRegistry<C> {
    loaders: HashMap<ComponentKey, Arc<dyn ComponentLoader<C>>>,
    cache: Arc<DashMap<ComponentKey, Slot<C>>>,
}

impl<C> ComponentRegistry<C> {
    pub(crate) fn from_loaders(loaders: HashMap<ComponentKey, Arc<dyn ComponentLoader<C>>>) -> Self {
        Self {
            loaders,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Number of registered loaders.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.loaders.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<ComponentKey> {
        let mut keys: Vec<_> = self.loaders.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// True once the component for `key` has finished loading.
    pub fn is_loaded(&self, key: &ComponentKey) -> bool {
        self.cache
            .get(key)
            .map(|slot| matches!(slot.value(), Slot::Ready(_)))
            .unwrap_or(false)
    }

    /// Number of components loaded so far.
    pub fn loaded_count(&self) -> usize {
        self.cache
            .iter()
            .filter(|slot| matches!(slot.value(), Slot::Ready(_)))
            .count()
    }

    /// Check that every key referenced by `tree` has a loader.
    pub fn verify(&self, tree: &RouteTree) -> RegistryResult<()> {
        let missing: Vec<_> = tree
            .component_keys()
            .into_iter()
            .filter(|key| !self.loaders.contains_key(key))
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::MissingLoaders { keys: missing })
        }
    }
}

impl<C> ComponentRegistry<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Get the component for `key`, loading it on first use.
    ///
    /// Concurrent calls for a key that is still loading wait on the same load.
    /// The load itself is spawned on the Tokio runtime when first polled.
    pub fn materialize(&self, key: &ComponentKey) -> Materialize<C> {
        let Some(loader) = self.loaders.get(key) else {
            return future::ready(Err(RegistryError::UnknownKey(key.clone()))).boxed();
        };

        let inflight = match self.cache.entry(key.clone()) {
            Entry::Occupied(slot) => match slot.get() {
                Slot::Ready(component) => {
                    metrics::record_cache_hit();
                    return future::ready(Ok(component.clone())).boxed();
                }
                Slot::Pending(load) => {
                    metrics::record_coalesced_load();
                    tracing::trace!(key = %key, "Joining in-flight load");
                    load.clone()
                }
            },
            Entry::Vacant(slot) => {
                let load = self.start_load(key.clone(), Arc::clone(loader));
                slot.insert(Slot::Pending(load.clone()));
                load
            }
        };

        let key = key.clone();
        inflight
            .map(move |outcome| outcome.map_err(|source| RegistryError::ComponentLoad { key, source }))
            .boxed()
    }

    /// Wrap the load without starting it. The loader is called from the
    /// spawned task, after the shard lock taken by `materialize` is released.
    fn start_load(&self, key: ComponentKey, loader: Arc<dyn ComponentLoader<C>>) -> SharedLoad<C> {
        let cache = Arc::clone(&self.cache);

        async move {
            let task = {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                tokio::spawn(async move {
                    tracing::debug!(key = %key, "Loading component");
                    let outcome = loader.load(&key).await;
                    settle(&cache, &key, &outcome);
                    outcome
                })
            };

            match task.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    let err = LoadError::new(format!("loader task failed: {}", join_error));
                    settle(&cache, &key, &Err(err.clone()));
                    Err(err)
                }
            }
        }
        .boxed()
        .shared()
    }
}

fn settle<C: Clone>(
    cache: &DashMap<ComponentKey, Slot<C>>,
    key: &ComponentKey,
    outcome: &Result<C, LoadError>,
) {
    match outcome {
        Ok(component) => {
            cache.insert(key.clone(), Slot::Ready(component.clone()));
            metrics::record_component_load("ok");
            tracing::debug!(key = %key, "Component ready");
        }
        Err(err) => {
            cache.remove_if(key, |_, slot| matches!(slot, Slot::Pending(_)));
            metrics::record_component_load("error");
            tracing::warn!(key = %key, error = %err, "Component load failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::builder::RegistryBuilder;
    use crate::registry::loader::{loader_fn, LoadFuture};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::time::Duration;

    fn key(s: &str) -> ComponentKey {
        ComponentKey::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_materialize_memoizes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                key("d72"),
                loader_fn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, LoadError>("models page".to_string()) }
                }),
            )
            .unwrap();
        let registry = builder.finish();

        assert!(!registry.is_loaded(&key("d72")));
        assert_eq!(registry.materialize(&key("d72")).await.unwrap(), "models page");
        assert_eq!(registry.materialize(&key("d72")).await.unwrap(), "models page");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_loaded(&key("d72")));
        assert_eq!(registry.loaded_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let registry = RegistryBuilder::<String>::new().finish();
        let err = registry.materialize(&key("nope")).await.unwrap_err();
        assert_eq!(err, RegistryError::UnknownKey(key("nope")));
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut builder = RegistryBuilder::new();
        builder
            .register(
                key("flaky"),
                loader_fn(move || {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt == 0 {
                            Err(LoadError::new("network error"))
                        } else {
                            Ok(attempt)
                        }
                    }
                }),
            )
            .unwrap();
        let registry = builder.finish();

        let err = registry.materialize(&key("flaky")).await.unwrap_err();
        assert!(matches!(err, RegistryError::ComponentLoad { .. }));
        assert!(!registry.is_loaded(&key("flaky")));

        assert_eq!(registry.materialize(&key("flaky")).await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    /// Composes the page under `child` into a layout, asking the registry
    /// from inside `load`.
    struct LayoutLoader {
        registry: Arc<OnceLock<Weak<ComponentRegistry<String>>>>,
        child: ComponentKey,
    }

    impl ComponentLoader<String> for LayoutLoader {
        fn load(&self, key: &ComponentKey) -> LoadFuture<String> {
            let Some(registry) = self.registry.get().and_then(Weak::upgrade) else {
                return future::ready(Err(LoadError::new("registry dropped"))).boxed();
            };
            let self_loaded = registry.is_loaded(key);
            let child = registry.materialize(&self.child);
            async move {
                let child = child.await.map_err(|e| LoadError::new(e.to_string()))?;
                Ok(format!("layout(loaded={}, {})", self_loaded, child))
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_loader_may_use_registry() {
        let handle = Arc::new(OnceLock::new());
        let mut builder = RegistryBuilder::<String>::new();
        builder
            .register(
                key("c54"),
                Arc::new(LayoutLoader {
                    registry: Arc::clone(&handle),
                    child: key("e83"),
                }),
            )
            .unwrap()
            .register(key("e83"), loader_fn(|| async { Ok::<_, LoadError>("setup".to_string()) }))
            .unwrap();
        let registry = Arc::new(builder.finish());
        handle.set(Arc::downgrade(&registry)).unwrap();

        let layout = tokio::time::timeout(Duration::from_secs(2), registry.materialize(&key("c54")))
            .await
            .expect("materialize must not block on its own loader")
            .unwrap();
        assert_eq!(layout, "layout(loaded=false, setup)");
        assert!(registry.is_loaded(&key("e83")));
    }

    #[test]
    fn test_verify_reports_missing_keys() {
        let tree = crate::routing::builder::build(&[
            crate::routing::types::PageDescriptor::new("/a", "aaa"),
            crate::routing::types::PageDescriptor::new("/b", "bbb"),
        ])
        .unwrap();

        let mut builder = RegistryBuilder::new();
        builder
            .register(key("aaa"), loader_fn(|| async { Ok::<_, LoadError>(()) }))
            .unwrap();
        let registry = builder.finish();

        assert_eq!(
            registry.verify(&tree),
            Err(RegistryError::MissingLoaders { keys: vec![key("bbb")] })
        );
    }
}
