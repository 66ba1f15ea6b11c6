//! Startup-time registration of component loaders.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::registry::cache::ComponentRegistry;
use crate::registry::loader::ComponentLoader;
use crate::registry::types::{RegistryError, RegistryResult};
use crate::routing::types::ComponentKey;

/// Collects loaders before the registry is frozen.
pub struct RegistryBuilder<C> {
    loaders: HashMap<ComponentKey, Arc<dyn ComponentLoader<C>>>,
}

impl<C> RegistryBuilder<C> {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Register the loader for `key`.
    ///
    /// Registering the same loader again is allowed, since several routes may
    /// render the same content. A different loader for a known key is an error.
    pub fn register(
        &mut self,
        key: ComponentKey,
        loader: Arc<dyn ComponentLoader<C>>,
    ) -> RegistryResult<&mut Self> {
        match self.loaders.entry(key) {
            Entry::Occupied(existing) => {
                if !same_loader(existing.get(), &loader) {
                    return Err(RegistryError::DuplicateKey {
                        key: existing.key().clone(),
                    });
                }
                tracing::trace!(key = %existing.key(), "Loader already registered");
            }
            Entry::Vacant(slot) => {
                tracing::trace!(key = %slot.key(), "Registering loader");
                slot.insert(loader);
            }
        }
        Ok(self)
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.loaders.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }

    /// Freeze the registry. No loaders can be added afterwards.
    pub fn finish(self) -> ComponentRegistry<C> {
        tracing::debug!(loaders = self.loaders.len(), "Component registry frozen");
        ComponentRegistry::from_loaders(self.loaders)
    }
}

impl<C> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

fn same_loader<C>(a: &Arc<dyn ComponentLoader<C>>, b: &Arc<dyn ComponentLoader<C>>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
