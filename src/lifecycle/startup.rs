//! Startup: manifest → registry → router.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::schema::SiteConfig;
use crate::registry::{ComponentLoader, ComponentRegistry, FileLoader, PageSource, RegistryBuilder, RegistryError};
use crate::routing::types::{ComponentKey, EmptyKeyError};
use crate::routing::{Router, RouterError};

/// Router over page sources read from disk.
pub type SiteRouter = Router<PageSource>;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid component key: {0}")]
    Key(#[from] EmptyKeyError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Router(#[from] RouterError),
}

/// Register a file loader for every component in the manifest.
///
/// Declarations that share a source file share one loader, so repeating a
/// component with the same source is accepted.
pub fn build_registry(config: &SiteConfig) -> Result<ComponentRegistry<PageSource>, StartupError> {
    let mut builder = RegistryBuilder::new();
    let mut by_source: HashMap<PathBuf, Arc<dyn ComponentLoader<PageSource>>> = HashMap::new();

    for component in &config.components {
        let key = ComponentKey::new(&component.key)?;
        let source = config.source_path(component);
        let loader = by_source.entry(source.clone()).or_insert_with(|| {
            let loader: Arc<dyn ComponentLoader<PageSource>> = Arc::new(FileLoader::new(source));
            loader
        });
        builder.register(key, Arc::clone(loader))?;
    }

    Ok(builder.finish())
}

/// Build the registry and the initial route tree.
pub fn bootstrap(config: &SiteConfig) -> Result<SiteRouter, StartupError> {
    let registry = Arc::new(build_registry(config)?);
    let router = Router::from_descriptors(&config.routes, registry)?;

    tracing::info!(
        site = %config.site.name,
        routes = config.routes.len(),
        components = router.registry().len(),
        "Site router ready"
    );
    Ok(router)
}
