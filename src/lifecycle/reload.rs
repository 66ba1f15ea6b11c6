//! Applying manifest updates to a live router.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::config::schema::SiteConfig;
use crate::lifecycle::startup::SiteRouter;

/// Rebuild the router's tree from `config`.
///
/// Returns false, keeping the current tree, if the new routes do not build
/// or reference components that were not registered at startup.
pub fn apply(router: &SiteRouter, config: &SiteConfig) -> bool {
    match router.rebuild(&config.routes) {
        Ok(tree) => {
            tracing::info!(nodes = tree.len(), "Routes reloaded");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Rebuild failed. Keeping current routes.");
            false
        }
    }
}

/// Apply updates until shutdown or until the update channel closes.
pub async fn run(
    router: Arc<SiteRouter>,
    mut updates: mpsc::UnboundedReceiver<SiteConfig>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Some(config) => {
                    apply(&router, &config);
                }
                None => {
                    tracing::debug!("Manifest updates closed");
                    break;
                }
            },
            _ = shutdown.recv() => {
                tracing::info!("Reload loop received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
