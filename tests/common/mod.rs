//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::FutureExt;
use route_resolver::registry::{ComponentLoader, LoadError, LoadFuture};
use route_resolver::routing::{ComponentKey, PageDescriptor};

pub fn key(s: &str) -> ComponentKey {
    ComponentKey::new(s).unwrap()
}

/// The documentation site's route table.
pub fn docs_site() -> Vec<PageDescriptor> {
    vec![
        PageDescriptor::new("/", "fc9").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/api/authentication", "255").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/api/endpoints", "6cf").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/api/models", "d72").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/architecture/database", "669").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/architecture/overview", "4fe").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/guides/deployment", "c92").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/guides/documentation-standards", "8ee").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/guides/setup", "e83").exact().with_sidebar("tutorialSidebar"),
        PageDescriptor::new("/tron/agents", "444").exact(),
        PageDescriptor::new("/tron/api", "481").exact(),
        PageDescriptor::new("/tron/overview", "ed3").exact(),
        PageDescriptor::catch_all("404"),
    ]
}

/// A loader that counts invocations, waits, and can fail its first attempts.
pub struct CountingLoader {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    failures: usize,
    body: String,
}

impl CountingLoader {
    pub fn new(body: &str) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::from_millis(0),
            failures: 0,
            body: body.to_string(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ComponentLoader<Arc<String>> for CountingLoader {
    fn load(&self, key: &ComponentKey) -> LoadFuture<Arc<String>> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay;
        let fail = attempt < self.failures;
        let body = format!("{}:{}", key, self.body);
        async move {
            tokio::time::sleep(delay).await;
            if fail {
                Err(LoadError::new(format!("attempt {} failed", attempt)))
            } else {
                Ok(Arc::new(body))
            }
        }
        .boxed()
    }
}
