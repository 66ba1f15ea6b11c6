//! Component registry tests: memoization, coalescing and failure handling.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use route_resolver::registry::{ComponentLoader, RegistryBuilder, RegistryError};

mod common;

use common::{key, CountingLoader};

#[tokio::test]
async fn test_concurrent_requests_share_one_load() {
    let loader = Arc::new(CountingLoader::new("models").with_delay(Duration::from_millis(50)));
    let mut builder = RegistryBuilder::new();
    builder
        .register(key("d72"), Arc::clone(&loader) as Arc<dyn ComponentLoader<Arc<String>>>)
        .unwrap();
    let registry = builder.finish();

    let requests: Vec<_> = (0..16).map(|_| registry.materialize(&key("d72"))).collect();
    let components: Vec<_> = join_all(requests)
        .await
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(loader.calls(), 1);
    assert_eq!(components[0].as_str(), "d72:models");
    for component in &components[1..] {
        assert!(Arc::ptr_eq(component, &components[0]));
    }

    // Later requests hit the cache
    let again = registry.materialize(&key("d72")).await.unwrap();
    assert!(Arc::ptr_eq(&again, &components[0]));
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_abandoned_request_still_completes_load() {
    let loader = Arc::new(CountingLoader::new("setup").with_delay(Duration::from_millis(50)));
    let mut builder = RegistryBuilder::new();
    builder
        .register(key("e83"), Arc::clone(&loader) as Arc<dyn ComponentLoader<Arc<String>>>)
        .unwrap();
    let registry = builder.finish();

    // The caller gives up after the load has started
    let abandoned = tokio::time::timeout(Duration::from_millis(5), registry.materialize(&key("e83"))).await;
    assert!(abandoned.is_err());
    assert!(!registry.is_loaded(&key("e83")));

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(registry.is_loaded(&key("e83")));

    let component = registry.materialize(&key("e83")).await.unwrap();
    assert_eq!(component.as_str(), "e83:setup");
    assert_eq!(loader.calls(), 1);
}

#[tokio::test]
async fn test_failed_load_is_shared_then_retried() {
    let loader = Arc::new(
        CountingLoader::new("endpoints")
            .with_delay(Duration::from_millis(20))
            .failing_first(1),
    );
    let mut builder = RegistryBuilder::new();
    builder
        .register(key("6cf"), Arc::clone(&loader) as Arc<dyn ComponentLoader<Arc<String>>>)
        .unwrap();
    let registry = builder.finish();

    let requests: Vec<_> = (0..4).map(|_| registry.materialize(&key("6cf"))).collect();
    for outcome in join_all(requests).await {
        match outcome {
            Err(RegistryError::ComponentLoad { key: failed, source }) => {
                assert_eq!(failed, key("6cf"));
                assert_eq!(source.message(), "attempt 0 failed");
            }
            other => panic!("expected load failure, got {:?}", other),
        }
    }
    assert_eq!(loader.calls(), 1);
    assert!(!registry.is_loaded(&key("6cf")));

    let component = registry.materialize(&key("6cf")).await.unwrap();
    assert_eq!(component.as_str(), "6cf:endpoints");
    assert_eq!(loader.calls(), 2);
}

#[tokio::test]
async fn test_keys_load_independently() {
    let models = Arc::new(CountingLoader::new("models").with_delay(Duration::from_millis(10)));
    let setup = Arc::new(CountingLoader::new("setup"));
    let mut builder = RegistryBuilder::new();
    builder
        .register(key("d72"), Arc::clone(&models) as Arc<dyn ComponentLoader<Arc<String>>>)
        .unwrap()
        .register(key("e83"), Arc::clone(&setup) as Arc<dyn ComponentLoader<Arc<String>>>)
        .unwrap();
    let registry = builder.finish();

    let (a, b) = tokio::join!(registry.materialize(&key("d72")), registry.materialize(&key("e83")));
    assert_eq!(a.unwrap().as_str(), "d72:models");
    assert_eq!(b.unwrap().as_str(), "e83:setup");
    assert_eq!(registry.loaded_count(), 2);
    assert_eq!(registry.keys(), vec![key("d72"), key("e83")]);
}

#[test]
fn test_same_key_registration() {
    let loader: Arc<dyn ComponentLoader<Arc<String>>> = Arc::new(CountingLoader::new("intro"));
    let mut builder = RegistryBuilder::new();

    builder.register(key("a2b"), Arc::clone(&loader)).unwrap();
    builder.register(key("a2b"), Arc::clone(&loader)).unwrap();
    assert_eq!(builder.len(), 1);

    let conflicting: Arc<dyn ComponentLoader<Arc<String>>> = Arc::new(CountingLoader::new("other"));
    assert_eq!(
        builder.register(key("a2b"), conflicting).err(),
        Some(RegistryError::DuplicateKey { key: key("a2b") })
    );

    let registry = builder.finish();
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(&key("a2b")));
}

#[tokio::test]
async fn test_unknown_key_is_an_error() {
    let registry = RegistryBuilder::<Arc<String>>::new().finish();
    assert_eq!(
        registry.materialize(&key("fff")).await.err(),
        Some(RegistryError::UnknownKey(key("fff")))
    );
}
