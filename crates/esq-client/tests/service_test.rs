use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use esq_client::{MappingService, MappingTransport, TransportError};
use serde_json::{Value, json};
use tokio::time::Instant;

struct MockTransport {
    calls: AtomicUsize,
    patterns: Mutex<Vec<String>>,
    fail: bool,
}

impl MockTransport {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            patterns: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            patterns: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_pattern(&self) -> Option<String> {
        self.patterns.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MappingTransport for MockTransport {
    async fn fetch_mapping(
        &self,
        _endpoint: &str,
        index_pattern: &str,
    ) -> Result<Value, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.patterns.lock().unwrap().push(index_pattern.to_string());
        if self.fail {
            return Err(TransportError::Status(500));
        }
        Ok(json!({
            index_pattern: {
                "mappings": {
                    "properties": {
                        "title": { "type": "text" }
                    }
                }
            }
        }))
    }
}

fn service(transport: Arc<MockTransport>, capacity: usize) -> MappingService {
    MappingService::with_capacity(transport, capacity, Duration::ZERO)
}

const ENDPOINT: &str = "http://localhost:9200";

#[tokio::test]
async fn capacity_bound_evicts_least_recently_used() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 3);

    for pattern in ["a", "b", "c", "d"] {
        service.get_registry(ENDPOINT, pattern).await;
    }
    let stats = service.stats().await;
    assert_eq!(stats.cached_registries, 3);
    assert_eq!(stats.fetches, 4);

    // "a" was evicted, "d" was not.
    service.get_registry(ENDPOINT, "a").await;
    assert_eq!(transport.calls(), 5);
    service.get_registry(ENDPOINT, "d").await;
    assert_eq!(transport.calls(), 5);
}

#[tokio::test]
async fn recently_accessed_entries_survive_eviction() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 3);

    for pattern in ["a", "b", "c"] {
        service.get_registry(ENDPOINT, pattern).await;
    }
    // Touch "a" so "b" is now the least recently used.
    service.get_registry(ENDPOINT, "a").await;
    service.get_registry(ENDPOINT, "d").await;

    // "a" is still cached, "b" is gone.
    let fetches_before = transport.calls();
    service.get_registry(ENDPOINT, "a").await;
    assert_eq!(transport.calls(), fetches_before);
    service.get_registry(ENDPOINT, "b").await;
    assert_eq!(transport.calls(), fetches_before + 1);
}

#[tokio::test]
async fn concurrent_requests_share_one_fetch() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    let (first, second) = tokio::join!(
        service.get_registry(ENDPOINT, "logs"),
        service.get_registry(ENDPOINT, "logs"),
    );
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(transport.calls(), 1);

    let stats = service.stats().await;
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.fetches, 1);
    assert_eq!(stats.in_flight, 0);
}

#[tokio::test]
async fn fetch_failure_resolves_to_empty_registry() {
    let transport = MockTransport::failing();
    let service = service(transport.clone(), 50);

    let registry = service.get_registry(ENDPOINT, "logs").await;
    assert!(registry.is_empty());
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn hits_and_misses_are_counted() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    service.get_registry(ENDPOINT, "logs").await;
    service.get_registry(ENDPOINT, "logs").await;
    service.get_registry(ENDPOINT, "logs").await;

    let stats = service.stats().await;
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.fetches, 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_waits_for_the_quiescence_window() {
    let transport = MockTransport::ok();
    let service =
        MappingService::with_capacity(transport.clone(), 50, Duration::from_millis(300));

    let before = Instant::now();
    service.get_registry(ENDPOINT, "logs").await;
    assert!(before.elapsed() >= Duration::from_millis(300));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn burst_of_requests_coalesces_into_one_debounced_fetch() {
    let transport = MockTransport::ok();
    let service =
        MappingService::with_capacity(transport.clone(), 50, Duration::from_millis(300));

    let (first, second, third) = tokio::join!(
        service.get_registry(ENDPOINT, "logs"),
        service.get_registry(ENDPOINT, "logs"),
        service.get_registry(ENDPOINT, "logs"),
    );
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&second, &third));
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn invalidate_drops_a_single_entry() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    service.get_registry(ENDPOINT, "logs").await;
    service.get_registry(ENDPOINT, "metrics").await;
    service.invalidate(ENDPOINT, "logs").await;
    assert_eq!(service.stats().await.cached_registries, 1);

    service.get_registry(ENDPOINT, "logs").await;
    assert_eq!(transport.calls(), 3);
    service.get_registry(ENDPOINT, "metrics").await;
    assert_eq!(transport.calls(), 3);
}

#[tokio::test]
async fn clear_resets_cache_and_counters() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    service.get_registry(ENDPOINT, "logs").await;
    service.get_registry(ENDPOINT, "logs").await;
    service.clear().await;

    let stats = service.stats().await;
    assert_eq!(stats.cached_registries, 0);
    assert_eq!(stats.hits, 0);
    assert_eq!(stats.misses, 0);
    assert_eq!(stats.fetches, 0);
    assert_eq!(stats.in_flight, 0);

    service.get_registry(ENDPOINT, "logs").await;
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn preload_warms_several_patterns() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    service
        .preload(ENDPOINT, &["logs".to_string(), "metrics".to_string()])
        .await;
    assert_eq!(service.stats().await.cached_registries, 2);

    // Preload failures are swallowed; the call still completes.
    let failing = MockTransport::failing();
    let service = self::service(failing.clone(), 50);
    service
        .preload(ENDPOINT, &["logs".to_string(), "metrics".to_string()])
        .await;
    assert_eq!(failing.calls(), 2);
}

#[tokio::test]
async fn batch_lookup_joins_indices_into_one_pattern() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    service
        .get_registry_for_indices(ENDPOINT, &["logs-1".to_string(), "logs-2".to_string()])
        .await;
    assert_eq!(transport.calls(), 1);
    assert_eq!(transport.last_pattern().as_deref(), Some("logs-1,logs-2"));
}

#[tokio::test]
async fn successful_fetch_builds_a_usable_registry() {
    let transport = MockTransport::ok();
    let service = service(transport.clone(), 50);

    let registry = service.get_registry(ENDPOINT, "articles").await;
    assert_eq!(registry.len(), 1);
    assert!(registry.get("title").is_some());
}
