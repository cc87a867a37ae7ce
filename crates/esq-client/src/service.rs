//! Mapping cache and fetch orchestration.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::sync::atomic::Ordering;
use std::time::Duration;

use indexmap::IndexMap;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Instant, sleep};
use tracing::warn;

use esq_mapping::{FieldRegistry, build_registry};

use crate::stats::{Counters, MappingStats};
use crate::transport::MappingTransport;

pub const DEFAULT_CACHE_CAPACITY: usize = 50;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// One in-flight fetch shared by every caller of its key.
///
/// The cell is resolved exactly once; the quiescence deadline is re-armed by
/// each coalescing caller so bursts supersede earlier triggers instead of
/// queueing behind them.
#[derive(Clone)]
struct PendingFetch {
    cell: Arc<OnceCell<Arc<FieldRegistry>>>,
    quiet_until: Arc<StdMutex<Instant>>,
}

struct State {
    /// Recency-ordered: least-recently-used at the front.
    cache: IndexMap<String, Arc<FieldRegistry>>,
    pending: HashMap<String, PendingFetch>,
}

/// Bounded cache of field registries with a single-flight fetch path.
///
/// Explicitly constructed and owned by the host application; everything that
/// needs schema access receives a reference instead of reaching for process
/// state.
pub struct MappingService {
    transport: Arc<dyn MappingTransport>,
    state: Mutex<State>,
    counters: Counters,
    capacity: usize,
    debounce: Duration,
}

impl MappingService {
    pub fn new(transport: Arc<dyn MappingTransport>) -> Self {
        Self::with_capacity(transport, DEFAULT_CACHE_CAPACITY, DEFAULT_DEBOUNCE)
    }

    pub fn with_capacity(
        transport: Arc<dyn MappingTransport>,
        capacity: usize,
        debounce: Duration,
    ) -> Self {
        Self {
            transport,
            state: Mutex::new(State {
                cache: IndexMap::new(),
                pending: HashMap::new(),
            }),
            counters: Counters::default(),
            capacity: capacity.max(1),
            debounce,
        }
    }

    fn cache_key(endpoint: &str, index_pattern: &str) -> String {
        format!("{endpoint}#{index_pattern}")
    }

    /// Get the registry for an index pattern, fetching it if necessary.
    ///
    /// A cache hit resolves immediately. A miss joins the in-flight fetch
    /// for the same key when one exists, otherwise schedules a fetch behind
    /// the debounce window. Transport failures are absorbed into an empty
    /// registry, so this never fails.
    pub async fn get_registry(&self, endpoint: &str, index_pattern: &str) -> Arc<FieldRegistry> {
        let key = Self::cache_key(endpoint, index_pattern);

        let pending = {
            let mut state = self.state.lock().await;
            if let Some(registry) = touch(&mut state.cache, &key) {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                return registry;
            }
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            match state.pending.get(&key) {
                Some(pending) => {
                    // Supersede the earlier trigger: push the quiescence
                    // deadline back instead of queueing a second fetch.
                    if let Ok(mut deadline) = pending.quiet_until.lock() {
                        *deadline = Instant::now() + self.debounce;
                    }
                    pending.clone()
                }
                None => {
                    let pending = PendingFetch {
                        cell: Arc::new(OnceCell::new()),
                        quiet_until: Arc::new(StdMutex::new(Instant::now() + self.debounce)),
                    };
                    state.pending.insert(key.clone(), pending.clone());
                    pending
                }
            }
        };

        let registry = pending
            .cell
            .get_or_init(|| self.fetch(endpoint, index_pattern, &pending.quiet_until))
            .await
            .clone();

        // Whoever gets here first publishes the result and releases the
        // in-flight marker; a clear() in between simply discards it.
        let mut state = self.state.lock().await;
        if state.pending.remove(&key).is_some() {
            insert_bounded(&mut state.cache, key, registry.clone(), self.capacity);
        }
        registry
    }

    /// Registry for several concrete index names at once: one request with
    /// a comma-joined pattern, which the backend accepts natively.
    pub async fn get_registry_for_indices(
        &self,
        endpoint: &str,
        indices: &[String],
    ) -> Arc<FieldRegistry> {
        let pattern = indices.join(",");
        self.get_registry(endpoint, &pattern).await
    }

    /// Warm the cache for several patterns concurrently. Individual
    /// failures are already absorbed (and logged) by the fetch path.
    pub async fn preload(&self, endpoint: &str, index_patterns: &[String]) {
        futures::future::join_all(
            index_patterns
                .iter()
                .map(|pattern| self.get_registry(endpoint, pattern)),
        )
        .await;
    }

    /// Drop one cache entry.
    pub async fn invalidate(&self, endpoint: &str, index_pattern: &str) {
        let key = Self::cache_key(endpoint, index_pattern);
        self.state.lock().await.cache.shift_remove(&key);
    }

    /// Empty the cache, forget in-flight fetches and reset counters.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.cache.clear();
        state.pending.clear();
        self.counters.reset();
    }

    pub async fn stats(&self) -> MappingStats {
        let state = self.state.lock().await;
        MappingStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            cached_registries: state.cache.len(),
            in_flight: state.pending.len(),
        }
    }

    async fn fetch(
        &self,
        endpoint: &str,
        index_pattern: &str,
        quiet_until: &StdMutex<Instant>,
    ) -> Arc<FieldRegistry> {
        // Wait until the key has been quiet for the full window; coalescing
        // callers keep pushing the deadline back while the burst lasts.
        loop {
            let deadline = match quiet_until.lock() {
                Ok(deadline) => *deadline,
                Err(_) => break,
            };
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(deadline - now).await;
        }

        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        match self.transport.fetch_mapping(endpoint, index_pattern).await {
            Ok(body) => Arc::new(build_registry(&body)),
            Err(err) => {
                warn!(
                    endpoint,
                    index_pattern,
                    error = %err,
                    "mapping fetch failed, serving empty registry"
                );
                Arc::new(FieldRegistry::new())
            }
        }
    }
}

fn touch(
    cache: &mut IndexMap<String, Arc<FieldRegistry>>,
    key: &str,
) -> Option<Arc<FieldRegistry>> {
    let index = cache.get_index_of(key)?;
    let last = cache.len() - 1;
    cache.move_index(index, last);
    cache.get_index(last).map(|(_, registry)| registry.clone())
}

fn insert_bounded(
    cache: &mut IndexMap<String, Arc<FieldRegistry>>,
    key: String,
    registry: Arc<FieldRegistry>,
    capacity: usize,
) {
    cache.shift_remove(&key);
    cache.insert(key, registry);
    while cache.len() > capacity {
        cache.shift_remove_index(0);
    }
}
