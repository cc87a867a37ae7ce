//! Bounded mapping cache with debounced single-flight fetching.
//!
//! [`MappingService`] owns a recency-ordered cache of field registries keyed
//! by `(endpoint, index pattern)`. Concurrent requests for the same key
//! coalesce onto one outbound fetch, bursts are debounced behind a
//! quiescence window, and fetch failures degrade to an empty registry so an
//! editing session never observes an error from this layer.

mod service;
mod stats;
mod transport;

pub use service::{DEFAULT_CACHE_CAPACITY, DEFAULT_DEBOUNCE, MappingService};
pub use stats::MappingStats;
pub use transport::{HttpTransport, MappingTransport, TransportError};
