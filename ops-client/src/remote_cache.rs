//! Keyed remote-data cache with request coalescing
//!
//! One entry per cache key holds the last good value, the last error
//! and the in-flight fetch, if any. Concurrent fetches for the same
//! key share a single upstream call; a stale value stays visible
//! while a revalidation runs or after it fails.

use crate::ClientError;
use chrono::Utc;
use dashmap::DashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use thiserror::Error;
use tokio::sync::broadcast;

/// Cloneable fetch error, carried inside cache entries and shared
/// futures
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        Self(err.to_string())
    }
}

/// Change notification emitted whenever a key's state moves
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub key: String,
}

/// Observable state of one cache key
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteState<T> {
    /// No value yet
    Loading { is_fetching: bool },
    /// A current value with no outstanding error
    Success {
        data: T,
        last_success_at: i64,
        is_revalidating: bool,
    },
    /// The last fetch failed; any stale value rides along
    Error {
        error: FetchError,
        data: Option<T>,
        last_success_at: Option<i64>,
        is_fetching: bool,
    },
}

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

struct CacheEntry<T> {
    data: Option<T>,
    error: Option<FetchError>,
    last_success_at: Option<i64>,
    in_flight: Option<SharedFetch<T>>,
}

impl<T> Default for CacheEntry<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            last_success_at: None,
            in_flight: None,
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

const EVENT_CAPACITY: usize = 64;

/// Keyed cache of remote values of one type
pub struct RemoteCache<T> {
    entries: DashMap<String, CacheEntry<T>>,
    events: broadcast::Sender<CacheEvent>,
}

impl<T> Default for RemoteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RemoteCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: DashMap::new(),
            events,
        }
    }

    /// Subscribe to change notifications for all keys
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn emit(&self, key: &str) {
        let _ = self.events.send(CacheEvent {
            key: key.to_string(),
        });
    }

    /// Current state of a key
    pub fn snapshot(&self, key: &str) -> RemoteState<T> {
        let Some(entry) = self.entries.get(key) else {
            return RemoteState::Loading { is_fetching: false };
        };
        let is_fetching = entry.in_flight.is_some();

        if let Some(error) = entry.error.clone() {
            return RemoteState::Error {
                error,
                data: entry.data.clone(),
                last_success_at: entry.last_success_at,
                is_fetching,
            };
        }
        match (entry.data.clone(), entry.last_success_at) {
            (Some(data), Some(last_success_at)) => RemoteState::Success {
                data,
                last_success_at,
                is_revalidating: is_fetching,
            },
            _ => RemoteState::Loading { is_fetching },
        }
    }

    /// Fetch a key, joining an in-flight call when one exists.
    ///
    /// The passed future only runs when this call becomes the leader;
    /// followers await the leader's shared future and their own
    /// argument is dropped unpolled.
    pub async fn fetch<F>(&self, key: &str, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (shared, leader) = {
            let mut entry = self.entries.entry(key.to_string()).or_default();
            match entry.in_flight.clone() {
                Some(existing) => (existing, false),
                None => {
                    let shared = fut.boxed().shared();
                    entry.in_flight = Some(shared.clone());
                    (shared, true)
                }
            }
        };

        if leader {
            self.emit(key);
        }

        // Entry guard dropped above; awaiting here cannot deadlock.
        let result = shared.await;

        if leader {
            {
                let mut entry = self.entries.entry(key.to_string()).or_default();
                match &result {
                    Ok(data) => {
                        entry.data = Some(data.clone());
                        entry.error = None;
                        entry.last_success_at = Some(now_ms());
                    }
                    Err(err) => {
                        entry.error = Some(err.clone());
                    }
                }
                entry.in_flight = None;
            }
            self.emit(key);
        }

        result
    }

    /// Mark a key as changed. Subscribers are notified so they can
    /// refetch; the cached value stays visible until a fetch replaces
    /// it, and no refetch is forced here.
    pub fn invalidate(&self, key: &str) {
        self.emit(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_fetches_coalesce() {
        let cache: RemoteCache<String> = RemoteCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let make = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok("rows".to_string())
        };

        let (a, b) = tokio::join!(
            cache.fetch("view:item-metrics", make(calls.clone())),
            cache.fetch("view:item-metrics", make(calls.clone())),
        );

        assert_eq!(a.unwrap(), "rows");
        assert_eq!(b.unwrap(), "rows");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_revalidation_retains_stale_data() {
        let cache: RemoteCache<String> = RemoteCache::new();

        cache
            .fetch("k", async { Ok("fresh".to_string()) })
            .await
            .unwrap();
        let stamped = match cache.snapshot("k") {
            RemoteState::Success {
                data,
                last_success_at,
                is_revalidating,
            } => {
                assert_eq!(data, "fresh");
                assert!(!is_revalidating);
                last_success_at
            }
            other => panic!("unexpected state: {other:?}"),
        };

        let err = cache
            .fetch("k", async { Err(FetchError::new("upstream down")) })
            .await
            .unwrap_err();
        assert_eq!(err.0, "upstream down");

        match cache.snapshot("k") {
            RemoteState::Error {
                error,
                data,
                last_success_at,
                is_fetching,
            } => {
                assert_eq!(error.0, "upstream down");
                assert_eq!(data.as_deref(), Some("fresh"));
                assert_eq!(last_success_at, Some(stamped));
                assert!(!is_fetching);
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_clears_previous_error() {
        let cache: RemoteCache<i64> = RemoteCache::new();

        let _ = cache.fetch("k", async { Err(FetchError::new("boom")) }).await;
        assert!(matches!(cache.snapshot("k"), RemoteState::Error { .. }));

        cache.fetch("k", async { Ok(7) }).await.unwrap();
        match cache.snapshot("k") {
            RemoteState::Success { data, .. } => assert_eq!(data, 7),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalidate_notifies_but_keeps_stale_data() {
        let cache: RemoteCache<String> = RemoteCache::new();
        cache
            .fetch("k", async { Ok("v1".to_string()) })
            .await
            .unwrap();

        let mut events = cache.subscribe();
        cache.invalidate("k");

        let event = events.recv().await.unwrap();
        assert_eq!(event.key, "k");

        // The last good value stays visible until a refetch lands.
        match cache.snapshot("k") {
            RemoteState::Success {
                data,
                is_revalidating,
                ..
            } => {
                assert_eq!(data, "v1");
                assert!(!is_revalidating);
            }
            other => panic!("unexpected state: {other:?}"),
        }

        cache
            .fetch("k", async { Ok("v2".to_string()) })
            .await
            .unwrap();
        match cache.snapshot("k") {
            RemoteState::Success { data, .. } => assert_eq!(data, "v2"),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_key_is_idle_loading() {
        let cache: RemoteCache<i64> = RemoteCache::new();
        assert!(matches!(
            cache.snapshot("missing"),
            RemoteState::Loading { is_fetching: false }
        ));
    }
}
