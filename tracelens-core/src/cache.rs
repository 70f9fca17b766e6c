//! Request cache and revalidation layer
//!
//! Fetches are keyed by a canonicalized tuple of primitives (endpoint path,
//! token, and any parameters that affect the response). The cache
//! deduplicates in-flight requests sharing a key and retains the last
//! successful value while a new one resolves ("keep previous data").
//!
//! Each entry is explicit two-slot state: `current` holds the last
//! successful value, `pending` the shared in-flight fetch. Re-fetch is
//! triggered by a new [`RequestCache::fetch_with`] call for the key, by a
//! fixed interval ([`RequestCache::revalidate_every`]), or by explicit
//! invalidation after a mutation.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{watch, OnceCell};
use tokio::task::JoinHandle;

/// Canonicalized request key.
///
/// Includes everything that affects the response: endpoint path, token, and
/// parameters. Two requests with equal keys are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<String>);

impl CacheKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

/// Two-slot cache entry: the displayable value plus the in-flight fetch.
#[derive(Default)]
struct Entry {
    /// Last successfully resolved value, kept while a refresh is in flight
    current: Option<Value>,
    /// Shared in-flight fetch; concurrent callers await the same cell
    pending: Option<Arc<OnceCell<Option<Value>>>>,
    /// True from the moment a refresh starts until it resolves successfully
    is_stale: bool,
}

/// Session-scoped request cache.
pub struct RequestCache {
    entries: Mutex<HashMap<CacheKey, Entry>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached value for `key`, if any: the keep-previous slot. Available
    /// even while a refresh for the same key is still in flight.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .and_then(|entry| entry.current.clone())
    }

    /// Whether the value for `key` is awaiting (or failed) a refresh.
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        self.entries
            .lock()
            .unwrap()
            .get(key)
            .map(|entry| entry.is_stale)
            .unwrap_or(false)
    }

    /// Fetch through the cache.
    ///
    /// A `None` key disables fetching entirely and resolves to `None`, used
    /// to gate a request on a prerequisite value (token, project id) that is
    /// not yet known. Concurrent calls with the same key share one
    /// underlying fetch and observe the same resolved value. A failed fetch
    /// (the fetcher resolved `None`) keeps the previous value in the entry
    /// and leaves it stale; the return value reports this call's outcome,
    /// where `None` means "unknown", never "empty".
    pub async fn fetch_with<F, Fut>(&self, key: Option<CacheKey>, fetcher: F) -> Option<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<Value>>,
    {
        let Some(key) = key else {
            return None;
        };

        // Join an in-flight fetch for this key, or install a fresh cell.
        let cell = {
            let mut entries = self.entries.lock().unwrap();
            let entry = entries.entry(key.clone()).or_default();
            match &entry.pending {
                Some(cell) => Arc::clone(cell),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    entry.pending = Some(Arc::clone(&cell));
                    entry.is_stale = true;
                    cell
                }
            }
        };

        // Only the first caller's fetcher runs; the rest await the cell.
        let result = cell.get_or_init(|| async { fetcher().await }).await.clone();

        {
            let mut entries = self.entries.lock().unwrap();
            if let Some(entry) = entries.get_mut(&key) {
                // Commit once, and only if this cell is still the pending
                // generation; invalidate/set_local may have replaced it.
                if entry
                    .pending
                    .as_ref()
                    .is_some_and(|pending| Arc::ptr_eq(pending, &cell))
                {
                    entry.pending = None;
                    if let Some(value) = &result {
                        entry.current = Some(value.clone());
                        entry.is_stale = false;
                    }
                }
            }
        }

        result
    }

    /// Drop the entry for `key`; the next fetch starts from scratch.
    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.lock().unwrap().remove(key);
    }

    /// Replace the cached value locally without a round trip.
    ///
    /// Used after a mutation whose effect the client can compute itself,
    /// e.g. filtering a deleted project out of the cached projects list.
    /// Supersedes any fetch currently in flight for the key.
    pub fn set_local(&self, key: CacheKey, value: Value) {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries.entry(key).or_default();
        entry.pending = None;
        entry.current = Some(value);
        entry.is_stale = false;
    }

    /// Spawn a fixed-interval revalidation task for `key`.
    ///
    /// The first refresh fires immediately, then every `period`. A failed
    /// tick keeps the previous value; the loop continues either way. The
    /// returned handle cancels the task explicitly or on drop.
    pub fn revalidate_every<F, Fut>(
        self: &Arc<Self>,
        key: CacheKey,
        period: Duration,
        fetcher: F,
    ) -> RevalidateHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Value>> + Send + 'static,
    {
        let cache = Arc::clone(self);
        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel_rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                cache.fetch_with(Some(key.clone()), &fetcher).await;
            }
        });
        RevalidateHandle { cancel_tx, task }
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancellation handle for an interval revalidation task.
///
/// Dropping the handle closes the cancellation channel, which also stops
/// the task, so no orphaned timer survives a view change.
pub struct RevalidateHandle {
    cancel_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RevalidateHandle {
    /// Stop revalidating. Idempotent.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key() -> CacheKey {
        CacheKey::new(["/api/explore/has-tasks", "token-1", "proj-1"])
    }

    #[tokio::test]
    async fn test_none_key_disables_fetching() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        let result = cache
            .fetch_with(None, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some(json!(1))
            })
            .await;

        assert!(result.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let cache = RequestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetcher = |value: Value| {
            let calls = Arc::clone(&calls);
            move || {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Some(value)
                }
            }
        };

        let (a, b) = tokio::join!(
            cache.fetch_with(Some(key()), fetcher(json!("first"))),
            cache.fetch_with(Some(key()), fetcher(json!("second"))),
        );

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(a.is_some());
        assert_eq!(a, b);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keep_previous_while_revalidating() {
        let cache = Arc::new(RequestCache::new());

        cache
            .fetch_with(Some(key()), || async { Some(json!("v1")) })
            .await;
        assert_eq!(cache.get(&key()), Some(json!("v1")));
        assert!(!cache.is_stale(&key()));

        let slow = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .fetch_with(Some(key()), || async {
                        tokio::time::sleep(Duration::from_millis(200)).await;
                        Some(json!("v2"))
                    })
                    .await
            })
        };

        // While the refresh is in flight, the previous value still displays.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get(&key()), Some(json!("v1")));
        assert!(cache.is_stale(&key()));

        slow.await.unwrap();
        assert_eq!(cache.get(&key()), Some(json!("v2")));
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_value() {
        let cache = RequestCache::new();

        cache
            .fetch_with(Some(key()), || async { Some(json!("v1")) })
            .await;

        let result = cache.fetch_with(Some(key()), || async { None }).await;

        // This call's outcome is unknown, but the display value survives.
        assert!(result.is_none());
        assert_eq!(cache.get(&key()), Some(json!("v1")));
        assert!(cache.is_stale(&key()));
    }

    #[tokio::test]
    async fn test_sequential_fetches_revalidate() {
        let cache = RequestCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .fetch_with(Some(key()), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Some(json!(calls.load(Ordering::SeqCst)))
                })
                .await;
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get(&key()), Some(json!(2)));
    }

    #[tokio::test]
    async fn test_invalidate_drops_entry() {
        let cache = RequestCache::new();
        cache
            .fetch_with(Some(key()), || async { Some(json!("v1")) })
            .await;

        cache.invalidate(&key());
        assert!(cache.get(&key()).is_none());
    }

    #[tokio::test]
    async fn test_set_local_replaces_without_fetch() {
        let cache = RequestCache::new();
        cache
            .fetch_with(Some(key()), || async { Some(json!(["p1", "p2"])) })
            .await;

        cache.set_local(key(), json!(["p1"]));
        assert_eq!(cache.get(&key()), Some(json!(["p1"])));
        assert!(!cache.is_stale(&key()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_revalidate_every_ticks_and_cancels() {
        let cache = Arc::new(RequestCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handle = {
            let calls = Arc::clone(&calls);
            cache.revalidate_every(key(), Duration::from_millis(1000), move || {
                let calls = Arc::clone(&calls);
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    Some(json!(n))
                }
            })
        };

        // First refresh is immediate, then one per period.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_millis(3000)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }
}
