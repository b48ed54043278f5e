use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

type SharedLookup<T> = Shared<BoxFuture<'static, Result<T, String>>>;

/// In-flight request de-duplication keyed by string id.
///
/// Concurrent lookups for the same key share one underlying future.
/// A failed lookup evicts its entry so a later retry can refetch;
/// a successful one stays cached for the life of the cache.
pub struct InflightCache<T: Clone> {
    entries: Mutex<HashMap<String, SharedLookup<T>>>,
}

impl<T: Clone + Send + Sync + 'static> InflightCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<T, String>
    where
        F: Future<Output = Result<T, String>> + Send + 'static,
    {
        let lookup = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|e| format!("lookup cache lock poisoned: {}", e))?;
            match entries.get(key) {
                Some(existing) => existing.clone(),
                None => {
                    let shared = fetch.boxed().shared();
                    entries.insert(key.to_string(), shared.clone());
                    shared
                }
            }
        };

        let result = lookup.clone().await;
        if result.is_err() {
            // Only evict the entry we awaited. Another caller may have
            // already retried and installed a fresh in-flight lookup
            // under the same key; a late waiter must not tear that down.
            if let Ok(mut entries) = self.entries.lock() {
                if entries.get(key).map_or(false, |current| current.ptr_eq(&lookup)) {
                    entries.remove(key);
                }
            }
        }
        result
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for InflightCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_fetch() {
        let cache = InflightCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let fetch = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<_, String>(7u32)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("alice", fetch(calls.clone())),
            cache.get_or_fetch("alice", fetch(calls.clone())),
        );

        assert_eq!(a.unwrap(), 7);
        assert_eq!(b.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_is_cached_for_cache_lifetime() {
        let cache = InflightCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let calls = calls.clone();
            let got = cache
                .get_or_fetch("bob", async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>("karma".to_string())
                })
                .await;
            assert_eq!(got.unwrap(), "karma");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_evicts_so_retry_refetches() {
        let cache: InflightCache<u32> = InflightCache::new();

        let err = cache
            .get_or_fetch("carol", async { Err("offline".to_string()) })
            .await;
        assert_eq!(err.unwrap_err(), "offline");
        assert_eq!(cache.len(), 0);

        let ok = cache.get_or_fetch("carol", async { Ok(3) }).await;
        assert_eq!(ok.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_late_failure_waiter_keeps_a_fresh_retry_entry() {
        let cache: Arc<InflightCache<u32>> = Arc::new(InflightCache::new());

        // A second waiter joins the failing lookup but is only polled
        // again after this task has already evicted the entry and
        // retried the key.
        let c = cache.clone();
        let late_waiter = tokio::spawn(async move {
            c.get_or_fetch("frank", async {
                tokio::task::yield_now().await;
                Err::<u32, _>("offline".to_string())
            })
            .await
        });
        tokio::task::yield_now().await;

        let first = cache
            .get_or_fetch("frank", async { unreachable!("entry already in flight") })
            .await;
        assert_eq!(first.unwrap_err(), "offline");
        assert_eq!(cache.len(), 0);

        let retried = cache.get_or_fetch("frank", async { Ok(5) }).await;
        assert_eq!(retried.unwrap(), 5);

        // The late waiter's stale eviction must not remove the entry
        // the retry installed.
        assert_eq!(late_waiter.await.unwrap().unwrap_err(), "offline");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = InflightCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for key in ["dave", "erin"] {
            let calls = calls.clone();
            cache
                .get_or_fetch(key, async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(0u8)
                })
                .await
                .unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
