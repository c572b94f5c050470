//! Integration tests for `ResourceCache`: single-fetch loading, eviction
//! around display slots, and capacity limits.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use wayfarer_cache::{
    CacheConfig, CacheError, EvictOutcome, EvictSummary, ResourceCache, SwapOutcome,
};

// =========================================================================
// Helpers
// =========================================================================

/// Stand-in for a decoded texture.
#[derive(Debug, PartialEq, Eq)]
struct Image(String);

/// Counts loader invocations and produces an `Image` named after the URL.
#[derive(Clone, Default)]
struct Loader {
    calls: Arc<AtomicUsize>,
}

impl Loader {
    fn load(
        &self,
        url: &str,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Image, String>> + Send>>
    {
        let calls = Arc::clone(&self.calls);
        let url = url.to_string();
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok(Image(url))
            })
        }
    }

    fn fail(
        &self,
    ) -> impl FnOnce() -> std::pin::Pin<Box<dyn Future<Output = Result<Image, String>> + Send>>
    {
        let calls = Arc::clone(&self.calls);
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Err("HTTP 404".to_string())
            })
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn cache() -> ResourceCache<Image> {
    ResourceCache::new(CacheConfig::default())
}

// =========================================================================
// get_or_load()
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_second_call_is_a_hit() {
    let cache = cache();
    let loader = Loader::default();

    let first = cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    let second = cache.get_or_load("u1", loader.load("u1")).await.unwrap();

    assert_eq!(loader.calls(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(*first, Image("u1".into()));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses, stats.loads), (1, 1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_reload_after_evict() {
    let cache = cache();
    let loader = Loader::default();

    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    assert_eq!(cache.evict("u1"), EvictOutcome::Destroyed);
    assert!(!cache.contains("u1"));

    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_evict_during_load_discards_result() {
    let cache = cache();
    let loader = Loader::default();

    let (first, outcome) = tokio::join!(cache.get_or_load("u1", loader.load("u1")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.evict("u1")
    });

    assert_eq!(*first.unwrap(), Image("u1".into()));
    assert_eq!(outcome, EvictOutcome::NotCached);
    assert!(!cache.contains("u1"));
    assert!(!cache.is_loading("u1"));

    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_evict_all_during_load_discards_result() {
    let cache = cache();
    let loader = Loader::default();

    let (first, _) = tokio::join!(cache.get_or_load("u1", loader.load("u1")), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.evict_all()
    });

    assert!(first.is_ok());
    assert!(cache.is_empty());
    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    assert_eq!(loader.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_share_one_load() {
    let cache = cache();
    let loader = Loader::default();

    let (a, b, c) = tokio::join!(
        cache.get_or_load("u1", loader.load("u1")),
        cache.get_or_load("u1", loader.load("u1")),
        cache.get_or_load("u1", loader.load("u1")),
    );

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert_eq!(loader.calls(), 1);
    assert!(Arc::ptr_eq(&a, &b) && Arc::ptr_eq(&b, &c));
    assert_eq!(cache.len(), 1);
    assert!(!cache.is_loading("u1"));
    assert_eq!(cache.entry_info("u1").unwrap().access_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_across_tasks_share_one_load() {
    let cache = cache();
    let loader = Loader::default();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let loader = loader.clone();
            tokio::spawn(async move { cache.get_or_load("u1", loader.load("u1")).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(loader.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_load_is_not_cached() {
    let cache = cache();
    let loader = Loader::default();

    let (a, b) = tokio::join!(
        cache.get_or_load("bad", loader.fail()),
        cache.get_or_load("bad", loader.fail()),
    );
    let expected = CacheError::Load {
        url: "bad".into(),
        reason: "HTTP 404".into(),
    };
    assert_eq!(a.unwrap_err(), expected);
    assert_eq!(b.unwrap_err(), expected);
    assert_eq!(loader.calls(), 1);
    assert!(!cache.contains("bad"));
    assert!(!cache.is_loading("bad"));

    // The next call loads again.
    cache.get_or_load("bad", loader.load("bad")).await.unwrap();
    assert_eq!(loader.calls(), 2);
    assert_eq!(cache.stats().failed_loads, 1);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_load_is_picked_up_by_next_caller() {
    let cache = cache();
    let loader = Loader::default();

    // Give up on the first load halfway through.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(50),
        cache.get_or_load("u1", loader.load("u1")),
    )
    .await;
    assert!(abandoned.is_err());
    assert!(cache.is_loading("u1"));

    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    assert_eq!(loader.calls(), 1);
    assert!(cache.contains("u1"));
}

#[tokio::test(start_paused = true)]
async fn test_hit_updates_bookkeeping() {
    let cache = cache();
    let loader = Loader::default();

    cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    let before = cache.entry_info("u1").unwrap();
    assert_eq!(before.access_count, 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    cache.get_or_load("u1", loader.load("u1")).await.unwrap();

    let after = cache.entry_info("u1").unwrap();
    assert_eq!(after.access_count, 2);
    assert_eq!(after.last_access - before.last_access, Duration::from_secs(5));
}

// =========================================================================
// Eviction and display slots
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_evict_displayed_entry_is_deferred() {
    let cache = cache();
    let loader = Loader::default();
    let slot = cache.open_slot();

    let image = cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    cache.assign(slot, Arc::clone(&image)).unwrap();

    assert_eq!(cache.evict("u1"), EvictOutcome::Deferred);
    assert!(!cache.contains("u1"));
    assert_eq!(cache.retired_len(), 1);
    assert!(Arc::ptr_eq(&cache.displayed(slot).unwrap(), &image));

    // Releasing the slot completes the deferred release.
    assert_eq!(cache.close_slot(slot).unwrap(), SwapOutcome::Destroyed);
    assert_eq!(cache.retired_len(), 0);

    let stats = cache.stats();
    assert_eq!((stats.deferred, stats.destroyed), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_swap_away_from_cached_instance_keeps_it() {
    let cache = cache();
    let loader = Loader::default();
    let slot = cache.open_slot();

    let first = cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    let second = cache.get_or_load("u2", loader.load("u2")).await.unwrap();

    cache.assign(slot, first).unwrap();
    assert_eq!(cache.assign(slot, second).unwrap(), SwapOutcome::Kept);
    assert!(cache.contains("u1"));
    assert_eq!(cache.stats().destroyed, 0);
}

#[tokio::test(start_paused = true)]
async fn test_evict_not_cached() {
    let cache = cache();
    assert_eq!(cache.evict("nope"), EvictOutcome::NotCached);
}

#[tokio::test(start_paused = true)]
async fn test_evict_all_splits_displayed_and_free() {
    let cache = cache();
    let loader = Loader::default();
    let slot = cache.open_slot();

    let shown = cache.get_or_load("u1", loader.load("u1")).await.unwrap();
    cache.get_or_load("u2", loader.load("u2")).await.unwrap();
    cache.get_or_load("u3", loader.load("u3")).await.unwrap();
    cache.assign(slot, shown).unwrap();

    assert_eq!(
        cache.evict_all(),
        EvictSummary {
            destroyed: 2,
            deferred: 1
        }
    );
    assert!(cache.is_empty());
    assert_eq!(cache.retired_len(), 1);
}

// =========================================================================
// Capacity
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_capacity_evicts_least_recently_used() {
    let cache = ResourceCache::new(CacheConfig::with_capacity(2));
    let loader = Loader::default();

    cache.get_or_load("a", loader.load("a")).await.unwrap();
    cache.get_or_load("b", loader.load("b")).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    cache.get_or_load("a", loader.load("a")).await.unwrap();

    cache.get_or_load("c", loader.load("c")).await.unwrap();

    assert!(cache.contains("a"));
    assert!(!cache.contains("b"));
    assert!(cache.contains("c"));
    assert_eq!(cache.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_capacity_skips_displayed_entries() {
    let cache = ResourceCache::new(CacheConfig::with_capacity(1));
    let loader = Loader::default();
    let slot = cache.open_slot();

    let a = cache.get_or_load("a", loader.load("a")).await.unwrap();
    cache.assign(slot, a).unwrap();
    cache.get_or_load("b", loader.load("b")).await.unwrap();

    // `a` is on screen and `b` was just loaded; both stay.
    assert!(cache.contains("a"));
    assert!(cache.contains("b"));

    cache.clear_slot(slot).unwrap();
    cache.get_or_load("c", loader.load("c")).await.unwrap();
    assert_eq!(cache.len(), 1);
    assert!(cache.contains("c"));
}
