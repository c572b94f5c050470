//! The resource cache and its display slots.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::time::Instant;

use crate::{CacheConfig, CacheError};

/// Counter for generating unique slot IDs.
static NEXT_SLOT_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Identifies one display target (an image widget, a portrait frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Running counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls answered from a cached entry.
    pub hits: u64,
    /// Calls that found no cached entry (including those that joined a
    /// load already in flight).
    pub misses: u64,
    /// Loader invocations.
    pub loads: u64,
    /// Loads that failed and were not cached.
    pub failed_loads: u64,
    /// Resources the cache let go of for good.
    pub destroyed: u64,
    /// Evictions whose destruction waited for a display slot to let go.
    pub deferred: u64,
}

/// Bookkeeping for one cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub access_count: u64,
    pub last_access: Instant,
}

/// What [`ResourceCache::evict`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictOutcome {
    /// Nothing was cached under that URL.
    NotCached,
    /// The entry was removed and released.
    Destroyed,
    /// The entry was removed but is still on display; it is released when
    /// its last slot lets go.
    Deferred,
}

/// Totals from [`ResourceCache::evict_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictSummary {
    pub destroyed: usize,
    pub deferred: usize,
}

/// What happened to the resource a slot displayed before a swap or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The slot was empty.
    Empty,
    /// The previous resource is still cached or shown elsewhere, so it
    /// was left alone.
    Kept,
    /// The previous resource had no other owner in the cache and was released.
    Destroyed,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

type LoadResult<R> = Result<Arc<R>, CacheError>;

struct Entry<R> {
    resource: Arc<R>,
    access_count: u64,
    last_access: Instant,
}

/// A load in flight. Every caller asking for the same URL awaits the same
/// shared future, so the loader runs once.
struct Pending<R> {
    generation: u64,
    load: Shared<BoxFuture<'static, LoadResult<R>>>,
}

struct Inner<R> {
    entries: HashMap<String, Entry<R>>,
    pending: HashMap<String, Pending<R>>,
    slots: HashMap<SlotId, Option<Arc<R>>>,
    /// Evicted while displayed; released once no slot shows them.
    retired: Vec<Arc<R>>,
    stats: CacheStats,
    next_generation: u64,
}

impl<R> Inner<R> {
    fn is_displayed(&self, resource: &Arc<R>) -> bool {
        self.slots
            .values()
            .flatten()
            .any(|shown| Arc::ptr_eq(shown, resource))
    }

    fn is_cached(&self, resource: &Arc<R>) -> bool {
        self.entries
            .values()
            .any(|entry| Arc::ptr_eq(&entry.resource, resource))
    }

    /// Removes an entry from the cache, deferring release while displayed.
    fn retire(&mut self, url: &str, entry: Entry<R>) -> EvictOutcome {
        if self.is_displayed(&entry.resource) {
            self.retired.push(entry.resource);
            self.stats.deferred += 1;
            tracing::debug!(url, "evicted while displayed, release deferred");
            EvictOutcome::Deferred
        } else {
            self.stats.destroyed += 1;
            tracing::debug!(url, "evicted");
            EvictOutcome::Destroyed
        }
    }

    /// Decides the fate of a resource a slot just stopped showing.
    fn release(&mut self, previous: Option<Arc<R>>) -> SwapOutcome {
        let Some(previous) = previous else {
            return SwapOutcome::Empty;
        };
        if self.is_displayed(&previous) || self.is_cached(&previous) {
            return SwapOutcome::Kept;
        }
        if let Some(index) = self.retired.iter().position(|r| Arc::ptr_eq(r, &previous)) {
            self.retired.swap_remove(index);
            tracing::debug!("deferred release completed");
        }
        self.stats.destroyed += 1;
        SwapOutcome::Destroyed
    }

    /// Evicts least recently used, undisplayed entries until the cache fits.
    /// `keep` is never evicted (it was just inserted).
    fn enforce_capacity(&mut self, capacity: Option<usize>, keep: &str) {
        let Some(capacity) = capacity else {
            return;
        };

        while self.entries.len() > capacity {
            let victim = self
                .entries
                .iter()
                .filter(|(url, entry)| url.as_str() != keep && !self.is_displayed(&entry.resource))
                .min_by_key(|(_, entry)| entry.last_access)
                .map(|(url, _)| url.clone());

            let Some(url) = victim else {
                tracing::debug!(len = self.entries.len(), capacity, "over capacity, all entries displayed");
                return;
            };
            if let Some(entry) = self.entries.remove(&url) {
                tracing::debug!(url = %url, "evicting least recently used");
                self.retire(&url, entry);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ResourceCache
// ---------------------------------------------------------------------------

/// URL-keyed cache of loaded resources, shared across flows.
///
/// Cloning gives another handle to the same cache. Resources are handed
/// out as `Arc<R>`; the cache tracks which of them are currently shown in
/// a display slot so that eviction never pulls a resource out from under
/// the screen.
///
/// ```text
///          get_or_load(url)
///                │
///     ┌──────────┼────────────────┐
///   cached    loading          neither
///     │          │                │
///   hit     join pending     run loader once,
///               load         cache on success
/// ```
pub struct ResourceCache<R> {
    inner: Arc<Mutex<Inner<R>>>,
    config: Arc<CacheConfig>,
}

impl<R> Clone for ResourceCache<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R: Send + Sync + 'static> Default for ResourceCache<R> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<R: Send + Sync + 'static> ResourceCache<R> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                pending: HashMap::new(),
                slots: HashMap::new(),
                retired: Vec::new(),
                stats: CacheStats::default(),
                next_generation: 0,
            })),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the resource cached under `url`, loading it on a miss.
    ///
    /// On a hit, the entry's access count and last-access time are updated
    /// and `loader` is not called. On a miss, `loader` is called at most
    /// once per URL no matter how many callers ask while the load is in
    /// flight; they all receive the same `Arc`. A failed load is reported
    /// to every waiting caller and leaves nothing behind, so the next call
    /// tries again.
    ///
    /// `loader` runs while the cache is locked and must only build the
    /// future, not call back into the cache.
    pub async fn get_or_load<F, Fut, E>(&self, url: &str, loader: F) -> Result<Arc<R>, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let (generation, load) = {
            let mut guard = self.lock();
            let inner = &mut *guard;

            if let Some(entry) = inner.entries.get_mut(url) {
                entry.access_count += 1;
                entry.last_access = Instant::now();
                inner.stats.hits += 1;
                tracing::trace!(url, access_count = entry.access_count, "cache hit");
                return Ok(Arc::clone(&entry.resource));
            }

            inner.stats.misses += 1;
            if let Some(pending) = inner.pending.get(url) {
                tracing::debug!(url, "joining in-flight load");
                (pending.generation, pending.load.clone())
            } else {
                let generation = inner.next_generation;
                inner.next_generation += 1;
                inner.stats.loads += 1;

                let owned_url = url.to_string();
                let fut = loader();
                let load = async move {
                    fut.await.map(Arc::new).map_err(|e| CacheError::Load {
                        url: owned_url,
                        reason: e.to_string(),
                    })
                }
                .boxed()
                .shared();

                inner.pending.insert(
                    url.to_string(),
                    Pending {
                        generation,
                        load: load.clone(),
                    },
                );
                tracing::debug!(url, "cache miss, loading");
                (generation, load)
            }
        };

        let result = load.await;

        let mut guard = self.lock();
        let inner = &mut *guard;

        // The first waiter to finish settles the load for everyone. A load
        // detached by an eviction settles nothing.
        let settles = inner
            .pending
            .get(url)
            .is_some_and(|p| p.generation == generation);

        if settles {
            inner.pending.remove(url);
            match &result {
                Ok(resource) => {
                    inner.entries.insert(
                        url.to_string(),
                        Entry {
                            resource: Arc::clone(resource),
                            access_count: 1,
                            last_access: Instant::now(),
                        },
                    );
                    tracing::debug!(url, "resource cached");
                    inner.enforce_capacity(self.config.capacity, url);
                }
                Err(error) => {
                    inner.stats.failed_loads += 1;
                    tracing::warn!(url, %error, "resource load failed, not cached");
                }
            }
        } else if let Ok(resource) = &result {
            if let Some(entry) = inner
                .entries
                .get_mut(url)
                .filter(|e| Arc::ptr_eq(&e.resource, resource))
            {
                entry.access_count += 1;
                entry.last_access = Instant::now();
            }
        }

        result
    }

    /// Removes `url` from the cache.
    ///
    /// If the resource is on display it stays alive until its last slot
    /// lets go; the cache never releases a resource that is being shown.
    /// A load still in flight for `url` is detached: its waiters still get
    /// the result, but it is not cached and the next call loads afresh.
    pub fn evict(&self, url: &str) -> EvictOutcome {
        let mut inner = self.lock();
        if inner.pending.remove(url).is_some() {
            tracing::debug!(url, "in-flight load detached");
        }
        match inner.entries.remove(url) {
            Some(entry) => inner.retire(url, entry),
            None => EvictOutcome::NotCached,
        }
    }

    /// Removes every entry, deferring those on display, and detaches every
    /// load in flight.
    pub fn evict_all(&self) -> EvictSummary {
        let mut inner = self.lock();
        inner.pending.clear();
        let entries: Vec<_> = inner.entries.drain().collect();

        let mut summary = EvictSummary::default();
        for (url, entry) in entries {
            match inner.retire(&url, entry) {
                EvictOutcome::Destroyed => summary.destroyed += 1,
                EvictOutcome::Deferred => summary.deferred += 1,
                EvictOutcome::NotCached => {}
            }
        }
        tracing::info!(
            destroyed = summary.destroyed,
            deferred = summary.deferred,
            "cache cleared"
        );
        summary
    }

    // -- Display slots ------------------------------------------------------

    /// Registers a new, empty display target.
    pub fn open_slot(&self) -> SlotId {
        let slot = SlotId(NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed));
        self.lock().slots.insert(slot, None);
        tracing::trace!(%slot, "display slot opened");
        slot
    }

    /// Shows `resource` in `slot`, replacing whatever was there.
    ///
    /// The replaced resource is released only if it is neither a cached
    /// entry nor shown in another slot.
    pub fn assign(&self, slot: SlotId, resource: Arc<R>) -> Result<SwapOutcome, CacheError> {
        let mut inner = self.lock();
        let previous = inner
            .slots
            .get_mut(&slot)
            .ok_or(CacheError::UnknownSlot(slot))?
            .replace(resource);
        Ok(inner.release(previous))
    }

    /// Empties `slot` but keeps it registered.
    pub fn clear_slot(&self, slot: SlotId) -> Result<SwapOutcome, CacheError> {
        let mut inner = self.lock();
        let previous = inner
            .slots
            .get_mut(&slot)
            .ok_or(CacheError::UnknownSlot(slot))?
            .take();
        Ok(inner.release(previous))
    }

    /// Unregisters `slot`, releasing what it showed under the same rules
    /// as [`assign`](Self::assign).
    pub fn close_slot(&self, slot: SlotId) -> Result<SwapOutcome, CacheError> {
        let mut inner = self.lock();
        let previous = inner
            .slots
            .remove(&slot)
            .ok_or(CacheError::UnknownSlot(slot))?;
        tracing::trace!(%slot, "display slot closed");
        Ok(inner.release(previous))
    }

    /// What `slot` currently shows. `None` for an empty or unknown slot.
    pub fn displayed(&self, slot: SlotId) -> Option<Arc<R>> {
        self.lock().slots.get(&slot).cloned().flatten()
    }

    // -- Inspection ---------------------------------------------------------

    pub fn contains(&self, url: &str) -> bool {
        self.lock().entries.contains_key(url)
    }

    pub fn is_loading(&self, url: &str) -> bool {
        self.lock().pending.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Number of evicted resources still waiting on a display slot.
    pub fn retired_len(&self) -> usize {
        self.lock().retired.len()
    }

    pub fn entry_info(&self, url: &str) -> Option<EntryInfo> {
        self.lock().entries.get(url).map(|e| EntryInfo {
            access_count: e.access_count,
            last_access: e.last_access,
        })
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_id_display() {
        assert_eq!(SlotId(7).to_string(), "slot-7");
    }

    #[test]
    fn test_slot_ids_are_unique() {
        let cache: ResourceCache<u8> = ResourceCache::default();
        let a = cache.open_slot();
        let b = cache.open_slot();
        assert_ne!(a, b);
    }

    #[test]
    fn test_unknown_slot_is_error() {
        let cache: ResourceCache<u8> = ResourceCache::default();
        let slot = cache.open_slot();
        cache.close_slot(slot).unwrap();

        assert_eq!(
            cache.assign(slot, Arc::new(1)),
            Err(CacheError::UnknownSlot(slot))
        );
        assert_eq!(cache.close_slot(slot), Err(CacheError::UnknownSlot(slot)));
        assert!(cache.displayed(slot).is_none());
    }

    #[test]
    fn test_release_of_uncached_resource_destroys_it() {
        let cache: ResourceCache<u8> = ResourceCache::default();
        let slot = cache.open_slot();

        assert_eq!(cache.assign(slot, Arc::new(1)).unwrap(), SwapOutcome::Empty);
        assert_eq!(cache.assign(slot, Arc::new(2)).unwrap(), SwapOutcome::Destroyed);
        assert_eq!(cache.clear_slot(slot).unwrap(), SwapOutcome::Destroyed);
        assert_eq!(cache.stats().destroyed, 2);
    }

    #[test]
    fn test_release_of_shared_display_keeps_it() {
        let cache: ResourceCache<u8> = ResourceCache::default();
        let (a, b) = (cache.open_slot(), cache.open_slot());
        let shared = Arc::new(9);

        cache.assign(a, Arc::clone(&shared)).unwrap();
        cache.assign(b, Arc::clone(&shared)).unwrap();
        assert_eq!(cache.close_slot(a).unwrap(), SwapOutcome::Kept);
        assert_eq!(cache.close_slot(b).unwrap(), SwapOutcome::Destroyed);
    }
}
