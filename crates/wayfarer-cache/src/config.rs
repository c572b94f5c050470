//! Cache configuration.

/// Sizing for a [`ResourceCache`](crate::ResourceCache).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached entries. `None` means unbounded.
    ///
    /// When an insert pushes the cache past this, the least recently used
    /// entries that are not on display are evicted until it fits again.
    /// Displayed entries are never evicted for capacity, so the cache can
    /// temporarily exceed the limit while they stay on screen.
    pub capacity: Option<usize>,
}

impl CacheConfig {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }
}
