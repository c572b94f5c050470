//! Error types for the resource cache.

use crate::SlotId;

/// Errors returned by [`ResourceCache`](crate::ResourceCache).
///
/// `Clone` because one failed load is reported to every caller that was
/// waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// The loader failed. Nothing was cached; the next call loads again.
    #[error("failed to load {url}: {reason}")]
    Load { url: String, reason: String },

    /// The slot was never opened or has already been closed.
    #[error("unknown display slot {0}")]
    UnknownSlot(SlotId),
}
