//! URL-keyed resource cache for Wayfarer.
//!
//! Images (actor portraits, generated art) are fetched once per URL and
//! shared by every part of the client that shows them. The cache knows
//! which resources are currently on screen through *display slots*, and
//! uses that to keep eviction safe:
//!
//! - evicting a displayed entry removes it from the cache but defers its
//!   release until the last slot showing it lets go
//! - swapping a slot's resource never releases a resource that is still
//!   cached or shown somewhere else
//!
//! Concurrent `get_or_load` calls for the same URL share one in-flight
//! load, so the loader runs once per miss.

mod cache;
mod config;
mod error;

pub use cache::{
    CacheStats, EntryInfo, EvictOutcome, EvictSummary, ResourceCache, SlotId, SwapOutcome,
};
pub use config::CacheConfig;
pub use error::CacheError;
