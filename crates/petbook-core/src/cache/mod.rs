//! Read-through resource cache.
//!
//! One entry per logical query (`CacheKey`), request collapsing for
//! concurrent readers, and targeted invalidation after mutations.

mod resource;

pub use resource::{CacheKey, InvalidationTarget, ResourceCache, ResourceValue};
