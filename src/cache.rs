//! Bounded, time-limited caches built on Moka.
//!
//! The translation cache maps `(text, source_lang, target_lang)` to a shared
//! translation result. Entries expire after a fixed time-to-live and, once the
//! cache is full, the least recently used entry is evicted.
//!
//! Moka's entry API (`or_try_insert_with`) coalesces concurrent misses on the
//! same key so the underlying translation runs at most once per key at a time,
//! while reads of other keys proceed without blocking.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::models::TranslationResult;

/// Composite cache key for a translation request.
///
/// Cultural context is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TranslationKey {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl TranslationKey {
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

/// Translation result cache. Values are `Arc`ed so a hit hands back the very
/// object that was cached.
pub type TranslationCache = Cache<TranslationKey, Arc<TranslationResult>>;

/// Create the translation cache.
pub fn translation_cache(max_capacity: u64, ttl: Duration) -> TranslationCache {
    ttl_lru_cache("translation", max_capacity, ttl)
}

/// Create a cache with a fixed time-to-live and LRU eviction.
pub fn ttl_lru_cache<K, V>(name: &str, max_capacity: u64, ttl: Duration) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .name(name)
        .max_capacity(max_capacity)
        .time_to_live(ttl)
        .eviction_policy(EvictionPolicy::lru())
        .build()
}

/// Create a size-bounded LRU cache without expiry.
pub fn lru_cache<K, V>(name: &str, max_capacity: u64) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .name(name)
        .max_capacity(max_capacity)
        .eviction_policy(EvictionPolicy::lru())
        .build()
}
