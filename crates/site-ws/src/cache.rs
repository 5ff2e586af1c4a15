//! # Response Cache
//!
//! In-memory cache for web service responses, backed by Moka.
//!
//! Entries are stored without a fixed lifetime; freshness is judged per
//! read against the update frequency the caller declares. The same entry
//! can therefore be fresh for a "rarely updated" read and already stale
//! for a "usually updated" one. Stale entries stay in the cache so that
//! offline reads and failure fallbacks can still serve them.

use std::fmt;
use std::time::{Duration, SystemTime};

use moka::future::Cache as MokaCache;
use serde_json::Value;
use tracing::debug;

/// Key addressing one cached web service response.
///
/// Keys are plain strings assembled by the calling component, typically
/// `component:category:id` (for example `modH5PActivity:accessInfo:42`),
/// so that every component keeps its own namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often the remote data behind a read is expected to change.
///
/// The frequency selects which TTL from [`CacheConfig`] applies to a
/// cached entry for that particular read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateFrequency {
    /// Data that changes within minutes, e.g. per-user permissions.
    Usually,
    /// Data that changes several times an hour.
    Often,
    /// Data that changes a few times a day.
    Sometimes,
    /// Mostly static data, e.g. course content lists.
    Rarely,
}

impl Default for UpdateFrequency {
    fn default() -> Self {
        UpdateFrequency::Usually
    }
}

/// Tuning for one site's response cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Master switch; a disabled cache never stores and never serves
    pub enabled: bool,

    /// Maximum number of cached responses before eviction
    pub max_entries: u64,

    /// Lifetime applied to [`UpdateFrequency::Usually`] reads
    pub usually_ttl: Duration,

    /// Lifetime applied to [`UpdateFrequency::Often`] reads
    pub often_ttl: Duration,

    /// Lifetime applied to [`UpdateFrequency::Sometimes`] reads
    pub sometimes_ttl: Duration,

    /// Lifetime applied to [`UpdateFrequency::Rarely`] reads
    pub rarely_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 2048,
            usually_ttl: Duration::from_secs(420),
            often_ttl: Duration::from_secs(1200),
            sometimes_ttl: Duration::from_secs(3600),
            rarely_ttl: Duration::from_secs(43200),
        }
    }
}

impl CacheConfig {
    /// TTL for a read with the given declared frequency.
    pub fn ttl(&self, frequency: UpdateFrequency) -> Duration {
        match frequency {
            UpdateFrequency::Usually => self.usually_ttl,
            UpdateFrequency::Often => self.often_ttl,
            UpdateFrequency::Sometimes => self.sometimes_ttl,
            UpdateFrequency::Rarely => self.rarely_ttl,
        }
    }
}

/// Per-call cache behavior for a read operation.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Key under which the response is cached; `None` disables caching
    /// for this call entirely.
    pub cache_key: Option<CacheKey>,

    /// Declared change rate of the remote data, selects the TTL.
    pub frequency: UpdateFrequency,

    /// Accept cached entries regardless of age. Used for offline-first
    /// reads; a cold cache still falls through to the network.
    pub omit_expires: bool,

    /// Ignore cached entries when reading. The fresh response is still
    /// stored afterwards.
    pub skip_cache: bool,
}

impl ReadOptions {
    /// Options for a cached read with the given key and frequency.
    pub fn cached(key: CacheKey, frequency: UpdateFrequency) -> Self {
        Self {
            cache_key: Some(key),
            frequency,
            omit_expires: false,
            skip_cache: false,
        }
    }
}

/// Entry in the response cache
#[derive(Clone)]
struct CacheEntry {
    /// Raw response payload
    payload: Value,
    /// When the response was stored
    stored_at: SystemTime,
}

impl CacheEntry {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            stored_at: SystemTime::now(),
        }
    }

    /// Age of the entry; a clock that moved backwards counts as zero.
    fn age(&self) -> Duration {
        self.stored_at.elapsed().unwrap_or_default()
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() <= ttl
    }
}

/// Response cache shared by all reads of one site session
#[derive(Clone)]
pub struct WsCache {
    /// Moka cache for storing entries
    entries: MokaCache<CacheKey, CacheEntry>,
    /// Cache tuning, including the per-frequency TTL table
    config: CacheConfig,
}

impl WsCache {
    /// Create a cache with the given tuning.
    pub fn new(config: CacheConfig) -> Self {
        let entries = MokaCache::builder().max_capacity(config.max_entries).build();
        Self { entries, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Look up a cached response.
    ///
    /// Returns the payload when an entry exists and is fresh for the
    /// given frequency, or regardless of age when `omit_expires` is set.
    /// Expired entries are left in place; a later lookup may still
    /// accept them as stale.
    pub async fn lookup(
        &self,
        key: &CacheKey,
        frequency: UpdateFrequency,
        omit_expires: bool,
    ) -> Option<Value> {
        if !self.config.enabled {
            return None;
        }

        let entry = self.entries.get(key).await?;
        let ttl = self.config.ttl(frequency);

        if omit_expires || entry.is_fresh(ttl) {
            debug!(key = %key, age = ?entry.age(), "cache hit");
            Some(entry.payload)
        } else {
            debug!(key = %key, age = ?entry.age(), ttl = ?ttl, "cache entry expired for this read");
            None
        }
    }

    /// Store a response, replacing any previous entry under the key.
    pub async fn put(&self, key: CacheKey, payload: Value) {
        if !self.config.enabled {
            return;
        }
        self.entries.insert(key, CacheEntry::new(payload)).await;
    }

    /// Drop the entry under the key, if any.
    ///
    /// Dropped entries are gone for every read mode, including
    /// `omit_expires`; there is no stale copy left to serve.
    pub async fn invalidate(&self, key: &CacheKey) {
        if !self.config.enabled {
            return;
        }
        self.entries.invalidate(key).await;
        debug!(key = %key, "cache entry invalidated");
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.invalidate_all();
        debug!("response cache cleared");
    }
}
