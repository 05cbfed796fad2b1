// SPDX-License-Identifier: MPL-2.0
//! LRU thumbnail cache.
//!
//! # Design
//!
//! - **LRU eviction**: least recently used thumbnails are evicted first
//! - **Memory-bounded**: total cache size limited by a configurable byte limit
//! - **Size-aware keys**: entries are keyed by `(asset, edge_px)` so a
//!   target-size change never serves a stale resolution
//! - **Session-scoped**: the cache belongs to the coordinator and is cleared
//!   when the picker session ends

use crate::domain::{AssetId, ThumbnailImage};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Default cache size in bytes (16 MB).
/// At the default 100px edge (40 KB per thumbnail) this holds ~400 entries.
pub const DEFAULT_CACHE_BYTES: usize = 16 * 1024 * 1024;

/// Minimum cache size in bytes (2 MB).
pub const MIN_CACHE_BYTES: usize = 2 * 1024 * 1024;

/// Maximum cache size in bytes (64 MB).
pub const MAX_CACHE_BYTES: usize = 64 * 1024 * 1024;

/// Default maximum number of thumbnails to cache.
pub const DEFAULT_MAX_ENTRIES: usize = 512;

/// Minimum entries to cache.
pub const MIN_MAX_ENTRIES: usize = 32;

/// Maximum entries to cache.
pub const MAX_MAX_ENTRIES: usize = 4096;

/// Configuration for the thumbnail cache.
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum cache size in bytes.
    pub max_bytes: usize,

    /// Maximum number of thumbnails to cache.
    pub max_entries: usize,

    /// Whether caching is enabled.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_CACHE_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
            enabled: true,
        }
    }
}

impl CacheConfig {
    /// Creates a new cache configuration with specified limits.
    #[must_use]
    pub fn new(max_bytes: usize, max_entries: usize) -> Self {
        Self {
            max_bytes: max_bytes.clamp(MIN_CACHE_BYTES, MAX_CACHE_BYTES),
            max_entries: max_entries.clamp(MIN_MAX_ENTRIES, MAX_MAX_ENTRIES),
            enabled: true,
        }
    }

    /// Creates a disabled cache configuration.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Number of thumbnails currently in cache.
    pub entry_count: usize,

    /// Total bytes currently used by cached thumbnails.
    pub total_bytes: usize,

    /// Number of cache hits (thumbnail found).
    pub hits: u64,

    /// Number of cache misses (thumbnail not found).
    pub misses: u64,

    /// Number of thumbnails evicted due to limits.
    pub evictions: u64,

    /// Number of thumbnails inserted.
    pub insertions: u64,
}

impl CacheStats {
    /// Returns the cache hit rate as a percentage (0.0 - 100.0).
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

type CacheKey = (AssetId, u32);

#[derive(Debug, Clone)]
struct CacheEntry {
    image: ThumbnailImage,
    size_bytes: usize,
}

impl CacheEntry {
    fn new(image: ThumbnailImage) -> Self {
        let size_bytes = image.byte_len();
        Self { image, size_bytes }
    }
}

/// Memory-bounded LRU cache for decoded thumbnails.
pub struct ThumbnailCache {
    cache: LruCache<CacheKey, CacheEntry>,
    config: CacheConfig,
    current_bytes: usize,
    stats: CacheStats,
}

impl ThumbnailCache {
    /// Creates a new cache with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if `DEFAULT_MAX_ENTRIES` is zero, which would indicate a build
    /// configuration error.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(
            NonZeroUsize::new(DEFAULT_MAX_ENTRIES).expect("DEFAULT_MAX_ENTRIES must be non-zero"),
        );

        Self {
            cache: LruCache::new(capacity),
            config,
            current_bytes: 0,
            stats: CacheStats::default(),
        }
    }

    /// Creates a new cache with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    /// Whether caching is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Inserts a thumbnail for `asset` at `edge_px`.
    ///
    /// Returns `true` if the thumbnail was stored, `false` if caching is
    /// disabled or the image alone would occupy more than half the byte
    /// budget.
    pub fn insert(&mut self, asset: AssetId, edge_px: u32, image: ThumbnailImage) -> bool {
        if !self.config.enabled {
            return false;
        }

        let entry = CacheEntry::new(image);
        let image_size = entry.size_bytes;

        if image_size > self.config.max_bytes / 2 {
            return false;
        }

        while self.current_bytes + image_size > self.config.max_bytes && !self.cache.is_empty() {
            if let Some((_, evicted)) = self.cache.pop_lru() {
                self.current_bytes = self.current_bytes.saturating_sub(evicted.size_bytes);
                self.stats.evictions += 1;
            }
        }

        let key = (asset, edge_px);
        if let Some(existing) = self.cache.pop(&key) {
            self.current_bytes = self.current_bytes.saturating_sub(existing.size_bytes);
        }

        self.current_bytes += entry.size_bytes;
        self.cache.put(key, entry);
        self.stats.insertions += 1;
        self.stats.entry_count = self.cache.len();
        self.stats.total_bytes = self.current_bytes;

        true
    }

    /// Gets a thumbnail by asset and edge size, updating LRU order.
    pub fn get(&mut self, asset: &AssetId, edge_px: u32) -> Option<ThumbnailImage> {
        if !self.config.enabled {
            return None;
        }

        let key = (asset.clone(), edge_px);
        if let Some(entry) = self.cache.get(&key) {
            self.stats.hits += 1;
            Some(entry.image.clone())
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Checks for a cached thumbnail without updating LRU order.
    #[must_use]
    pub fn contains(&self, asset: &AssetId, edge_px: u32) -> bool {
        if !self.config.enabled {
            return false;
        }
        self.cache.contains(&(asset.clone(), edge_px))
    }

    /// Clears all cached thumbnails.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_bytes = 0;
        self.stats.entry_count = 0;
        self.stats.total_bytes = 0;
    }

    /// Returns the current cache statistics.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Returns the current number of cached thumbnails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the current memory usage in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        self.current_bytes
    }
}

impl std::fmt::Debug for ThumbnailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailCache")
            .field("enabled", &self.config.enabled)
            .field("entry_count", &self.cache.len())
            .field("memory_usage", &self.current_bytes)
            .field("max_bytes", &self.config.max_bytes)
            .field("max_entries", &self.config.max_entries)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_image(edge: u32) -> ThumbnailImage {
        ThumbnailImage::from_rgba(edge, edge, vec![0u8; (edge * edge * 4) as usize])
    }

    fn asset(id: &str) -> AssetId {
        AssetId::new(id)
    }

    #[test]
    fn new_cache_is_empty() {
        let cache = ThumbnailCache::with_defaults();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.memory_usage(), 0);
    }

    #[test]
    fn insert_and_get_thumbnail() {
        let mut cache = ThumbnailCache::with_defaults();

        assert!(cache.insert(asset("a"), 100, test_image(100)));
        assert_eq!(cache.len(), 1);

        let retrieved = cache.get(&asset("a"), 100);
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().width(), 100);
    }

    #[test]
    fn size_change_misses_old_entries() {
        let mut cache = ThumbnailCache::with_defaults();
        cache.insert(asset("a"), 100, test_image(100));

        assert!(cache.get(&asset("a"), 50).is_none());
        assert!(cache.get(&asset("a"), 100).is_some());
    }

    #[test]
    fn disabled_cache_returns_none() {
        let mut cache = ThumbnailCache::new(CacheConfig::disabled());

        assert!(!cache.insert(asset("a"), 100, test_image(100)));
        assert!(cache.get(&asset("a"), 100).is_none());
        assert!(!cache.contains(&asset("a"), 100));
    }

    #[test]
    fn lru_eviction_on_byte_limit() {
        let config = CacheConfig {
            max_bytes: 200_000, // each 100px thumbnail is 40,000 bytes
            max_entries: 1000,
            enabled: true,
        };
        let mut cache = ThumbnailCache::new(config);

        for i in 0..10 {
            cache.insert(asset(&format!("asset-{i}")), 100, test_image(100));
        }

        assert!(cache.memory_usage() <= 200_000);
        assert!(cache.stats().evictions > 0);
        // Most recently inserted entries survive
        assert!(cache.contains(&asset("asset-9"), 100));
        assert!(!cache.contains(&asset("asset-0"), 100));
    }

    #[test]
    fn oversized_thumbnail_not_cached() {
        let config = CacheConfig::new(MIN_CACHE_BYTES, 100);
        let mut cache = ThumbnailCache::new(config);

        // 1024px RGBA is 4 MB, more than half of the 2 MB budget
        assert!(!cache.insert(asset("big"), 1024, test_image(1024)));
        assert!(cache.is_empty());
    }

    #[test]
    fn duplicate_key_updates_entry() {
        let mut cache = ThumbnailCache::with_defaults();

        cache.insert(asset("a"), 100, test_image(100));
        let initial_bytes = cache.memory_usage();
        cache.insert(asset("a"), 100, test_image(100));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.memory_usage(), initial_bytes);
    }

    #[test]
    fn clear_removes_everything() {
        let mut cache = ThumbnailCache::with_defaults();
        for i in 0..5 {
            cache.insert(asset(&format!("asset-{i}")), 50, test_image(50));
        }

        assert_eq!(cache.len(), 5);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.memory_usage(), 0);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let mut cache = ThumbnailCache::with_defaults();
        cache.insert(asset("a"), 100, test_image(100));

        let _ = cache.get(&asset("a"), 100);
        let _ = cache.get(&asset("missing"), 100);

        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 1);
        assert!((cache.stats().hit_rate() - 50.0).abs() < 0.01);
    }

    #[test]
    fn config_clamps_values() {
        let config = CacheConfig::new(0, 0);
        assert_eq!(config.max_bytes, MIN_CACHE_BYTES);
        assert_eq!(config.max_entries, MIN_MAX_ENTRIES);

        let config = CacheConfig::new(usize::MAX, usize::MAX);
        assert_eq!(config.max_bytes, MAX_CACHE_BYTES);
        assert_eq!(config.max_entries, MAX_MAX_ENTRIES);
    }
}
