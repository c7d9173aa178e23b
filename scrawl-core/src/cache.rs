//! Content-addressed cache of computed layouts.
//!
//! Keys are a hash of everything pagination depends on, so an unchanged
//! answer set is served from memory and any edit misses and re-paginates.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Instant;

use crate::{Answer, HandwrittenFont, Layout, PageStyle};

/// Identity of a layout request: the answer texts, font id and page style.
///
/// Word counts are not part of the key: they never affect pagination.
/// Lookups go through a 64-bit hash, and equal hashes are confirmed against
/// the stored inputs so a collision is a miss rather than a wrong layout.
#[derive(Debug, Clone)]
pub struct LayoutKey {
    hash: u64,
    inputs: Arc<KeyInputs>,
}

#[derive(Debug, PartialEq, Eq)]
struct KeyInputs {
    answers: Vec<(u32, String)>,
    font_id: String,
    style: PageStyle,
}

impl LayoutKey {
    /// Compute the key for a layout request.
    #[must_use]
    pub fn new(answers: &[Answer], font: &HandwrittenFont, style: PageStyle) -> Self {
        let mut hasher = DefaultHasher::new();
        answers.len().hash(&mut hasher);
        for answer in answers {
            answer.question_number.hash(&mut hasher);
            answer.content.hash(&mut hasher);
        }
        font.id.hash(&mut hasher);
        style.hash(&mut hasher);
        Self::with_hash(hasher.finish(), answers, font, style)
    }

    fn with_hash(hash: u64, answers: &[Answer], font: &HandwrittenFont, style: PageStyle) -> Self {
        Self {
            hash,
            inputs: Arc::new(KeyInputs {
                answers: answers
                    .iter()
                    .map(|a| (a.question_number, a.content.clone()))
                    .collect(),
                font_id: font.id.clone(),
                style,
            }),
        }
    }

    /// Raw hash value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for LayoutKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && (Arc::ptr_eq(&self.inputs, &other.inputs) || self.inputs == other.inputs)
    }
}

impl Eq for LayoutKey {}

impl Hash for LayoutKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

/// Entry in the layout cache.
#[derive(Debug)]
struct CacheEntry {
    layout: Arc<Layout>,
    last_accessed: Instant,
}

/// Configuration for the layout cache.
#[derive(Debug, Clone)]
pub struct LayoutCacheConfig {
    /// Maximum number of layouts kept; the least recently used is evicted.
    pub max_entries: usize,
}

impl Default for LayoutCacheConfig {
    fn default() -> Self {
        Self { max_entries: 32 }
    }
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of evictions.
    pub evictions: u64,
}

/// Layout cache owned by a single engine.
#[derive(Debug)]
pub struct LayoutCache {
    entries: HashMap<LayoutKey, CacheEntry>,
    config: LayoutCacheConfig,
    stats: CacheStats,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    /// Create a cache with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(LayoutCacheConfig::default())
    }

    /// Create a cache with custom configuration.
    #[must_use]
    pub fn with_config(config: LayoutCacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            stats: CacheStats::default(),
        }
    }

    /// Look up a layout, recording a hit or miss.
    pub fn get(&mut self, key: &LayoutKey) -> Option<Arc<Layout>> {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_accessed = Instant::now();
            self.stats.hits += 1;
            Some(Arc::clone(&entry.layout))
        } else {
            self.stats.misses += 1;
            None
        }
    }

    /// Insert a layout, evicting the least recently used entry when full.
    ///
    /// A cache configured with `max_entries == 0` stores nothing.
    pub fn insert(&mut self, key: LayoutKey, layout: Arc<Layout>) {
        if self.config.max_entries == 0 {
            return;
        }
        if !self.entries.contains_key(&key) {
            while self.entries.len() >= self.config.max_entries {
                if !self.evict_lru() {
                    break;
                }
            }
        }
        self.entries.insert(
            key,
            CacheEntry {
                layout,
                last_accessed: Instant::now(),
            },
        );
    }

    /// Check whether a key is cached without touching statistics.
    #[must_use]
    pub fn contains(&self, key: &LayoutKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Drop every cached layout.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached layouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics.
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn evict_lru(&mut self) -> bool {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());

        match oldest {
            Some(key) => {
                self.entries.remove(&key);
                self.stats.evictions += 1;
                tracing::trace!("Evicted cached layout {:016x}", key.value());
                true
            }
            None => false,
        }
    }
}
