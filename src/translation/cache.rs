/*!
 * Translation caching functionality.
 *
 * Identical protected source text is translated once per run. Both accepted
 * translations and passthrough fallbacks are stored, so a unit whose
 * translation was rejected is not retried when the same text comes back.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key combining protected source text and target language
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Protected source text, exact match
    source_text: String,

    /// Target language code
    target_language: String,
}

impl CacheKey {
    /// Create a new cache key
    pub fn new(source_text: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

/// What was written for a source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedTranslation {
    /// A validated translation, still in protected form
    Accepted(String),
    /// Every attempt was rejected and the protected source was written instead
    Passthrough(String),
}

impl CachedTranslation {
    /// Protected text to write
    pub fn text(&self) -> &str {
        match self {
            Self::Accepted(text) | Self::Passthrough(text) => text,
        }
    }

    /// Whether this entry is a fallback rather than a translation
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }
}

/// Translation cache for storing and retrieving translations
#[derive(Debug, Clone)]
pub struct TranslationCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, CachedTranslation>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Get a translation from the cache
    pub fn get(&self, source_text: &str, target_language: &str) -> Option<CachedTranslation> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, target_language);
        let cached = self.cache.read().get(&key).cloned();

        match cached {
            Some(translation) => {
                *self.hits.write() += 1;
                debug!(
                    "Cache hit for '{}' (-> {})",
                    truncate_text(source_text, 30),
                    target_language
                );
                Some(translation)
            }
            None => {
                *self.misses.write() += 1;
                None
            }
        }
    }

    /// Store a translation in the cache
    pub fn store(&self, source_text: &str, target_language: &str, translation: CachedTranslation) {
        if !self.enabled {
            return;
        }

        let key = CacheKey::new(source_text, target_language);
        self.cache.write().insert(key, translation);

        debug!(
            "Cached translation for '{}' (-> {})",
            truncate_text(source_text, 30),
            target_language
        );
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;

        debug!("Translation cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
