use lru::LruCache;
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::error::Result;
use crate::index::TripleIndex;
use crate::model::{Direction, Element, Language};

type LookupKey = (String, String, Direction);

/// Thread-safe LRU cache for property lookups
///
/// Label and type lookups repeat heavily across questions (every answer line
/// resolves labels), so successful `lookup_property` results are memoized.
/// Misses and failures always go to the wrapped index.
pub struct CachedIndex<I> {
    inner: I,
    cache: Option<Mutex<LruCache<LookupKey, BTreeSet<String>>>>,
}

impl<I: TripleIndex> CachedIndex<I> {
    /// Wrap `inner` with a cache of `capacity` entries; 0 disables caching
    pub fn new(inner: I, capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { inner, cache }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }

    /// Get the current number of cached entries
    pub fn len(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.lock().unwrap_or_else(|e| e.into_inner()).len(),
            None => 0,
        }
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries from the cache
    pub fn clear(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
        }
    }
}

impl<I: TripleIndex> TripleIndex for CachedIndex<I> {
    fn lookup_property(&self, field: &str, anchor: &str, direction: Direction) -> Result<BTreeSet<String>> {
        let Some(cache) = &self.cache else {
            return self.inner.lookup_property(field, anchor, direction);
        };
        let key = (field.to_string(), anchor.to_string(), direction);
        if let Some(hit) = cache.lock().unwrap_or_else(|e| e.into_inner()).get(&key) {
            return Ok(hit.clone());
        }
        // Lock released during the lookup; concurrent misses may both query the index
        let values = self.inner.lookup_property(field, anchor, direction)?;
        cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .put(key, values.clone());
        Ok(values)
    }

    fn lookup_topics_by_label_or_type(&self, term: &str, language: &Language) -> Result<BTreeSet<Element>> {
        self.inner.lookup_topics_by_label_or_type(term, language)
    }
}
