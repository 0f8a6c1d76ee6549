use std::collections::HashMap;

use crate::digest::canonical_key;

/// Memo of name -> content hash for a single generation run.
///
/// Purely an optimization: a miss recomputes the same digest. The cache is
/// owned by one allocator and dropped with it.
#[derive(Debug, Default)]
pub struct HashCache {
    entries: HashMap<String, String>,
    hits: u64,
    misses: u64,
}

impl HashCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Memoized value for `name`, computing it with `compute` on a miss.
    ///
    /// Entries are keyed by the canonical name only, so one cache must only
    /// ever see one digest function and `HashSettings`.
    pub fn get_or_compute(&mut self, name: &str, compute: impl FnOnce() -> String) -> String {
        let key = canonical_key(name);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }
        self.misses += 1;
        let value = compute();
        self.entries.insert(key, value.clone());
        value
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::{content_hash, HashSettings};

    #[test]
    fn test_cache_matches_recomputation() {
        let settings = HashSettings::default();
        let mut cache = HashCache::new();

        let first = cache.get_or_compute("Ann", || content_hash("Ann", &settings));
        let second = cache.get_or_compute("ann ", || unreachable!("cached"));
        assert_eq!(first, second);
        assert_eq!(first, content_hash("Ann", &settings));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_or_compute("Ann", || content_hash("Ann", &settings)), first);
        assert_eq!(cache.misses(), 1);
    }
}
