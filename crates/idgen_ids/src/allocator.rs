//! Run-scoped identifier allocation.
//!
//! An [`IdAllocator`] owns every piece of mutable state for one batch: the
//! hash memo and the set of identifiers issued so far. Nothing is shared
//! between runs.

use idgen_protocol::defaults::MAX_COLLISION_ATTEMPTS;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::cache::HashCache;
use crate::digest::{canonical_key, content_hash, HashSettings};
use crate::strategy::{random_unique_id, sequential_id, IdStrategy};

type DigestFn = fn(&str, &HashSettings) -> String;

/// Counters describing how identifiers were obtained in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllocationStats {
    /// Identifiers handed out, one per `allocate` call
    pub allocated: usize,
    /// Repeated names that reused the identifier of an earlier occurrence
    pub reused: usize,
    /// Hash collisions resolved by rehashing a suffixed name
    pub suffix_resolved: usize,
    /// Collisions that exhausted the retry budget and fell back to a random token
    pub random_fallbacks: usize,
}

pub struct IdAllocator {
    strategy: IdStrategy,
    cache: HashCache,
    digest: DigestFn,
    /// identifier -> canonical name that owns it
    issued: HashMap<String, String>,
    /// canonical name -> identifier, content-hash strategy only
    by_name: HashMap<String, String>,
    next_index: usize,
    stats: AllocationStats,
}

impl IdAllocator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self {
            strategy,
            cache: HashCache::new(),
            digest: content_hash,
            issued: HashMap::new(),
            by_name: HashMap::new(),
            next_index: 0,
            stats: AllocationStats::default(),
        }
    }

    #[cfg(test)]
    fn with_digest(strategy: IdStrategy, digest: DigestFn) -> Self {
        Self {
            digest,
            ..Self::new(strategy)
        }
    }

    pub fn strategy(&self) -> &IdStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> AllocationStats {
        self.stats
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// Identifier for the next record named `name`.
    pub fn allocate(&mut self, name: &str) -> String {
        self.stats.allocated += 1;
        self.next_index += 1;

        let id = match &self.strategy {
            IdStrategy::ContentHash(settings) => {
                let settings = settings.clone();
                return self.allocate_hash(name, &settings);
            }
            IdStrategy::Sequential { prefix, width } => {
                sequential_id(self.next_index, prefix, *width)
            }
            IdStrategy::RandomUnique => self.fresh_random(),
        };

        self.issued.insert(id.clone(), canonical_key(name));
        id
    }

    fn allocate_hash(&mut self, name: &str, settings: &HashSettings) -> String {
        let owner = canonical_key(name);
        if let Some(existing) = self.by_name.get(&owner) {
            self.stats.reused += 1;
            return existing.clone();
        }

        let base = self.hash_of(name, settings);
        let id = if self.is_free_for(&base, &owner) {
            base
        } else {
            self.resolve_collision(name, &owner, settings)
        };

        self.issued.insert(id.clone(), owner.clone());
        self.by_name.insert(owner, id.clone());
        id
    }

    fn resolve_collision(&mut self, name: &str, owner: &str, settings: &HashSettings) -> String {
        for attempt in 1..=MAX_COLLISION_ATTEMPTS {
            let variant = format!("{}_{}", name.trim(), attempt);
            let candidate = self.hash_of(&variant, settings);
            if self.is_free_for(&candidate, owner) {
                debug!(name, attempt, "Resolved hash collision with suffixed name");
                self.stats.suffix_resolved += 1;
                return candidate;
            }
        }

        warn!(
            name,
            attempts = MAX_COLLISION_ATTEMPTS,
            "Hash collision retries exhausted; using random identifier"
        );
        self.stats.random_fallbacks += 1;
        self.fresh_random()
    }

    fn hash_of(&mut self, name: &str, settings: &HashSettings) -> String {
        let digest = self.digest;
        self.cache.get_or_compute(name, || digest(name, settings))
    }

    fn is_free_for(&self, id: &str, owner: &str) -> bool {
        match self.issued.get(id) {
            None => true,
            Some(existing) => existing == owner,
        }
    }

    fn fresh_random(&self) -> String {
        loop {
            let id = random_unique_id();
            if !self.issued.contains_key(&id) {
                return id;
            }
        }
    }
}
