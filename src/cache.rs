//! Bounded SMILES to 3D-molfile cache.
//!
//! Embedding a SMILES string means a subprocess call, so repeated molecules
//! within a run are served from here. The oldest entry is evicted once the
//! capacity is reached.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    capacity: usize,
    entries: HashMap<String, String>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl EmbeddingCache {
    /// A cache holding at most `capacity` entries. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        EmbeddingCache {
            capacity,
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, smiles: &str) -> bool {
        self.entries.contains_key(smiles)
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Cached molfile for `smiles`, counting a hit or a miss.
    pub fn get(&mut self, smiles: &str) -> Option<&str> {
        match self.entries.get(smiles) {
            Some(sdf) => {
                self.hits += 1;
                Some(sdf.as_str())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, smiles: String, sdf: String) {
        if self.capacity == 0 {
            return;
        }
        if let Some(existing) = self.entries.get_mut(&smiles) {
            *existing = sdf;
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            log::debug!("evicting cached embedding for {oldest}");
            self.entries.remove(&oldest);
        }
        self.order.push_back(smiles.clone());
        self.entries.insert(smiles, sdf);
    }

    /// Cached value for `smiles`, computing and storing it with `embed` on a
    /// miss. Errors from `embed` are returned and nothing is stored.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        smiles: &str,
        embed: impl FnOnce(&str) -> Result<String, E>,
    ) -> Result<String, E> {
        if let Some(sdf) = self.get(smiles) {
            return Ok(sdf.to_string());
        }
        log::debug!("embedding cache miss for {smiles}");
        let sdf = embed(smiles)?;
        self.insert(smiles.to_string(), sdf.clone());
        Ok(sdf)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        EmbeddingCache::new(crate::config::DEFAULT_CACHE_CAPACITY)
    }
}
