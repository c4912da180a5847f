//! Memoizing cache for remote entity details keyed by `(id, language)`.
//!
//! The map is split into shards, each behind its own `RwLock`: lookups only
//! take a read lock, and an insert locks one shard.

use std::collections::HashMap;
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

const SHARDS: usize = 16;

type Key = (String, String);

pub struct DetailCache<T> {
    shards: Vec<RwLock<HashMap<Key, T>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<T: Clone> Default for DetailCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> DetailCache<T> {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARDS).map(|_| RwLock::new(HashMap::new())).collect(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    fn shard(&self, id: &str, language: &str) -> &RwLock<HashMap<Key, T>> {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        language.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARDS]
    }

    pub fn get(&self, id: &str, language: &str) -> Option<T> {
        let shard = self
            .shard(id, language)
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        shard
            .get(&(id.to_string(), language.to_string()))
            .cloned()
    }

    pub fn insert(&self, id: &str, language: &str, value: T) {
        let mut shard = self
            .shard(id, language)
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        shard.insert((id.to_string(), language.to_string()), value);
    }

    /// Return the cached value, or run `fetch` and cache a successful result.
    /// Failures are returned to the caller and never cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, id: &str, language: &str, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get(id, language) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = fetch().await?;
        self.insert(id, language, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}
