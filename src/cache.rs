//! Per-run caching of remote lookups
//!
//! Remote statistics are expensive to fetch and change only when this run
//! changes them, so they are fetched lazily once and dropped whenever a
//! mutating call is made. Nothing here outlives a [`crate::sync::SyncRun`].

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::Result;

/// A lazily fetched value.
#[derive(Debug, Clone)]
pub struct RunCache<T> {
    value: Option<T>,
    fetches: usize,
}

impl<T> Default for RunCache<T> {
    fn default() -> Self {
        Self {
            value: None,
            fetches: 0,
        }
    }
}

impl<T> RunCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached value, or fetch and cache it if not present
    pub fn get_or_fetch<F>(&mut self, fetch: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        let value = match self.value.take() {
            Some(value) => value,
            None => {
                self.fetches += 1;
                fetch()?
            }
        };
        Ok(self.value.insert(value))
    }

    /// Get the value without fetching.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Drop the cached value.
    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn is_cached(&self) -> bool {
        self.value.is_some()
    }

    /// How many times the value was fetched.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

/// Lazily computed values per key.
#[derive(Debug, Clone)]
pub struct KeyedCache<K, V> {
    entries: HashMap<K, V>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> KeyedCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cached value, or compute and cache it if not present
    pub fn get_or_compute<F>(&mut self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }
        let value = compute()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
