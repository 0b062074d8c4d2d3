//! In-memory key-value store implementation for testing.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, Mutex};

use crate::{KVError, KVResult, KVStore};

/// An in-memory key-value store backed by an ordered map.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KVStore for MemoryStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> KVResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        data.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn insert_new(&self, key: &str, value: &[u8]) -> KVResult<bool> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        if data.contains_key(key) {
            return Ok(false);
        }
        data.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        match data.remove(key) {
            Some(_) => Ok(()),
            None => Err(KVError::NotFound),
        }
    }

    fn scan_page(
        &self,
        prefix: &str,
        after: Option<&str>,
        limit: usize,
    ) -> KVResult<Vec<(String, Vec<u8>)>> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let start = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Included(prefix),
        };
        Ok(data
            .range::<str, _>((start, Bound::Unbounded))
            .skip_while(|(k, _)| k.as_str() < prefix)
            .take_while(|(k, _)| k.starts_with(prefix))
            .take(limit)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn count(&self, prefix: &str) -> KVResult<usize> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(k, _)| k.starts_with(prefix))
            .count())
    }
}
