//! Redb-based persistent key-value store implementation.

use std::ops::Bound;
use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};

use crate::{KVError, KVResult, KVStore};

const TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("kv");

fn storage_err(e: impl std::fmt::Display) -> KVError {
    KVError::Storage(e.to_string())
}

/// A persistent key-value store backed by redb.
///
/// redb holds an exclusive lock on the database file, so only one process
/// can have a given store open at a time.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a redb store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> KVResult<Self> {
        let db = Database::create(path).map_err(storage_err)?;

        // Create the table if it doesn't exist
        let tx = db.begin_write().map_err(storage_err)?;
        {
            let _ = tx.open_table(TABLE).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;

        Ok(Self { db })
    }
}

impl KVStore for RedbStore {
    fn get(&self, key: &str) -> KVResult<Option<Vec<u8>>> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(TABLE).map_err(storage_err)?;

        match table.get(key).map_err(storage_err)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> KVResult<()> {
        let tx = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage_err)?;
            table.insert(key, value).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    fn insert_new(&self, key: &str, value: &[u8]) -> KVResult<bool> {
        // Write transactions are serialized, so check-then-insert is atomic.
        let tx = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage_err)?;
            let exists = table.get(key).map_err(storage_err)?.is_some();
            if exists {
                return Ok(false);
            }
            table.insert(key, value).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;
        Ok(true)
    }

    fn delete(&self, key: &str) -> KVResult<()> {
        let tx = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(TABLE).map_err(storage_err)?;
            let existed = table.remove(key).map_err(storage_err)?.is_some();
            if !existed {
                return Err(KVError::NotFound);
            }
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    fn scan_page(
        &self,
        prefix: &str,
        after: Option<&str>,
        limit: usize,
    ) -> KVResult<Vec<(String, Vec<u8>)>> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(TABLE).map_err(storage_err)?;

        let start = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Included(prefix),
        };

        let mut results = Vec::new();
        if limit == 0 {
            return Ok(results);
        }
        for item in table
            .range::<&str>((start, Bound::Unbounded))
            .map_err(storage_err)?
        {
            let (key, value) = item.map_err(storage_err)?;
            let key_str = key.value();
            if key_str < prefix {
                continue;
            }
            if !key_str.starts_with(prefix) {
                break;
            }
            results.push((key_str.to_string(), value.value().to_vec()));
            if results.len() == limit {
                break;
            }
        }
        Ok(results)
    }

    fn count(&self, prefix: &str) -> KVResult<usize> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(TABLE).map_err(storage_err)?;

        let mut n = 0;
        for item in table
            .range::<&str>((Bound::Included(prefix), Bound::Unbounded))
            .map_err(storage_err)?
        {
            let (key, _) = item.map_err(storage_err)?;
            if !key.value().starts_with(prefix) {
                break;
            }
            n += 1;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_redb_basic() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.set("key1", b"value1").unwrap();
        assert_eq!(store.get("key1").unwrap(), Some(b"value1".to_vec()));

        store.delete("key1").unwrap();
        assert_eq!(store.get("key1").unwrap(), None);
        assert!(matches!(store.delete("key1"), Err(KVError::NotFound)));
    }

    #[test]
    fn test_redb_insert_new() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        assert!(store.insert_new("k", b"first").unwrap());
        assert!(!store.insert_new("k", b"second").unwrap());
        assert_eq!(store.get("k").unwrap(), Some(b"first".to_vec()));
    }

    #[test]
    fn test_redb_scan_page() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.set("p:a", b"1").unwrap();
        store.set("p:b", b"2").unwrap();
        store.set("p:c", b"3").unwrap();
        store.set("o:x", b"4").unwrap();
        store.set("q:y", b"5").unwrap();

        let page = store.scan_page("p:", None, 2).unwrap();
        let keys: Vec<&str> = page.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["p:a", "p:b"]);

        let page = store.scan_page("p:", Some("p:b"), 2).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0], ("p:c".to_string(), b"3".to_vec()));

        assert_eq!(store.count("p:").unwrap(), 3);
    }

    #[test]
    fn test_redb_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.set("durable", b"yes").unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.get("durable").unwrap(), Some(b"yes".to_vec()));
    }
}
