use std::sync::Arc;

use faceid_kv::KVStore;
use faceid_vecmath::{check_dimension, check_nondegenerate, decode_le, encode_le};

use crate::config::DEFAULT_PAGE_SIZE;
use crate::embedding::{IdentityId, IdentityRecord};
use crate::error::FaceprintError;
use crate::keys::{embedding_key, embedding_prefix};

/// Lazy sequence of stored records.
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<IdentityRecord, FaceprintError>> + 'a>;

/// Durable mapping from identity to exactly one embedding.
///
/// Append-only from the engine's point of view: there is no update or
/// delete here. Records may still disappear through other writers, so
/// scans must cope with a shrinking repository.
///
/// Implementations must be safe for concurrent use.
pub trait EmbeddingRepository: Send + Sync {
    /// Embedding dimension every stored vector must have.
    fn dimension(&self) -> usize;

    /// Stores one record. Rejects a vector of the wrong dimension, a
    /// non-finite or zero-norm vector, and a second record for an identity
    /// that already has one.
    fn insert(&self, identity: &IdentityId, vector: &[f32]) -> Result<(), FaceprintError>;

    /// Returns every record currently stored.
    ///
    /// Each call re-reads current state. Records inserted or removed while
    /// the scan runs may or may not be seen, but a record is always seen
    /// whole or not at all.
    fn scan_all(&self) -> RecordIter<'_>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, FaceprintError>;

    fn is_empty(&self) -> Result<bool, FaceprintError> {
        Ok(self.len()? == 0)
    }
}

/// [`EmbeddingRepository`] on top of a [`KVStore`].
///
/// Each record is one key, `{prefix}:emb:{identity}`, whose value is the
/// vector as little-endian f32 bytes.
pub struct KvRepository {
    kv: Arc<dyn KVStore>,
    key_prefix: String,
    prefix: String,
    dim: usize,
    page_size: usize,
}

impl KvRepository {
    pub fn new(kv: Arc<dyn KVStore>, key_prefix: &str, dim: usize) -> Self {
        assert!(dim > 0, "faceprint: repository dimension must be positive");
        Self {
            kv,
            key_prefix: key_prefix.to_string(),
            prefix: embedding_prefix(key_prefix),
            dim,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many records each scan reads per storage round trip.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn key(&self, identity: &IdentityId) -> String {
        embedding_key(&self.key_prefix, identity.as_str())
    }
}

impl EmbeddingRepository for KvRepository {
    fn dimension(&self) -> usize {
        self.dim
    }

    fn insert(&self, identity: &IdentityId, vector: &[f32]) -> Result<(), FaceprintError> {
        check_dimension(vector, self.dim)?;
        check_nondegenerate(vector)?;
        if !self.kv.insert_new(&self.key(identity), &encode_le(vector))? {
            return Err(FaceprintError::Store(format!(
                "embedding already enrolled for {identity}"
            )));
        }
        Ok(())
    }

    fn scan_all(&self) -> RecordIter<'_> {
        Box::new(RecordScan {
            kv: self.kv.as_ref(),
            prefix: &self.prefix,
            dim: self.dim,
            page_size: self.page_size,
            cursor: None,
            page: Vec::new().into_iter(),
            done: false,
        })
    }

    fn len(&self) -> Result<usize, FaceprintError> {
        Ok(self.kv.count(&self.prefix)?)
    }
}

/// Paged scan: each page is a separate read, resumed after the last key seen.
struct RecordScan<'a> {
    kv: &'a dyn KVStore,
    prefix: &'a str,
    dim: usize,
    page_size: usize,
    cursor: Option<String>,
    page: std::vec::IntoIter<(String, Vec<u8>)>,
    done: bool,
}

impl RecordScan<'_> {
    fn decode(&self, key: String, value: Vec<u8>) -> Result<IdentityRecord, FaceprintError> {
        let identity = key
            .strip_prefix(self.prefix)
            .ok_or_else(|| FaceprintError::Store(format!("unexpected key in scan: {key}")))?;
        let corrupt = |e: faceid_vecmath::VecError| {
            FaceprintError::Store(format!("corrupt embedding for {identity}: {e}"))
        };
        // A stored record that cannot be compared is a storage fault, not a bad query.
        let vector = decode_le(&value).map_err(corrupt)?;
        check_dimension(&vector, self.dim).map_err(corrupt)?;
        check_nondegenerate(&vector).map_err(corrupt)?;
        Ok(IdentityRecord {
            identity: IdentityId::new(identity),
            vector,
        })
    }
}

impl Iterator for RecordScan<'_> {
    type Item = Result<IdentityRecord, FaceprintError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.page.next() {
                return Some(self.decode(key, value));
            }
            if self.done {
                return None;
            }
            match self
                .kv
                .scan_page(self.prefix, self.cursor.as_deref(), self.page_size)
            {
                Ok(page) => {
                    if page.len() < self.page_size {
                        self.done = true;
                    }
                    if let Some((last, _)) = page.last() {
                        self.cursor = Some(last.clone());
                    }
                    self.page = page.into_iter();
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}
