//! In-memory implementation of the store trait.
//!
//! Primarily for tests and embedding. Same contract as the durable
//! backends, no persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use sealbox_core::ContentAddress;

use crate::error::{Result, StoreError};
use crate::traits::{BlobMeta, BlobStore};

/// In-memory content-addressed store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    blobs: RwLock<HashMap<ContentAddress, StoredBlob>>,
    max_blob_bytes: Option<usize>,
}

struct StoredBlob {
    bytes: Vec<u8>,
    meta: BlobMeta,
}

impl MemoryStore {
    /// Create a new empty store with no size limit.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            max_blob_bytes: None,
        }
    }

    /// Create a store that rejects blobs over `limit` bytes with
    /// [`StoreError::PayloadTooLarge`].
    pub fn with_max_blob_bytes(limit: usize) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            max_blob_bytes: Some(limit),
        }
    }

    /// Number of distinct blobs held.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("store lock poisoned").len()
    }

    /// Whether the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the metadata stored alongside a blob.
    pub fn meta(&self, address: &ContentAddress) -> Option<BlobMeta> {
        self.blobs
            .read()
            .expect("store lock poisoned")
            .get(address)
            .map(|blob| blob.meta.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress> {
        if let Some(limit) = self.max_blob_bytes {
            if bytes.len() > limit {
                return Err(StoreError::PayloadTooLarge {
                    size: bytes.len(),
                    limit,
                });
            }
        }

        let address = ContentAddress::derive(bytes);
        let mut blobs = self.blobs.write().expect("store lock poisoned");

        if !blobs.contains_key(&address) {
            blobs.insert(
                address,
                StoredBlob {
                    bytes: bytes.to_vec(),
                    meta: meta.clone(),
                },
            );
        }

        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        let blobs = self.blobs.read().expect("store lock poisoned");
        blobs
            .get(address)
            .map(|blob| blob.bytes.clone())
            .ok_or(StoreError::NotFound(*address))
    }

    async fn exists(&self, address: &ContentAddress) -> Result<bool> {
        let blobs = self.blobs.read().expect("store lock poisoned");
        Ok(blobs.contains_key(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let store = MemoryStore::new();
        let meta = BlobMeta::new("blob").with_label("status", "encrypted");

        let address = store.put(b"ciphertext bytes", &meta).await.unwrap();
        let fetched = store.get(&address).await.unwrap();

        assert_eq!(fetched, b"ciphertext bytes");
        assert_eq!(store.meta(&address).unwrap().name, "blob");
    }

    #[tokio::test]
    async fn test_put_idempotent() {
        let store = MemoryStore::new();
        let meta = BlobMeta::new("blob");

        let a1 = store.put(b"same bytes", &meta).await.unwrap();
        let a2 = store.put(b"same bytes", &meta).await.unwrap();

        assert_eq!(a1, a2);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_address() {
        let store = MemoryStore::new();
        let unknown = ContentAddress::from_bytes([0xEE; 32]);

        let result = store.get(&unknown).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_exists() {
        let store = MemoryStore::new();
        let address = store
            .put(b"present", &BlobMeta::new("blob"))
            .await
            .unwrap();

        assert!(store.exists(&address).await.unwrap());
        assert!(!store
            .exists(&ContentAddress::from_bytes([0x00; 32]))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_oversized_blob_rejected() {
        let store = MemoryStore::with_max_blob_bytes(8);
        let result = store.put(b"way past the limit", &BlobMeta::new("big")).await;

        assert!(matches!(result, Err(StoreError::PayloadTooLarge { .. })));
        assert!(store.is_empty());
    }
}
