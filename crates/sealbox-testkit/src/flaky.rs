//! A fault-injecting store double.
//!
//! Fails the first N put attempts with a transient error, then delegates
//! to an in-memory store. Wrap it in `Retrying` to exercise backoff paths
//! end to end.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use sealbox_core::ContentAddress;
use sealbox_store::{BlobMeta, BlobStore, MemoryStore, Result, StoreError};

/// A store that fails transiently a configured number of times.
pub struct FlakyStore {
    inner: MemoryStore,
    fail_first: u32,
    put_attempts: AtomicU32,
}

impl FlakyStore {
    /// Fail the first `n` put attempts, then behave normally.
    pub fn failing(n: u32) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_first: n,
            put_attempts: AtomicU32::new(0),
        }
    }

    /// Fail every put attempt, forever.
    pub fn always_failing() -> Self {
        Self::failing(u32::MAX)
    }

    /// Number of put attempts observed so far.
    pub fn put_attempts(&self) -> u32 {
        self.put_attempts.load(Ordering::SeqCst)
    }

    /// Access the backing memory store.
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl BlobStore for FlakyStore {
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress> {
        let attempt = self.put_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.fail_first {
            return Err(StoreError::Transient(format!(
                "injected fault on attempt {}",
                attempt
            )));
        }
        self.inner.put(bytes, meta).await
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        self.inner.get(address).await
    }

    async fn exists(&self, address: &ContentAddress) -> Result<bool> {
        self.inner.exists(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flaky_recovers_after_configured_failures() {
        let store = FlakyStore::failing(2);
        let meta = BlobMeta::new("blob");

        assert!(store.put(b"x", &meta).await.is_err());
        assert!(store.put(b"x", &meta).await.is_err());
        assert!(store.put(b"x", &meta).await.is_ok());
        assert_eq!(store.put_attempts(), 3);
    }

    #[tokio::test]
    async fn test_flaky_gets_are_reliable() {
        let store = FlakyStore::failing(1);
        let meta = BlobMeta::new("blob");

        let _ = store.put(b"y", &meta).await;
        let address = store.put(b"y", &meta).await.unwrap();
        assert_eq!(store.get(&address).await.unwrap(), b"y");
    }
}
