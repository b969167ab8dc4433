//! The store trait: the abstract put/get contract the pipeline consumes.
//!
//! The physical backend is an external collaborator; this trait is the
//! whole of what the pipeline relies on. Implementations include SQLite
//! (local durable) and in-memory (tests), and any of them can be wrapped
//! in [`crate::Retrying`] for backoff.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sealbox_core::ContentAddress;

use crate::error::Result;

/// Descriptive metadata attached to a stored blob.
///
/// Metadata never influences the address: the address is derived from the
/// bytes alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMeta {
    /// Display name of the blob (e.g. the original file name).
    pub name: String,
    /// Free-form labels.
    pub labels: BTreeMap<String, String>,
}

impl BlobMeta {
    /// Create metadata with a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }
}

/// The store trait: async interface over content-addressed blob storage.
///
/// # Design Notes
///
/// - **Idempotent puts**: the address is derived from the bytes, so a
///   repeated put of identical content returns the same address and
///   stores nothing new.
/// - **Opaque payloads**: the store never interprets blob contents; the
///   pipeline only ever hands it ciphertext.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload bytes and return their content-derived address.
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress>;

    /// Fetch previously stored bytes.
    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>>;

    /// Whether the backend holds the given address. Used by readiness
    /// probes and tests; never required for the upload path.
    async fn exists(&self, address: &ContentAddress) -> Result<bool>;
}
