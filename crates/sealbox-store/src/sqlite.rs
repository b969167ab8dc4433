//! SQLite implementation of the store trait.
//!
//! The local durable backend. Uses rusqlite with bundled SQLite, wrapped
//! in async via `tokio::task::spawn_blocking` so the runtime never blocks
//! on disk I/O.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use sealbox_core::ContentAddress;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{BlobMeta, BlobStore};

/// SQLite-backed content-addressed store.
///
/// Thread-safe via an internal Mutex around the single connection.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a database at the given path, creating and migrating it if
    /// needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database. Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn lock_error<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::MalformedRequest(format!("connection mutex poisoned: {}", e))
}

fn encode_labels(meta: &BlobMeta) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(&meta.labels, &mut buf).expect("CBOR serialization failed");
    buf
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress> {
        let address = ContentAddress::derive(bytes);
        let bytes = bytes.to_vec();
        let meta = meta.clone();
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(lock_error)?;

            // Content addressing makes the insert naturally idempotent:
            // an existing row for this address already holds these bytes.
            let size = bytes.len() as i64;
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO blobs (address, name, labels, bytes, size, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    address.as_bytes().as_slice(),
                    meta.name,
                    encode_labels(&meta),
                    bytes,
                    size,
                    now_millis()
                ],
            )?;

            if inserted > 0 {
                tracing::debug!(%address, size, "stored blob");
            } else {
                tracing::debug!(%address, "blob already present");
            }

            Ok(address)
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        let address = *address;
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(lock_error)?;

            let bytes: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT bytes FROM blobs WHERE address = ?1",
                    params![address.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            bytes.ok_or(StoreError::NotFound(address))
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }

    async fn exists(&self, address: &ContentAddress) -> Result<bool> {
        let address = *address;
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(lock_error)?;

            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM blobs WHERE address = ?1",
                    params![address.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(found.is_some())
        })
        .await
        .map_err(|e| StoreError::Io(std::io::Error::other(e)))?
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
