//! # Sealbox Store
//!
//! The content-addressed store client: an abstract put/get contract over
//! opaque ciphertext blobs, plus the backends that satisfy it.
//!
//! ## Contract
//!
//! - [`BlobStore::put`] is idempotent: the address is a pure function of
//!   the bytes, so re-putting identical content returns the identical
//!   address without duplicating anything.
//! - [`BlobStore::get`] fails with [`StoreError::NotFound`] for addresses
//!   the backend has never seen.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - in-memory, for tests and embedding
//! - [`SqliteStore`] - local durable backend (rusqlite, `spawn_blocking`)
//! - [`Retrying`] - decorator adding bounded exponential backoff for
//!   transient failures

pub mod error;
pub mod memory;
pub mod migration;
pub mod retry;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use retry::{Retrying, RetryPolicy};
pub use sqlite::SqliteStore;
pub use traits::{BlobMeta, BlobStore};
