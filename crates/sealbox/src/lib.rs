//! # Sealbox
//!
//! Hybrid encryption with decentralized receipts: seal a file for exactly
//! one recipient, park the ciphertext in a content-addressed store, and
//! hand the caller a receipt that - together with the recipient's private
//! key - is sufficient to get the file back.
//!
//! ## Pipeline
//!
//! ```text
//! file bytes ──► encrypt (one-time key) ──┬──► put ciphertext ──► address
//!                                         └──► wrap key ───────► locked key
//!                          address + locked key + nonce + tag ──► receipt
//! ```
//!
//! Recovery runs the same components in reverse, driven by a [`Receipt`]
//! and the recipient's private key.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bytes::Bytes;
//! use sealbox::{Pipeline, PipelineConfig, UploadRequest};
//! use sealbox::store::MemoryStore;
//!
//! async fn example() {
//!     let store = Arc::new(MemoryStore::new());
//!     let pipeline = Pipeline::new(store, PipelineConfig::default());
//!
//!     let receipt = pipeline
//!         .upload(UploadRequest {
//!             file_bytes: Bytes::from_static(b"patient scan"),
//!             file_name: "scan.pdf".to_string(),
//!             recipient_public_key: "..".to_string(),
//!         })
//!         .await
//!         .unwrap();
//!
//!     // The caller keeps the receipt; the pipeline stores nothing else.
//!     let _durable = receipt.to_bytes();
//! }
//! ```
//!
//! ## Guarantees
//!
//! - One fresh key and nonce per upload, generated inside the cipher
//!   engine - never caller-supplied.
//! - Plaintext and raw key material never cross the process boundary;
//!   the one-time key is erased on every exit path.
//! - A receipt is either fully populated or never produced.
//! - Authentication failures never reveal whether bytes were tampered
//!   with or the wrong key was used.

pub mod config;
pub mod error;
pub mod notary;
pub mod pipeline;
pub mod receipt;
pub mod request;

// Re-export component crates
pub use sealbox_core as core;
pub use sealbox_store as store;
pub use sealbox_wrap as wrap;

// Re-export main types for convenience
pub use config::PipelineConfig;
pub use error::{ErrorKind, PipelineError, Result};
pub use notary::{Notary, NullNotary};
pub use pipeline::{Pipeline, Stage};
pub use receipt::Receipt;
pub use request::{FailureResponse, RecoverRequest, UploadRequest, UploadResponse};

// Re-export commonly used component types
pub use sealbox_core::{AuthTag, ContentAddress, FileNonce};
pub use sealbox_store::{BlobMeta, BlobStore, MemoryStore, Retrying, RetryPolicy, SqliteStore};
pub use sealbox_wrap::{LockedKey, RecipientPublicKey, RecipientSecretKey};
