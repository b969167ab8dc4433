//! # Sealbox Core
//!
//! Pure primitives for the Sealbox pipeline: content addressing, symmetric
//! key material, and the authenticated cipher engine.
//!
//! This crate contains no I/O, no storage, no networking. It is pure
//! computation over byte sequences and cryptographic material.
//!
//! ## Key Types
//!
//! - [`ContentAddress`] - Blake3-derived identifier of stored ciphertext
//! - [`FileKey`] - One-time 256-bit file key, zeroized on drop
//! - [`FileNonce`] / [`AuthTag`] - AEAD nonce and detached authentication tag
//! - [`ChaCha20Engine`] - The production [`AeadCipher`] implementation
//!
//! ## Key Hygiene
//!
//! Plaintext and raw key material never leave this crate's types
//! unencrypted. [`FileKey`] erases itself from memory when dropped, so a
//! caller that lets the key fall out of scope has erased it on every exit
//! path, including cancellation.

pub mod address;
pub mod cipher;
pub mod error;

pub use address::ContentAddress;
pub use cipher::{AeadCipher, AuthTag, ChaCha20Engine, FileKey, FileNonce, SealedFile};
pub use error::CoreError;
