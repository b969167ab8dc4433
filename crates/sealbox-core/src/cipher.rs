//! The symmetric cipher engine: ChaCha20-Poly1305 with a detached tag.
//!
//! The engine owns key and nonce generation. Callers never supply either,
//! which is what makes nonce/key reuse across two encryptions impossible
//! rather than merely discouraged.

use chacha20poly1305::{
    aead::{AeadInPlace, KeyInit},
    ChaCha20Poly1305, Nonce, Tag,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::error::CoreError;

/// Symmetric key length in bytes (256-bit).
pub const KEY_LEN: usize = 32;

/// AEAD nonce length in bytes (96-bit).
pub const NONCE_LEN: usize = 12;

/// Poly1305 authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A one-time 256-bit file encryption key.
///
/// Erased from memory on drop. Generated fresh for every encryption; there
/// is deliberately no way to construct one from a hex string.
#[derive(Clone)]
pub struct FileKey {
    bytes: [u8; KEY_LEN],
}

impl FileKey {
    /// Generate a fresh random key from the thread CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Create from raw bytes. The caller is responsible for the origin of
    /// the material (e.g. an unwrapped locked key).
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl Drop for FileKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl fmt::Debug for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileKey").field("bytes", &"[REDACTED]").finish()
    }
}

/// A 96-bit AEAD nonce, unique per encryption.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNonce(pub [u8; NONCE_LEN]);

impl FileNonce {
    /// Generate a fresh random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != NONCE_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; NONCE_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for FileNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileNonce({})", self.to_hex())
    }
}

/// A detached 128-bit Poly1305 authentication tag.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTag(pub [u8; TAG_LEN]);

impl AuthTag {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; TAG_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; TAG_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != TAG_LEN {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; TAG_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for AuthTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthTag({})", self.to_hex())
    }
}

/// The output of one encryption: ciphertext plus the material needed to
/// reverse it.
///
/// The ciphertext travels to the store; key, nonce, and tag travel into the
/// key-wrapping and receipt-assembly steps. Dropping the struct erases the
/// key.
pub struct SealedFile {
    /// The encrypted bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// The one-time key. Must be wrapped before the upload call returns.
    pub key: FileKey,
    /// Nonce used for this encryption.
    pub nonce: FileNonce,
    /// Detached authentication tag.
    pub tag: AuthTag,
}

/// Capability interface for authenticated encryption.
///
/// The pipeline is written against this trait so tests can substitute a
/// deterministic or failing cipher without touching orchestration logic.
pub trait AeadCipher: Send + Sync {
    /// Encrypt plaintext under a freshly generated key and nonce.
    ///
    /// Fails only on fatal cipher or entropy failure, which is not retried.
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedFile, CoreError>;

    /// Decrypt ciphertext, verifying the tag before releasing any output.
    ///
    /// A single flipped bit in ciphertext, key, nonce, or tag fails with
    /// [`CoreError::AuthenticationFailure`]. Nothing is released on failure.
    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &FileKey,
        nonce: &FileNonce,
        tag: &AuthTag,
    ) -> Result<Vec<u8>, CoreError>;
}

/// Production cipher engine: ChaCha20-Poly1305, detached tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChaCha20Engine;

impl ChaCha20Engine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }
}

impl AeadCipher for ChaCha20Engine {
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedFile, CoreError> {
        let key = FileKey::generate();
        let nonce = FileNonce::generate();

        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::EncryptionFailure(e.to_string()))?;

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(nonce.as_bytes()), b"", &mut buffer)
            .map_err(|e| CoreError::EncryptionFailure(e.to_string()))?;

        let tag_bytes: [u8; TAG_LEN] = tag.into();

        Ok(SealedFile {
            ciphertext: buffer,
            key,
            nonce,
            tag: AuthTag::from_bytes(tag_bytes),
        })
    }

    fn decrypt(
        &self,
        ciphertext: &[u8],
        key: &FileKey,
        nonce: &FileNonce,
        tag: &AuthTag,
    ) -> Result<Vec<u8>, CoreError> {
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|e| CoreError::EncryptionFailure(e.to_string()))?;

        let mut buffer = ciphertext.to_vec();
        let verified = cipher.decrypt_in_place_detached(
            Nonce::from_slice(nonce.as_bytes()),
            b"",
            &mut buffer,
            Tag::from_slice(tag.as_bytes()),
        );

        if verified.is_err() {
            buffer.zeroize();
            return Err(CoreError::AuthenticationFailure);
        }

        Ok(buffer)
    }
}
