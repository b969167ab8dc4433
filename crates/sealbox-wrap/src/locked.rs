//! The locked key: a file key sealed to a single recipient, and the
//! [`KeyWrapper`] capability that produces and opens it.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use sealbox_core::FileKey;

use crate::error::WrapError;
use crate::keys::{EphemeralKeyPair, RecipientPublicKey, RecipientSecretKey};

/// Nonce length for the wrapping cipher.
const WRAP_NONCE_LEN: usize = 12;

/// Sealed length: 32-byte key plus 16-byte attached tag.
const SEALED_LEN: usize = 48;

/// A file key encrypted to one recipient.
///
/// Wire encoding is fixed-size:
/// `[32-byte ephemeral public ‖ 12-byte nonce ‖ 48-byte sealed key]`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedKey {
    /// Sender's one-time X25519 public key.
    pub ephemeral_public: [u8; 32],
    /// Nonce for the wrapping cipher.
    pub nonce: [u8; WRAP_NONCE_LEN],
    /// The file key, encrypted with attached tag.
    pub sealed: Vec<u8>,
}

impl LockedKey {
    /// Total wire length of an encoded locked key.
    pub const LEN: usize = 32 + WRAP_NONCE_LEN + SEALED_LEN;

    /// Serialize to the packed wire encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        buf.extend_from_slice(&self.ephemeral_public);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&self.sealed);
        buf
    }

    /// Parse the packed wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WrapError> {
        if bytes.len() != Self::LEN {
            return Err(WrapError::MalformedLockedKey(format!(
                "expected {} bytes, got {}",
                Self::LEN,
                bytes.len()
            )));
        }

        let mut ephemeral_public = [0u8; 32];
        ephemeral_public.copy_from_slice(&bytes[..32]);
        let mut nonce = [0u8; WRAP_NONCE_LEN];
        nonce.copy_from_slice(&bytes[32..32 + WRAP_NONCE_LEN]);
        let sealed = bytes[32 + WRAP_NONCE_LEN..].to_vec();

        Ok(Self {
            ephemeral_public,
            nonce,
            sealed,
        })
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, WrapError> {
        let bytes =
            hex::decode(s).map_err(|e| WrapError::MalformedLockedKey(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for LockedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockedKey({})", &self.to_hex()[..16])
    }
}

/// Capability interface for asymmetric key wrapping.
///
/// The pipeline is written against this trait so tests can substitute a
/// failing or deterministic wrapper without touching orchestration logic.
pub trait KeyWrapper: Send + Sync {
    /// Lock a file key to a recipient's public key.
    fn wrap(&self, recipient: &RecipientPublicKey, key: &FileKey) -> Result<LockedKey, WrapError>;

    /// Recover a file key with the recipient's private key.
    fn unwrap(&self, secret: &RecipientSecretKey, locked: &LockedKey)
        -> Result<FileKey, WrapError>;
}

/// Production wrapper: ephemeral X25519 + Blake3 KDF + ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, Default)]
pub struct X25519Wrapper;

impl X25519Wrapper {
    /// Create a new wrapper.
    pub fn new() -> Self {
        Self
    }
}

impl KeyWrapper for X25519Wrapper {
    fn wrap(&self, recipient: &RecipientPublicKey, key: &FileKey) -> Result<LockedKey, WrapError> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_bytes();

        let shared = ephemeral.agree(recipient)?;
        let wrapping_key = shared.derive_wrapping_key(&ephemeral_public, recipient);

        let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_bytes())
            .map_err(|e| WrapError::WrapFailure(e.to_string()))?;

        let mut nonce = [0u8; WRAP_NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce), key.as_bytes().as_slice())
            .map_err(|e| WrapError::WrapFailure(e.to_string()))?;

        Ok(LockedKey {
            ephemeral_public,
            nonce,
            sealed,
        })
    }

    fn unwrap(
        &self,
        secret: &RecipientSecretKey,
        locked: &LockedKey,
    ) -> Result<FileKey, WrapError> {
        let shared = secret.agree(&locked.ephemeral_public)?;
        let wrapping_key =
            shared.derive_wrapping_key(&locked.ephemeral_public, &secret.public_key());

        let cipher = ChaCha20Poly1305::new_from_slice(wrapping_key.as_bytes())
            .map_err(|_| WrapError::UnwrapFailure)?;

        let mut key_bytes = cipher
            .decrypt(Nonce::from_slice(&locked.nonce), locked.sealed.as_slice())
            .map_err(|_| WrapError::UnwrapFailure)?;

        if key_bytes.len() != 32 {
            key_bytes.zeroize();
            return Err(WrapError::UnwrapFailure);
        }

        let mut arr = [0u8; 32];
        arr.copy_from_slice(&key_bytes);
        key_bytes.zeroize();

        Ok(FileKey::from_bytes(arr))
    }
}
