//! X25519 key material for wrapping: recipient identities, ephemeral
//! keypairs, and the derived wrapping key.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};
use zeroize::Zeroize;

use crate::error::WrapError;

/// Domain string for wrapping-key derivation. Changing it invalidates every
/// previously issued locked key.
const WRAP_KDF_CONTEXT: &str = "sealbox wrap v1 wrapping key";

/// A recipient's X25519 public key: the identity a file is locked to.
///
/// Supplied by the caller per request, validated at the boundary, and never
/// stored by the pipeline.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientPublicKey(pub [u8; 32]);

impl RecipientPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex. Wrong length or bad encoding is a malformed key.
    pub fn from_hex(s: &str) -> Result<Self, WrapError> {
        let bytes = hex::decode(s).map_err(|_| WrapError::MalformedRecipientKey)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| WrapError::MalformedRecipientKey)?;
        Ok(Self(arr))
    }

    /// Convert to an x25519-dalek public key.
    pub(crate) fn to_dalek(self) -> PublicKey {
        PublicKey::from(self.0)
    }
}

impl From<PublicKey> for RecipientPublicKey {
    fn from(pk: PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

impl TryFrom<&[u8]> for RecipientPublicKey {
    type Error = WrapError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice
            .try_into()
            .map_err(|_| WrapError::MalformedRecipientKey)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for RecipientPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecipientPublicKey({})", &self.to_hex()[..16])
    }
}

/// A recipient's X25519 private key.
///
/// Used only on the recovery path, to reverse the ephemeral agreement.
pub struct RecipientSecretKey(StaticSecret);

impl RecipientSecretKey {
    /// Generate a new random secret key.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let secret = Self(StaticSecret::from(bytes));
        bytes.zeroize();
        secret
    }

    /// Create from seed bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Derive the paired public key.
    pub fn public_key(&self) -> RecipientPublicKey {
        RecipientPublicKey::from(PublicKey::from(&self.0))
    }

    /// Get the raw secret bytes (for transport by the key's owner).
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Reverse an ephemeral agreement using the sender's ephemeral public
    /// key carried in a locked key.
    ///
    /// A non-contributory exchange (all-zero shared secret) is treated as
    /// an unwrap failure, indistinguishable from a wrong key.
    pub fn agree(&self, ephemeral_public: &[u8; 32]) -> Result<SharedKey, WrapError> {
        let shared = self.0.diffie_hellman(&PublicKey::from(*ephemeral_public));
        if !shared.was_contributory() {
            return Err(WrapError::UnwrapFailure);
        }
        Ok(SharedKey(*shared.as_bytes()))
    }
}

impl fmt::Debug for RecipientSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientSecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// One-time X25519 keypair generated per wrap call.
pub struct EphemeralKeyPair {
    secret: EphemeralSecret,
    public: [u8; 32],
}

impl EphemeralKeyPair {
    /// Generate a new ephemeral keypair.
    pub fn generate() -> Self {
        let secret = EphemeralSecret::random_from_rng(rand::thread_rng());
        let public = *PublicKey::from(&secret).as_bytes();
        Self { secret, public }
    }

    /// The public half, serialized into the locked key.
    pub fn public_bytes(&self) -> [u8; 32] {
        self.public
    }

    /// Perform the agreement with the recipient's public key. Consumes the
    /// ephemeral secret, so it can only ever be used once.
    ///
    /// A non-contributory exchange means the recipient key is a low-order
    /// point and is rejected as malformed.
    pub fn agree(self, recipient: &RecipientPublicKey) -> Result<SharedKey, WrapError> {
        let shared = self.secret.diffie_hellman(&recipient.to_dalek());
        if !shared.was_contributory() {
            return Err(WrapError::MalformedRecipientKey);
        }
        Ok(SharedKey(*shared.as_bytes()))
    }
}

/// The raw X25519 shared secret. Erased on drop.
pub struct SharedKey([u8; 32]);

impl SharedKey {
    /// Derive the wrapping key, bound to both public keys of the exchange.
    pub fn derive_wrapping_key(
        &self,
        ephemeral_public: &[u8; 32],
        recipient: &RecipientPublicKey,
    ) -> WrappingKey {
        let mut hasher = blake3::Hasher::new_derive_key(WRAP_KDF_CONTEXT);
        hasher.update(&self.0);
        hasher.update(ephemeral_public);
        hasher.update(recipient.as_bytes());
        WrappingKey(*hasher.finalize().as_bytes())
    }
}

impl Drop for SharedKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The symmetric key that seals the file key. Erased on drop.
pub struct WrappingKey([u8; 32]);

impl WrappingKey {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Drop for WrappingKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_agreement_matches_ephemeral() {
        let recipient = RecipientSecretKey::from_bytes([0x07; 32]);
        let recipient_public = recipient.public_key();

        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_bytes();

        let sender_side = ephemeral.agree(&recipient_public).unwrap();
        let recipient_side = recipient.agree(&ephemeral_public).unwrap();

        let k1 = sender_side.derive_wrapping_key(&ephemeral_public, &recipient_public);
        let k2 = recipient_side.derive_wrapping_key(&ephemeral_public, &recipient_public);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_low_order_recipient_rejected() {
        // The identity point produces an all-zero shared secret.
        let low_order = RecipientPublicKey::from_bytes([0u8; 32]);
        let ephemeral = EphemeralKeyPair::generate();

        let result = ephemeral.agree(&low_order);
        assert!(matches!(result, Err(WrapError::MalformedRecipientKey)));
    }

    #[test]
    fn test_public_key_hex_roundtrip() {
        let secret = RecipientSecretKey::generate();
        let public = secret.public_key();
        let recovered = RecipientPublicKey::from_hex(&public.to_hex()).unwrap();
        assert_eq!(public, recovered);
    }

    #[test]
    fn test_public_key_from_hex_rejects_bad_input() {
        assert!(matches!(
            RecipientPublicKey::from_hex("zz"),
            Err(WrapError::MalformedRecipientKey)
        ));
        assert!(matches!(
            RecipientPublicKey::from_hex("abcd"),
            Err(WrapError::MalformedRecipientKey)
        ));
    }

    #[test]
    fn test_derivation_binds_public_keys() {
        let recipient = RecipientSecretKey::from_bytes([0x11; 32]);
        let other = RecipientSecretKey::from_bytes([0x22; 32]);
        let ephemeral_public = [0x33; 32];

        let shared = recipient.agree(&other.public_key().0).unwrap();
        let k1 = shared.derive_wrapping_key(&ephemeral_public, &recipient.public_key());
        let shared = recipient.agree(&other.public_key().0).unwrap();
        let k2 = shared.derive_wrapping_key(&ephemeral_public, &other.public_key());

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_secret_key_debug_redacted() {
        let secret = RecipientSecretKey::generate();
        assert!(format!("{:?}", secret).contains("REDACTED"));
    }
}
