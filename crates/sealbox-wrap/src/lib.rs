//! # Sealbox Wrap
//!
//! Asymmetric key wrapping: locks a one-time file key so that exactly one
//! recipient can recover it.
//!
//! ## Construction
//!
//! ECIES-style, built from three pieces:
//!
//! 1. **Agreement**: an ephemeral X25519 keypair performs Diffie-Hellman
//!    with the recipient's public key.
//! 2. **Derivation**: the wrapping key is derived from the shared secret
//!    with Blake3 `derive_key`, bound to both public keys.
//! 3. **Encryption**: the file key is sealed under the wrapping key with
//!    ChaCha20-Poly1305.
//!
//! The resulting [`LockedKey`] carries the ephemeral public key, the nonce,
//! and the sealed key material. Only the private key paired with the
//! recipient identity supplied at wrap time can reverse the agreement.

pub mod error;
pub mod keys;
pub mod locked;

pub use error::WrapError;
pub use keys::{EphemeralKeyPair, RecipientPublicKey, RecipientSecretKey, WrappingKey};
pub use locked::{KeyWrapper, LockedKey, X25519Wrapper};
