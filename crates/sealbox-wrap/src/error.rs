//! Error types for key wrapping.

use thiserror::Error;

/// Errors from wrap and unwrap operations.
///
/// [`WrapError::UnwrapFailure`] deliberately does not distinguish a wrong
/// private key from tampered locked-key bytes: either would give an
/// attacker an oracle.
#[derive(Debug, Error)]
pub enum WrapError {
    /// The recipient public key is not a usable X25519 key (wrong length,
    /// bad encoding, or a low-order point).
    #[error("malformed recipient public key")]
    MalformedRecipientKey,

    /// The locked key bytes are structurally invalid.
    #[error("malformed locked key: {0}")]
    MalformedLockedKey(String),

    /// Fatal cipher failure while sealing the key. Not retriable.
    #[error("key wrapping failed: {0}")]
    WrapFailure(String),

    /// Tag verification failed during unwrap: wrong private key or
    /// tampered input.
    #[error("key unwrap failed")]
    UnwrapFailure,
}
