//! Error types for Sealbox core primitives.

use thiserror::Error;

/// Errors from the cipher engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Fatal cipher or entropy failure. Not retriable.
    #[error("encryption failure: {0}")]
    EncryptionFailure(String),

    /// Tag verification failed: the ciphertext, key, nonce, or tag does not
    /// match. Deliberately carries no detail about which.
    #[error("authentication failed")]
    AuthenticationFailure,
}
