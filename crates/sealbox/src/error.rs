//! The pipeline error taxonomy.
//!
//! Component errors converge here and are classified into the external
//! [`ErrorKind`] vocabulary. The caller-facing message is always generic;
//! internal causes go to the log, not over the wire.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sealbox_core::CoreError;
use sealbox_store::StoreError;
use sealbox_wrap::WrapError;

/// The external error vocabulary, stable across transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing or malformed request fields, caught before any crypto work.
    InputValidation,
    /// Fatal entropy or cipher failure during encryption.
    Encryption,
    /// The recipient public key was rejected.
    KeyWrap,
    /// Key unwrap failed: wrong private key or tampered locked key.
    /// Deliberately not distinguished.
    UnwrapFailure,
    /// Payload tag verification failed: tampering or wrong key material.
    /// Deliberately not distinguished.
    AuthenticationFailure,
    /// The store exhausted its retries.
    StorageUnavailable,
    /// The content address is unknown to the store.
    NotFound,
    /// Receipt assembly invariants were violated. Unreachable while the
    /// orchestrator sequences correctly; kept in the taxonomy so callers
    /// can parse it.
    Assembly,
}

impl ErrorKind {
    /// Stable string form used in failure responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InputValidation => "InputValidationError",
            ErrorKind::Encryption => "EncryptionError",
            ErrorKind::KeyWrap => "KeyWrapError",
            ErrorKind::UnwrapFailure => "UnwrapFailure",
            ErrorKind::AuthenticationFailure => "AuthenticationFailure",
            ErrorKind::StorageUnavailable => "StorageUnavailable",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Assembly => "AssemblyError",
        }
    }
}

/// Errors surfaced by upload and recovery pipelines.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Request rejected before any cryptographic work.
    #[error("invalid request: {0}")]
    InputValidation(String),

    /// Cipher engine failure.
    #[error(transparent)]
    Cipher(#[from] CoreError),

    /// Key wrapping failure.
    #[error(transparent)]
    Wrap(#[from] WrapError),

    /// Store client failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Classify into the external error vocabulary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InputValidation(_) => ErrorKind::InputValidation,
            PipelineError::Cipher(CoreError::EncryptionFailure(_)) => ErrorKind::Encryption,
            PipelineError::Cipher(CoreError::AuthenticationFailure) => {
                ErrorKind::AuthenticationFailure
            }
            PipelineError::Wrap(WrapError::MalformedRecipientKey)
            | PipelineError::Wrap(WrapError::WrapFailure(_)) => ErrorKind::KeyWrap,
            PipelineError::Wrap(WrapError::UnwrapFailure)
            | PipelineError::Wrap(WrapError::MalformedLockedKey(_)) => ErrorKind::UnwrapFailure,
            PipelineError::Store(StoreError::NotFound(_)) => ErrorKind::NotFound,
            PipelineError::Store(StoreError::PayloadTooLarge { .. })
            | PipelineError::Store(StoreError::MalformedRequest(_)) => ErrorKind::InputValidation,
            PipelineError::Store(_) => ErrorKind::StorageUnavailable,
        }
    }

    /// The generic caller-facing description. Never carries backend
    /// details, raw causes, or anything that distinguishes tampering from
    /// wrong keys.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::InputValidation => match self {
                // Validation messages are authored here, not echoed from
                // inputs, so they are safe to return.
                PipelineError::InputValidation(msg) => msg.clone(),
                _ => "invalid request".to_string(),
            },
            ErrorKind::Encryption => "failed to encrypt payload".to_string(),
            ErrorKind::KeyWrap => "recipient public key rejected".to_string(),
            ErrorKind::UnwrapFailure | ErrorKind::AuthenticationFailure => {
                "authentication failed".to_string()
            }
            ErrorKind::StorageUnavailable => "storage backend unavailable".to_string(),
            ErrorKind::NotFound => "content not found".to_string(),
            ErrorKind::Assembly => "internal error".to_string(),
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sealbox_core::ContentAddress;

    #[test]
    fn test_kind_classification() {
        let cases: Vec<(PipelineError, ErrorKind)> = vec![
            (
                PipelineError::InputValidation("file bytes missing".into()),
                ErrorKind::InputValidation,
            ),
            (
                PipelineError::Cipher(CoreError::AuthenticationFailure),
                ErrorKind::AuthenticationFailure,
            ),
            (
                PipelineError::Wrap(WrapError::MalformedRecipientKey),
                ErrorKind::KeyWrap,
            ),
            (
                PipelineError::Wrap(WrapError::UnwrapFailure),
                ErrorKind::UnwrapFailure,
            ),
            (
                PipelineError::Store(StoreError::Unavailable { attempts: 4 }),
                ErrorKind::StorageUnavailable,
            ),
            (
                PipelineError::Store(StoreError::NotFound(ContentAddress::from_bytes(
                    [1; 32],
                ))),
                ErrorKind::NotFound,
            ),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn test_tamper_and_wrong_key_share_one_message() {
        let tampered = PipelineError::Cipher(CoreError::AuthenticationFailure);
        let wrong_key = PipelineError::Wrap(WrapError::UnwrapFailure);
        assert_eq!(tampered.public_message(), wrong_key.public_message());
    }

    #[test]
    fn test_public_message_hides_backend_detail() {
        let err = PipelineError::Store(StoreError::Transient(
            "connection reset by backend at 10.0.0.7".into(),
        ));
        assert!(!err.public_message().contains("10.0.0.7"));
    }

    #[test]
    fn test_kind_strings_stable() {
        assert_eq!(ErrorKind::KeyWrap.as_str(), "KeyWrapError");
        assert_eq!(ErrorKind::UnwrapFailure.as_str(), "UnwrapFailure");
        assert_eq!(ErrorKind::StorageUnavailable.as_str(), "StorageUnavailable");
    }
}
