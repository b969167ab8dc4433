//! Request and response types for the pipeline's external interface.
//!
//! Validation is a distinct step: a request is checked in full before any
//! cryptographic work starts, and binary fields cross this boundary as hex
//! strings. Inside the pipeline everything is raw bytes.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use sealbox_wrap::{RecipientPublicKey, RecipientSecretKey, WrapError};

use crate::error::{PipelineError, Result};
use crate::receipt::Receipt;

/// An upload request as consumed from the caller.
#[derive(Clone)]
pub struct UploadRequest {
    /// The plaintext file contents.
    pub file_bytes: Bytes,
    /// Display name of the file.
    pub file_name: String,
    /// Hex-encoded X25519 public key of the intended recipient.
    pub recipient_public_key: String,
}

impl fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadRequest")
            .field("file_bytes", &format_args!("[{} bytes]", self.file_bytes.len()))
            .field("file_name", &self.file_name)
            .field("recipient_public_key", &self.recipient_public_key)
            .finish()
    }
}

/// A validated upload, with binary fields decoded.
pub(crate) struct ValidUpload {
    pub file_bytes: Bytes,
    pub file_name: String,
    pub recipient: RecipientPublicKey,
}

impl fmt::Debug for ValidUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidUpload")
            .field("file_bytes", &format_args!("[{} bytes]", self.file_bytes.len()))
            .field("file_name", &self.file_name)
            .field("recipient", &format_args!("{}", hex::encode(self.recipient.0)))
            .finish()
    }
}

impl UploadRequest {
    /// Validate the request against the configured payload limit.
    ///
    /// A missing field is an input-validation failure; a present but
    /// undecodable recipient key is a key-wrap failure, since the field
    /// is the recipient identity itself.
    pub(crate) fn validate(&self, max_payload_bytes: usize) -> Result<ValidUpload> {
        if self.file_bytes.is_empty() {
            return Err(PipelineError::InputValidation(
                "file bytes missing".to_string(),
            ));
        }
        if self.file_bytes.len() > max_payload_bytes {
            return Err(PipelineError::InputValidation(format!(
                "payload of {} bytes exceeds limit of {}",
                self.file_bytes.len(),
                max_payload_bytes
            )));
        }
        if self.file_name.is_empty() {
            return Err(PipelineError::InputValidation(
                "file name missing".to_string(),
            ));
        }
        if self.recipient_public_key.is_empty() {
            return Err(PipelineError::InputValidation(
                "recipient public key missing".to_string(),
            ));
        }

        let recipient = RecipientPublicKey::from_hex(&self.recipient_public_key)?;

        Ok(ValidUpload {
            file_bytes: self.file_bytes.clone(),
            file_name: self.file_name.clone(),
            recipient,
        })
    }
}

/// A recovery request: a receipt plus the recipient's private key.
pub struct RecoverRequest {
    /// The receipt returned by a previous upload.
    pub receipt: Receipt,
    /// Hex-encoded X25519 private key of the recipient.
    pub recipient_secret_key: String,
}

impl fmt::Debug for RecoverRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoverRequest")
            .field("receipt", &self.receipt)
            .field("recipient_secret_key", &"[REDACTED]")
            .finish()
    }
}

impl RecoverRequest {
    /// Decode the private key. Malformed input is indistinguishable from a
    /// wrong key to the caller.
    pub(crate) fn validated_secret(&self) -> Result<RecipientSecretKey> {
        let bytes = hex::decode(&self.recipient_secret_key)
            .map_err(|_| PipelineError::Wrap(WrapError::UnwrapFailure))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| PipelineError::Wrap(WrapError::UnwrapFailure))?;
        Ok(RecipientSecretKey::from_bytes(arr))
    }
}

/// Success response for an upload, with binary fields hex-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub content_address: String,
    pub locked_key: String,
    pub nonce: String,
    pub tag: String,
}

impl UploadResponse {
    /// Build the transport form of a receipt.
    pub fn from_receipt(receipt: &Receipt) -> Self {
        Self {
            success: true,
            content_address: receipt.content_address.to_hex(),
            locked_key: receipt.locked_key.to_hex(),
            nonce: receipt.nonce.to_hex(),
            tag: receipt.tag.to_hex(),
        }
    }
}

/// Failure response shared by all operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error_kind: String,
    pub message: String,
}

impl From<&PipelineError> for FailureResponse {
    fn from(err: &PipelineError) -> Self {
        Self {
            success: false,
            error_kind: err.kind().as_str().to_string(),
            message: err.public_message(),
        }
    }
}
