//! The receipt: the durable record that, combined with the recipient's
//! private key, is sufficient to recover the original file.
//!
//! A receipt is assembled exactly once, after the upload and the key wrap
//! have both succeeded. It is never built from partial results; the
//! orchestrator enforces this by only calling [`Receipt::assemble`] with
//! every field in hand.

use serde::{Deserialize, Serialize};

use sealbox_core::{AuthTag, ContentAddress, FileNonce};
use sealbox_wrap::LockedKey;

use crate::error::{PipelineError, Result};

/// The durable recovery record returned to the caller.
///
/// The pipeline does not persist receipts; the caller is responsible for
/// keeping the returned value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Address of the ciphertext in the store.
    pub content_address: ContentAddress,
    /// The file key, sealed to the recipient.
    pub locked_key: LockedKey,
    /// Nonce used for the file encryption.
    pub nonce: FileNonce,
    /// Detached authentication tag over the ciphertext.
    pub tag: AuthTag,
    /// Display name of the original file.
    pub file_name: String,
    /// Assembly timestamp (Unix milliseconds).
    pub created_at: i64,
}

impl Receipt {
    /// Compose a receipt from completed pipeline outputs. Pure and
    /// non-failing: every input must already exist.
    pub fn assemble(
        content_address: ContentAddress,
        locked_key: LockedKey,
        nonce: FileNonce,
        tag: AuthTag,
        file_name: String,
        created_at: i64,
    ) -> Self {
        Self {
            content_address,
            locked_key,
            nonce,
            tag,
            file_name,
            created_at,
        }
    }

    /// Serialize to CBOR bytes for durable storage by the caller.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).expect("CBOR serialization failed");
        buf
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes)
            .map_err(|_| PipelineError::InputValidation("malformed receipt".to_string()))
    }
}
