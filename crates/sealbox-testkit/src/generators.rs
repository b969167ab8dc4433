//! Proptest generators and crypto-level property tests.

use proptest::prelude::*;

use sealbox_wrap::{RecipientPublicKey, RecipientSecretKey};

/// Generate payload bytes up to the given length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate non-empty payload bytes up to the given length.
pub fn nonempty_payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=max_len)
}

/// Generate a recipient secret key from an arbitrary seed.
pub fn recipient_secret() -> impl Strategy<Value = RecipientSecretKey> {
    any::<[u8; 32]>().prop_map(RecipientSecretKey::from_bytes)
}

/// Generate a recipient public key.
pub fn recipient_public() -> impl Strategy<Value = RecipientPublicKey> {
    recipient_secret().prop_map(|s| s.public_key())
}

/// Generate a file name.
pub fn file_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,24}\\.(bin|pdf|dcm)".prop_map(String::from)
}
