//! End-to-end pipeline tests against the external contract: upload and
//! recovery round trips, the error taxonomy, and the all-or-nothing
//! receipt guarantee.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use sealbox::{
    BlobMeta, BlobStore, ContentAddress, ErrorKind, FailureResponse, LockedKey, MemoryStore,
    Pipeline, PipelineConfig, RecoverRequest, Retrying, RetryPolicy, UploadRequest,
    UploadResponse,
};
use sealbox::store::StoreError;
use sealbox::wrap::RecipientSecretKey;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn upload_request(bytes: &[u8], name: &str, recipient_hex: &str) -> UploadRequest {
    UploadRequest {
        file_bytes: Bytes::copy_from_slice(bytes),
        file_name: name.to_string(),
        recipient_public_key: recipient_hex.to_string(),
    }
}

fn recover_request(receipt: sealbox::Receipt, secret: &RecipientSecretKey) -> RecoverRequest {
    RecoverRequest {
        receipt,
        recipient_secret_key: hex::encode(secret.to_bytes()),
    }
}

#[tokio::test]
async fn test_upload_and_recover_helloworld() {
    init_tracing();

    let recipient = RecipientSecretKey::generate();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), PipelineConfig::default());

    let receipt = pipeline
        .upload(upload_request(
            b"HELLOWORLD",
            "hello.txt",
            &recipient.public_key().to_hex(),
        ))
        .await
        .unwrap();

    // Transport form of the receipt.
    let response = UploadResponse::from_receipt(&receipt);
    assert!(response.success);
    assert!(!response.content_address.is_empty());
    assert_eq!(response.locked_key.len(), LockedKey::LEN * 2);
    assert_eq!(response.nonce.len(), 24);
    assert_eq!(response.tag.len(), 32);

    // The store holds only ciphertext, never the plaintext.
    let stored = store.get(&receipt.content_address).await.unwrap();
    assert_eq!(stored.len(), b"HELLOWORLD".len());
    assert_ne!(stored.as_slice(), b"HELLOWORLD");

    let plaintext = pipeline
        .recover(recover_request(receipt, &recipient))
        .await
        .unwrap();
    assert_eq!(plaintext, b"HELLOWORLD");
}

#[tokio::test]
async fn test_recovery_with_wrong_private_key_fails() {
    let recipient = RecipientSecretKey::generate();
    let stranger = RecipientSecretKey::generate();
    let pipeline = Pipeline::new(Arc::new(MemoryStore::new()), PipelineConfig::default());

    let receipt = pipeline
        .upload(upload_request(
            b"for the recipient only",
            "private.bin",
            &recipient.public_key().to_hex(),
        ))
        .await
        .unwrap();

    let err = pipeline
        .recover(recover_request(receipt, &stranger))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnwrapFailure);
}

#[tokio::test]
async fn test_malformed_recipient_key_uploads_nothing() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), PipelineConfig::default());

    for bad_key in ["deadbeef", "not hex at all", "abcdef12"] {
        let err = pipeline
            .upload(upload_request(b"some file", "file.bin", bad_key))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyWrap, "key {:?}", bad_key);
    }

    assert!(store.is_empty(), "ciphertext must not reach the store");
}

#[tokio::test]
async fn test_validation_rejects_before_any_work() {
    let store = Arc::new(MemoryStore::new());
    let config = PipelineConfig {
        max_payload_bytes: 16,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(Arc::clone(&store), config);
    let recipient_hex = RecipientSecretKey::generate().public_key().to_hex();

    // Empty payload.
    let err = pipeline
        .upload(upload_request(b"", "empty.bin", &recipient_hex))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);

    // Oversized payload.
    let err = pipeline
        .upload(upload_request(&[0u8; 64], "big.bin", &recipient_hex))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);

    assert!(store.is_empty());
}

/// A store whose every operation fails transiently.
struct DeadStore;

#[async_trait]
impl BlobStore for DeadStore {
    async fn put(&self, _bytes: &[u8], _meta: &BlobMeta) -> Result<ContentAddress, StoreError> {
        Err(StoreError::Transient("backend down".into()))
    }

    async fn get(&self, _address: &ContentAddress) -> Result<Vec<u8>, StoreError> {
        Err(StoreError::Transient("backend down".into()))
    }

    async fn exists(&self, _address: &ContentAddress) -> Result<bool, StoreError> {
        Err(StoreError::Transient("backend down".into()))
    }
}

#[tokio::test]
async fn test_no_partial_receipt_when_store_exhausts_retries() {
    init_tracing();

    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    };
    let store = Arc::new(Retrying::with_policy(DeadStore, policy));
    let pipeline = Pipeline::new(store, PipelineConfig::default());
    let recipient_hex = RecipientSecretKey::generate().public_key().to_hex();

    let err = pipeline
        .upload(upload_request(b"doomed payload", "doomed.bin", &recipient_hex))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

    let body = FailureResponse::from(&err);
    assert!(!body.success);
    assert_eq!(body.error_kind, "StorageUnavailable");
    assert!(!body.message.contains("backend down"));
}

#[tokio::test]
async fn test_unknown_address_reports_not_found() {
    let recipient = RecipientSecretKey::generate();

    // Upload through one pipeline, recover through another with an empty
    // store: the receipt is valid but the content is elsewhere.
    let uploader = Pipeline::new(Arc::new(MemoryStore::new()), PipelineConfig::default());
    let receipt = uploader
        .upload(upload_request(
            b"stored elsewhere",
            "misplaced.bin",
            &recipient.public_key().to_hex(),
        ))
        .await
        .unwrap();

    let empty = Pipeline::new(Arc::new(MemoryStore::new()), PipelineConfig::default());
    let err = empty
        .recover(recover_request(receipt, &recipient))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_reencryption_addresses_differ_but_store_is_deterministic() {
    let recipient_hex = RecipientSecretKey::generate().public_key().to_hex();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), PipelineConfig::default());

    // Same plaintext twice: fresh key and nonce per call, so ciphertext
    // and therefore address must differ.
    let r1 = pipeline
        .upload(upload_request(b"identical plaintext", "a.bin", &recipient_hex))
        .await
        .unwrap();
    let r2 = pipeline
        .upload(upload_request(b"identical plaintext", "b.bin", &recipient_hex))
        .await
        .unwrap();
    assert_ne!(r1.content_address, r2.content_address);
    assert_ne!(r1.nonce, r2.nonce);

    // Identical ciphertext bytes, on the other hand, always map to the
    // identical address.
    let ciphertext = store.get(&r1.content_address).await.unwrap();
    let again = store
        .put(&ciphertext, &BlobMeta::new("a.bin"))
        .await
        .unwrap();
    assert_eq!(again, r1.content_address);
}

#[tokio::test]
async fn test_tampered_stored_ciphertext_fails_authentication() {
    let recipient = RecipientSecretKey::generate();
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(Arc::clone(&store), PipelineConfig::default());

    let receipt = pipeline
        .upload(upload_request(
            b"integrity protected",
            "tamper.bin",
            &recipient.public_key().to_hex(),
        ))
        .await
        .unwrap();

    // Corrupt one bit of the blob and re-store it under the address the
    // receipt points at.
    let mut ciphertext = store.get(&receipt.content_address).await.unwrap();
    ciphertext[0] ^= 0x01;
    let tampered_address = store
        .put(&ciphertext, &BlobMeta::new("tamper.bin"))
        .await
        .unwrap();

    let mut tampered_receipt = receipt;
    tampered_receipt.content_address = tampered_address;

    let err = pipeline
        .recover(recover_request(tampered_receipt, &recipient))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
}

/// A store slow enough to cancel mid-upload.
struct SlowStore(MemoryStore);

#[async_trait]
impl BlobStore for SlowStore {
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress, StoreError> {
        tokio::time::sleep(Duration::from_millis(250)).await;
        self.0.put(bytes, meta).await
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>, StoreError> {
        self.0.get(address).await
    }

    async fn exists(&self, address: &ContentAddress) -> Result<bool, StoreError> {
        self.0.exists(address).await
    }
}

#[tokio::test]
async fn test_cancelled_upload_yields_no_receipt() {
    let pipeline = Pipeline::new(Arc::new(SlowStore(MemoryStore::new())), PipelineConfig::default());
    let recipient_hex = RecipientSecretKey::generate().public_key().to_hex();

    let attempt = tokio::time::timeout(
        Duration::from_millis(10),
        pipeline.upload(upload_request(b"cancelled", "c.bin", &recipient_hex)),
    )
    .await;

    // The future was dropped before Assembling: the caller holds nothing.
    assert!(attempt.is_err());
}
