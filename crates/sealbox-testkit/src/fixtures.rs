//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a pipeline over a memory
//! store, with a recipient keypair and request builders.

use std::sync::Arc;

use bytes::Bytes;

use sealbox::{Pipeline, PipelineConfig, Receipt, RecoverRequest, UploadRequest};
use sealbox_store::MemoryStore;
use sealbox_wrap::{RecipientPublicKey, RecipientSecretKey};

/// A test fixture: recipient keypair, memory store, and a pipeline over
/// both.
pub struct TestFixture {
    pub recipient_secret: RecipientSecretKey,
    pub store: Arc<MemoryStore>,
    pub pipeline: Pipeline<MemoryStore>,
}

impl TestFixture {
    /// Create a fixture with a random recipient and default config.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create with explicit pipeline configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(Arc::clone(&store), config);
        Self {
            recipient_secret: RecipientSecretKey::generate(),
            store,
            pipeline,
        }
    }

    /// Create with a deterministic recipient keypair from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(Arc::clone(&store), PipelineConfig::default());
        Self {
            recipient_secret: RecipientSecretKey::from_bytes(seed),
            store,
            pipeline,
        }
    }

    /// The recipient's public key.
    pub fn recipient_public(&self) -> RecipientPublicKey {
        self.recipient_secret.public_key()
    }

    /// Build an upload request addressed to this fixture's recipient.
    pub fn upload_request(&self, bytes: &[u8], name: &str) -> UploadRequest {
        UploadRequest {
            file_bytes: Bytes::copy_from_slice(bytes),
            file_name: name.to_string(),
            recipient_public_key: self.recipient_public().to_hex(),
        }
    }

    /// Build a recovery request using this fixture's private key.
    pub fn recover_request(&self, receipt: Receipt) -> RecoverRequest {
        RecoverRequest {
            receipt,
            recipient_secret_key: hex::encode(self.recipient_secret.to_bytes()),
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures with distinct deterministic recipients.
pub fn multi_recipient_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xA5;
            TestFixture::with_seed(seed)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_roundtrip() {
        let fixture = TestFixture::new();
        let request = fixture.upload_request(b"fixture payload", "fixture.bin");

        let receipt = fixture.pipeline.upload(request).await.unwrap();
        let plaintext = fixture
            .pipeline
            .recover(fixture.recover_request(receipt))
            .await
            .unwrap();

        assert_eq!(plaintext, b"fixture payload");
    }

    #[tokio::test]
    async fn test_multi_recipient_distinct_keys() {
        let fixtures = multi_recipient_fixtures(3);
        let keys: Vec<_> = fixtures.iter().map(|f| f.recipient_public()).collect();

        assert_ne!(keys[0], keys[1]);
        assert_ne!(keys[1], keys[2]);
        assert_ne!(keys[0], keys[2]);
    }

    #[test]
    fn test_seeded_fixture_deterministic() {
        let f1 = TestFixture::with_seed([0x42; 32]);
        let f2 = TestFixture::with_seed([0x42; 32]);
        assert_eq!(f1.recipient_public(), f2.recipient_public());
    }
}
