//! The pipeline orchestrator: sequences encryption, upload, key wrapping,
//! and receipt assembly for one request at a time, many requests in
//! parallel.
//!
//! Per request the stages run `Received → Encrypting → Uploading /
//! KeyWrapping → Assembling → Completed`, with `Failed` terminal from any
//! point. Uploading and key wrapping both depend only on the encryption
//! output and run concurrently; assembly waits on both. The orchestrator
//! adds no retries of its own - the store client already retries
//! transient faults internally.

use std::sync::Arc;

use tokio::sync::Semaphore;

use sealbox_core::{AeadCipher, ChaCha20Engine, SealedFile};
use sealbox_store::{BlobMeta, BlobStore};
use sealbox_wrap::{KeyWrapper, X25519Wrapper};

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::notary::Notary;
use crate::receipt::Receipt;
use crate::request::{RecoverRequest, UploadRequest};

/// Pipeline stages, in order. Used for structured logging; the ordering
/// itself is enforced by the control flow in [`Pipeline::upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Encrypting,
    Uploading,
    KeyWrapping,
    Assembling,
    Completed,
    Failed,
}

impl Stage {
    /// Stable label for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Encrypting => "encrypting",
            Stage::Uploading => "uploading",
            Stage::KeyWrapping => "key_wrapping",
            Stage::Assembling => "assembling",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        }
    }
}

/// The pipeline: one instance serves many concurrent requests.
///
/// Generic over its three capabilities - store, cipher, and key wrapper -
/// so tests can substitute doubles without touching orchestration logic.
/// Construct once at startup and share by reference.
pub struct Pipeline<S, C = ChaCha20Engine, W = X25519Wrapper> {
    store: Arc<S>,
    cipher: C,
    wrapper: W,
    config: PipelineConfig,
    pipelines: Semaphore,
    store_slots: Semaphore,
    notary: Option<Arc<dyn Notary>>,
}

impl<S: BlobStore> Pipeline<S> {
    /// Create a pipeline with the production cipher and wrapper.
    pub fn new(store: Arc<S>, config: PipelineConfig) -> Self {
        Self::with_parts(store, ChaCha20Engine::new(), X25519Wrapper::new(), config)
    }
}

impl<S: BlobStore, C: AeadCipher, W: KeyWrapper> Pipeline<S, C, W> {
    /// Create a pipeline with explicit capability implementations.
    pub fn with_parts(store: Arc<S>, cipher: C, wrapper: W, config: PipelineConfig) -> Self {
        let pipelines = Semaphore::new(config.max_concurrent_pipelines);
        let store_slots = Semaphore::new(config.max_store_connections);
        Self {
            store,
            cipher,
            wrapper,
            config,
            pipelines,
            store_slots,
            notary: None,
        }
    }

    /// Attach an optional notarization collaborator.
    pub fn with_notary(mut self, notary: Arc<dyn Notary>) -> Self {
        self.notary = Some(notary);
        self
    }

    /// Access the store backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Secure a file for one recipient and return the receipt.
    ///
    /// On any failure no receipt exists; an already-uploaded ciphertext
    /// becomes an orphan whose cleanup belongs to the store's garbage
    /// collection, not to this pipeline. Dropping the returned future
    /// before completion likewise yields no receipt, and the one-time key
    /// is erased when the in-flight state unwinds.
    pub async fn upload(&self, request: UploadRequest) -> Result<Receipt> {
        let _permit = self
            .pipelines
            .acquire()
            .await
            .expect("pipeline semaphore closed");

        tracing::debug!(
            stage = Stage::Received.as_str(),
            file = %request.file_name,
            "upload received"
        );

        match self.run_upload(request).await {
            Ok(receipt) => {
                tracing::debug!(
                    stage = Stage::Completed.as_str(),
                    address = %receipt.content_address,
                    "upload completed"
                );
                Ok(receipt)
            }
            Err(err) => {
                tracing::warn!(
                    stage = Stage::Failed.as_str(),
                    kind = err.kind().as_str(),
                    error = %err,
                    "upload failed"
                );
                Err(err)
            }
        }
    }

    async fn run_upload(&self, request: UploadRequest) -> Result<Receipt> {
        let valid = request.validate(self.config.max_payload_bytes)?;

        tracing::debug!(
            stage = Stage::Encrypting.as_str(),
            size = valid.file_bytes.len(),
            "sealing file under one-time key"
        );
        let SealedFile {
            ciphertext,
            key,
            nonce,
            tag,
        } = self.cipher.encrypt(&valid.file_bytes)?;

        let meta = BlobMeta::new(&valid.file_name).with_label("status", "encrypted");

        let upload = async {
            let _slot = self
                .store_slots
                .acquire()
                .await
                .expect("store semaphore closed");
            tracing::debug!(stage = Stage::Uploading.as_str(), "uploading ciphertext");
            self.store.put(&ciphertext, &meta).await
        };
        let wrap = async {
            tracing::debug!(stage = Stage::KeyWrapping.as_str(), "wrapping file key");
            self.wrapper.wrap(&valid.recipient, &key)
        };
        let (address, locked) = tokio::join!(upload, wrap);

        // Both consumers of the one-time key are done; erase it before any
        // failure can propagate.
        drop(key);

        let locked = locked?;
        let address = address?;

        tracing::debug!(
            stage = Stage::Assembling.as_str(),
            %address,
            "assembling receipt"
        );
        let receipt = Receipt::assemble(address, locked, nonce, tag, valid.file_name, now_millis());

        if let Some(notary) = &self.notary {
            let notary = Arc::clone(notary);
            let address = receipt.content_address;
            tokio::spawn(async move {
                if let Err(err) = notary.record(&address).await {
                    tracing::warn!(%address, error = %err, "notarization failed");
                }
            });
        }

        Ok(receipt)
    }

    /// Recover the original bytes from a receipt and the recipient's
    /// private key.
    pub async fn recover(&self, request: RecoverRequest) -> Result<Vec<u8>> {
        let _permit = self
            .pipelines
            .acquire()
            .await
            .expect("pipeline semaphore closed");

        tracing::debug!(
            stage = Stage::Received.as_str(),
            address = %request.receipt.content_address,
            "recovery received"
        );

        match self.run_recover(request).await {
            Ok(plaintext) => {
                tracing::debug!(stage = Stage::Completed.as_str(), "recovery completed");
                Ok(plaintext)
            }
            Err(err) => {
                tracing::warn!(
                    stage = Stage::Failed.as_str(),
                    kind = err.kind().as_str(),
                    error = %err,
                    "recovery failed"
                );
                Err(err)
            }
        }
    }

    async fn run_recover(&self, request: RecoverRequest) -> Result<Vec<u8>> {
        let secret = request.validated_secret()?;
        let receipt = &request.receipt;

        let ciphertext = {
            let _slot = self
                .store_slots
                .acquire()
                .await
                .expect("store semaphore closed");
            self.store.get(&receipt.content_address).await?
        };

        let key = self.wrapper.unwrap(&secret, &receipt.locked_key)?;
        let plaintext = self
            .cipher
            .decrypt(&ciphertext, &key, &receipt.nonce, &receipt.tag)?;
        drop(key);

        Ok(plaintext)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}
