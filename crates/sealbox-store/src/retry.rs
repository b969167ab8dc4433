//! Retry decorator: bounded exponential backoff for transient store
//! failures.
//!
//! Wraps any [`BlobStore`]. Only errors classified transient by
//! [`StoreError::is_transient`] are retried; a caller mistake (oversized
//! payload, malformed request) or a terminal state (not found) surfaces
//! immediately.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use sealbox_core::ContentAddress;

use crate::error::{Result, StoreError};
use crate::traits::{BlobMeta, BlobStore};

/// Backoff parameters for the retry decorator.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub base_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// The backoff delay after the given failed attempt (1-indexed),
    /// with jitter.
    fn delay_after(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << (attempt - 1).min(16));
        let capped = exp.min(self.max_delay);
        // Jitter: up to half the delay again, to decorrelate contending
        // pipelines.
        let jitter_ms = rand::thread_rng().gen_range(0..=capped.as_millis() as u64 / 2);
        capped + Duration::from_millis(jitter_ms)
    }
}

/// A [`BlobStore`] decorator that retries transient failures.
pub struct Retrying<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S> Retrying<S> {
    /// Wrap a store with the default policy.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            policy: RetryPolicy::default(),
        }
    }

    /// Wrap a store with an explicit policy.
    pub fn with_policy(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Access the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        operation,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient store failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) if err.is_transient() => {
                    tracing::error!(operation, attempt, "store retries exhausted");
                    return Err(StoreError::Unavailable { attempts: attempt });
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<S: BlobStore> BlobStore for Retrying<S> {
    async fn put(&self, bytes: &[u8], meta: &BlobMeta) -> Result<ContentAddress> {
        self.run("put", || self.inner.put(bytes, meta)).await
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        self.run("get", || self.inner.get(address)).await
    }

    async fn exists(&self, address: &ContentAddress) -> Result<bool> {
        self.run("exists", || self.inner.exists(address)).await
    }
}
