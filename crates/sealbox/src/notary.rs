//! Optional notarization hook.
//!
//! Some deployments record content addresses on an external ledger. The
//! pipeline treats this as a side-effect owned by a collaborator: it is
//! invoked fire-and-forget after assembly, its failure is logged, and it
//! can never block or fail an upload.

use async_trait::async_trait;

use sealbox_core::ContentAddress;

/// An external collaborator that records content addresses.
#[async_trait]
pub trait Notary: Send + Sync {
    /// Record the address externally. Errors are the collaborator's
    /// problem; the pipeline only logs them.
    async fn record(&self, address: &ContentAddress) -> anyhow::Result<()>;
}

/// A notary that records nothing. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotary;

#[async_trait]
impl Notary for NullNotary {
    async fn record(&self, _address: &ContentAddress) -> anyhow::Result<()> {
        Ok(())
    }
}
