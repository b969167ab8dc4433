//! Pipeline configuration.

/// Default maximum accepted payload size: 50 MB.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Configuration for the pipeline.
///
/// Constructed once at startup and handed to [`crate::Pipeline`]; there is
/// no global state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Requests with larger payloads are rejected before encryption.
    pub max_payload_bytes: usize,
    /// Bound on concurrently running upload/recovery pipelines. Crypto
    /// steps are CPU-bound, so this defaults to available parallelism.
    pub max_concurrent_pipelines: usize,
    /// Bound on concurrently outstanding store operations.
    pub max_store_connections: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            max_concurrent_pipelines: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            max_store_connections: 16,
        }
    }
}
