use async_trait::async_trait;
use thiserror::Error;

use super::types::{IngestContext, MediaRecord};
use crate::fetch::FetchError;

/// Provider errors. Only fatal conditions surface here; a single bad item is
/// logged and skipped inside the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("unsupported target for {provider}: {reason}")]
    UnsupportedTarget {
        provider: &'static str,
        reason: String,
    },
}

/// A content provider ingestion job
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable provider name stamped on every record
    fn name(&self) -> &'static str;

    /// Run the job and return every record it produced
    async fn ingest(&self, ctx: IngestContext) -> Result<Vec<MediaRecord>, ProviderError>;
}
