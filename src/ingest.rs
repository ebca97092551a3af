//! Running a provider and writing its records as JSON lines

use std::io::{BufWriter, Write};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::fetch::{DelayedRequester, FetchError, Requester, RequesterConfig};
use crate::providers::{
    IngestContext, MediaRecord, ProviderError, ProviderRegistry, RegistryError,
};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// Provider registry plus the run bookkeeping around it
pub struct Ingestor {
    registry: ProviderRegistry,
}

impl Ingestor {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }

    /// Registry with every built-in provider sharing one delayed requester
    pub fn from_config(config: &Config) -> Result<Self, IngestError> {
        let requester: Arc<dyn Requester> =
            Arc::new(DelayedRequester::new(RequesterConfig::from(&config.http))?);
        Ok(Self::with_requester(config, requester))
    }

    pub fn with_requester(config: &Config, requester: Arc<dyn Requester>) -> Self {
        Self::new(ProviderRegistry::with_defaults(config, requester))
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub async fn run(
        &self,
        provider: &str,
        ctx: IngestContext,
    ) -> Result<Vec<MediaRecord>, IngestError> {
        let handler = self.registry.get(provider)?;
        let stats = ctx.stats.clone();

        info!(provider, run_id = %ctx.run_id, "Starting run");
        let records = handler.ingest(ctx).await?;
        stats.log_summary(provider);

        Ok(records)
    }
}

/// Write one JSON object per line, returning the number written
pub fn write_records<W: Write>(records: &[MediaRecord], out: W) -> Result<usize, IngestError> {
    let mut writer = BufWriter::new(out);

    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(records.len())
}
