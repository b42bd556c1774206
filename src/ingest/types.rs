// src/ingest/types.rs
use anyhow::Result;

use crate::snapshot::Snapshot;

/// One upstream producing `aircraft.json` documents.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot>;
    fn name(&self) -> &str;
}
