// src/archive/sink.rs
use anyhow::{Context, Result};
use std::path::PathBuf;

use super::layout::ArchiveLayout;
use crate::snapshot::Snapshot;

#[async_trait::async_trait]
pub trait SnapshotSink: Send + Sync {
    /// Persist one snapshot; returns where it went.
    async fn store(&self, snapshot: &Snapshot) -> Result<PathBuf>;
}

/// Writes canonical snapshot JSON under the time-bucketed layout.
/// An existing file at the same path is overwritten.
#[derive(Debug, Clone)]
pub struct FsSink {
    layout: ArchiveLayout,
}

impl FsSink {
    pub fn new(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }
}

#[async_trait::async_trait]
impl SnapshotSink for FsSink {
    async fn store(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let path = self.layout.path_for(snapshot.now())?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        tokio::fs::write(&path, snapshot.as_bytes())
            .await
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}
