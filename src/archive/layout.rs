// src/archive/layout.rs
use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

pub const DEFAULT_ROOT: &str = "/app/to_store";
pub const DEFAULT_PREFIX: &str = "adsblol";
pub const DEFAULT_EXT: &str = "json";

/// Where archived snapshots land:
/// `<root>/YYYY/MM/DD/HH/MM/<prefix>-YYYY-MM-DD-HH-MM-SS.<ext>` in local time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub root: PathBuf,
    pub prefix: String,
    pub ext: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_ROOT),
            prefix: DEFAULT_PREFIX.to_string(),
            ext: DEFAULT_EXT.to_string(),
        }
    }
}

impl ArchiveLayout {
    pub fn new(
        root: impl Into<PathBuf>,
        prefix: impl Into<String>,
        ext: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            // accept both "json" and ".json"
            ext: ext.into().trim_start_matches('.').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full file path for a snapshot produced at `now` (unix seconds).
    pub fn path_for(&self, now: f64) -> Result<PathBuf> {
        let dt = local_datetime(now)?;
        let dir = dt.format("%Y/%m/%d/%H/%M").to_string();
        let file = format!(
            "{}-{}.{}",
            self.prefix,
            dt.format("%Y-%m-%d-%H-%M-%S"),
            self.ext
        );
        Ok(self.root.join(dir).join(file))
    }
}

/// Fractional unix seconds to local wall-clock time. Ambiguous local times
/// (DST fall-back) resolve to the earlier instant.
pub fn local_datetime(now: f64) -> Result<DateTime<Local>> {
    if !now.is_finite() {
        return Err(anyhow!("timestamp is not finite: {now}"));
    }
    let secs = now.floor();
    if secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return Err(anyhow!("timestamp out of range: {now}"));
    }
    let nanos = (((now - secs) * 1e9) as u32).min(999_999_999);
    Local
        .timestamp_opt(secs as i64, nanos)
        .earliest()
        .ok_or_else(|| anyhow!("timestamp has no local representation: {now}"))
}
