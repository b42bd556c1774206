// src/config/archiver.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::archive::layout::{ArchiveLayout, DEFAULT_EXT, DEFAULT_PREFIX, DEFAULT_ROOT};
use crate::ingest::providers::http_feed::DEFAULT_FEED_PATH;
use crate::rolling::{DEFAULT_CAPACITY, MAX_CAPACITY};

pub const ENV_CONFIG_PATH: &str = "ARCHIVER_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/archiver.toml";

fn default_port() -> u16 {
    8080
}
fn default_feed_path() -> String {
    DEFAULT_FEED_PATH.to_string()
}
fn default_root_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ROOT)
}
fn default_file_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}
fn default_file_ext() -> String {
    DEFAULT_EXT.to_string()
}
fn default_poll_interval_secs() -> u64 {
    1
}
fn default_request_timeout_secs() -> u64 {
    5
}
fn default_buffer_capacity() -> usize {
    DEFAULT_CAPACITY
}
fn default_write_backoff_base_ms() -> u64 {
    1_000
}
fn default_write_backoff_max_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiverConfig {
    /// Upstream hosts, e.g. `"10.0.0.5:8080"`.
    #[serde(default)]
    pub hubs: Vec<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `/aircraft.json`; some deployments serve `/aircrafts.json`.
    #[serde(default = "default_feed_path")]
    pub feed_path: String,
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    #[serde(default = "default_file_ext")]
    pub file_ext: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
    #[serde(default = "default_write_backoff_base_ms")]
    pub write_backoff_base_ms: u64,
    #[serde(default = "default_write_backoff_max_secs")]
    pub write_backoff_max_secs: u64,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            hubs: Vec::new(),
            port: default_port(),
            feed_path: default_feed_path(),
            root_dir: default_root_dir(),
            file_prefix: default_file_prefix(),
            file_ext: default_file_ext(),
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            buffer_capacity: default_buffer_capacity(),
            write_backoff_base_ms: default_write_backoff_base_ms(),
            write_backoff_max_secs: default_write_backoff_max_secs(),
        }
    }
}

impl ArchiverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ArchiverConfig = toml::from_str(s).context("parsing archiver config")?;
        Ok(cfg.sanitized())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading archiver config from {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $ARCHIVER_CONFIG_PATH (must exist)
    /// 2) config/archiver.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let base = if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        base.with_env_overrides()
    }

    /// `ARCHIVER_HUBS` (comma-separated), `PORT`, `ARCHIVER_ROOT`.
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(hubs) = env::var("ARCHIVER_HUBS") {
            self.hubs = hubs.split(',').map(str::to_string).collect();
        }
        if let Ok(port) = env::var("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {port:?}"))?;
        }
        if let Ok(root) = env::var("ARCHIVER_ROOT") {
            if !root.trim().is_empty() {
                self.root_dir = PathBuf::from(root.trim());
            }
        }
        Ok(self.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let mut seen = std::collections::BTreeSet::new();
        self.hubs = self
            .hubs
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty() && seen.insert(h.clone()))
            .collect();
        if self.feed_path.trim().is_empty() {
            self.feed_path = default_feed_path();
        }
        if self.file_prefix.trim().is_empty() {
            self.file_prefix = default_file_prefix();
        }
        if self.poll_interval_secs == 0 {
            self.poll_interval_secs = default_poll_interval_secs();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.buffer_capacity == 0 {
            self.buffer_capacity = default_buffer_capacity();
        } else if self.buffer_capacity > MAX_CAPACITY {
            tracing::warn!(
                requested = self.buffer_capacity,
                max = MAX_CAPACITY,
                "buffer_capacity above maximum, clamping"
            );
            self.buffer_capacity = MAX_CAPACITY;
        }
        if self.write_backoff_base_ms == 0 {
            self.write_backoff_base_ms = default_write_backoff_base_ms();
        }
        self
    }

    pub fn layout(&self) -> ArchiveLayout {
        ArchiveLayout::new(&self.root_dir, &self.file_prefix, &self.file_ext)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn write_backoff_base(&self) -> Duration {
        Duration::from_millis(self.write_backoff_base_ms)
    }

    pub fn write_backoff_max(&self) -> Duration {
        Duration::from_secs(self.write_backoff_max_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = ArchiverConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ArchiverConfig::default());
        assert_eq!(cfg.feed_path, "/aircraft.json");
        assert_eq!(cfg.buffer_capacity, 30);
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn hubs_are_trimmed_and_deduped_and_zeros_fall_back() {
        let cfg = ArchiverConfig::from_toml_str(
            r#"
            hubs = [" 10.0.0.5:8080 ", "", "10.0.0.5:8080", "hub-b"]
            feed_path = "/aircrafts.json"
            poll_interval_secs = 0
            buffer_capacity = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.hubs, vec!["10.0.0.5:8080".to_string(), "hub-b".to_string()]);
        assert_eq!(cfg.feed_path, "/aircrafts.json");
        assert_eq!(cfg.poll_interval_secs, 1);
        assert_eq!(cfg.buffer_capacity, 30);
    }

    #[test]
    fn layout_uses_configured_root() {
        let cfg = ArchiverConfig::from_toml_str(
            r#"
            root_dir = "/srv/archive"
            file_prefix = "feed"
            file_ext = ".json"
            "#,
        )
        .unwrap();
        let layout = cfg.layout();
        assert_eq!(layout.root(), Path::new("/srv/archive"));
        assert_eq!(layout.prefix, "feed");
        assert_eq!(layout.ext, "json");
    }

    #[test]
    fn buffer_capacity_cannot_exceed_thirty() {
        let cfg = ArchiverConfig::from_toml_str("buffer_capacity = 100").unwrap();
        assert_eq!(cfg.buffer_capacity, 30);

        let mut state = crate::state::FeedState::with_capacity(cfg.buffer_capacity);
        for i in 0..100 {
            let s = crate::snapshot::Snapshot::from_value(serde_json::json!({ "now": i })).unwrap();
            state.append(s);
        }
        assert_eq!(state.buffer().len(), 30);

        let small = ArchiverConfig::from_toml_str("buffer_capacity = 10").unwrap();
        assert_eq!(small.buffer_capacity, 10);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(ArchiverConfig::from_toml_str("port = \"eighty\"").is_err());
    }
}
