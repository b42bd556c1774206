use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use reqwest::Client;
use std::time::Duration;

use crate::ingest::types::FeedSource;
use crate::snapshot::Snapshot;

pub const DEFAULT_FEED_PATH: &str = "/aircraft.json";

/// Polls `http://<host><path>` with a per-request timeout.
#[derive(Clone)]
pub struct HttpFeed {
    host: String,
    url: String,
    client: Client,
    timeout: Duration,
}

impl HttpFeed {
    pub fn new(host: &str, path: &str, timeout: Duration) -> Self {
        Self::with_client(Client::new(), host, path, timeout)
    }

    /// Share one connection pool across several hosts.
    pub fn with_client(client: Client, host: &str, path: &str, timeout: Duration) -> Self {
        Self {
            host: host.to_string(),
            url: feed_url(host, path),
            client,
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `host` may be `10.0.0.5:8080` or a full `http(s)://…` base.
pub fn feed_url(host: &str, path: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    let path = path.trim();
    let sep = if path.starts_with('/') { "" } else { "/" };
    if host.starts_with("http://") || host.starts_with("https://") {
        format!("{host}{sep}{path}")
    } else {
        format!("http://{host}{sep}{path}")
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Snapshot> {
        let t0 = std::time::Instant::now();
        let resp = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?
            .error_for_status()
            .with_context(|| format!("GET {}", self.url))?;
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("reading body of {}", self.url))?;
        histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        Snapshot::from_slice(&body).with_context(|| format!("decoding {}", self.url))
    }

    fn name(&self) -> &str {
        &self.host
    }
}
