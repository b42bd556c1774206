// src/ingest/mod.rs
pub mod providers;
pub mod scheduler;
pub mod types;

use crate::ingest::types::FeedSource;
use crate::rolling::AppendOutcome;
use crate::state::FeedState;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_fetch_total", "Feed documents fetched and decoded.");
        describe_counter!(
            "feed_fetch_errors_total",
            "Feed fetch/decode failures (endpoint skipped for the cycle)."
        );
        describe_histogram!("feed_fetch_ms", "Feed request time in milliseconds.");
        describe_counter!(
            "buffer_duplicates_total",
            "Fetched documents identical to the buffer tail."
        );
        describe_gauge!("buffer_len", "Snapshots currently retained.");
        describe_counter!("archive_stored_total", "Snapshots archived, by tier.");
        describe_counter!("archive_write_errors_total", "Failed archive writes.");
        describe_counter!(
            "archive_passes_skipped_total",
            "Archive passes skipped while a write failure backs off."
        );
        describe_gauge!(
            "archive_last_stored_ts",
            "`now` of the last archived snapshot."
        );
    });
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct FetchReport {
    pub appended: usize,
    pub duplicates: usize,
    /// `(source, error)` pairs.
    pub errors: Vec<(String, String)>,
}

/// Visit every source once, in order, and feed successes into the buffer.
/// A failing source is logged and skipped; the others still run.
pub async fn fetch_into(sources: &[Box<dyn FeedSource>], state: &mut FeedState) -> FetchReport {
    ensure_metrics_described();

    let mut report = FetchReport::default();
    for src in sources {
        match src.fetch().await {
            Ok(snapshot) => {
                counter!("feed_fetch_total").increment(1);
                let now = snapshot.now();
                match state.append(snapshot) {
                    AppendOutcome::Duplicate => {
                        tracing::debug!(
                            source = src.name(),
                            now,
                            "same aircraft.json, not buffering"
                        );
                        counter!("buffer_duplicates_total").increment(1);
                        report.duplicates += 1;
                    }
                    AppendOutcome::Appended { evicted } => {
                        tracing::trace!(source = src.name(), now, evicted, "buffered snapshot");
                        report.appended += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    source = src.name(),
                    "feed fetch failed"
                );
                counter!("feed_fetch_errors_total").increment(1);
                report.errors.push((src.name().to_string(), format!("{e:#}")));
            }
        }
    }

    gauge!("buffer_len").set(state.buffer().len() as f64);
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Snapshot;
    use anyhow::{anyhow, Result};
    use serde_json::json;

    struct Fixed(&'static str, Option<f64>);

    #[async_trait::async_trait]
    impl FeedSource for Fixed {
        async fn fetch(&self) -> Result<Snapshot> {
            match self.1 {
                Some(now) => Snapshot::from_value(json!({ "now": now })),
                None => Err(anyhow!("connection refused")),
            }
        }
        fn name(&self) -> &str {
            self.0
        }
    }

    #[tokio::test]
    async fn failing_source_does_not_abort_the_cycle() {
        let sources: Vec<Box<dyn FeedSource>> = vec![
            Box::new(Fixed("down", None)),
            Box::new(Fixed("a", Some(1.0))),
            Box::new(Fixed("b", Some(1.0))),
            Box::new(Fixed("c", Some(2.0))),
        ];
        let mut state = FeedState::default();
        let report = fetch_into(&sources, &mut state).await;

        assert_eq!(report.appended, 2);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "down");
        assert_eq!(state.buffer().len(), 2);
    }
}
