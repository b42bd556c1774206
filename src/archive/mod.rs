// src/archive/mod.rs
pub mod layout;
pub mod sink;

use metrics::{counter, gauge};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::state::FeedState;
use sink::SnapshotSink;

pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
pub const DEFAULT_BACKOFF_MAX: Duration = Duration::from_secs(60);

/// Exponential backoff after failed writes: base, 2×base, 4×base… capped at `max`.
/// Keeps a permanently failing path from being hammered once per cycle.
#[derive(Debug, Clone)]
pub struct WriteBackoff {
    base: Duration,
    max: Duration,
    failures: u32,
    retry_at: Option<Instant>,
}

impl WriteBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max: max.max(base),
            failures: 0,
            retry_at: None,
        }
    }

    pub fn ready(&self, now: Instant) -> bool {
        self.retry_at.map_or(true, |at| now >= at)
    }

    pub fn record_failure(&mut self, now: Instant) -> Duration {
        self.failures = self.failures.saturating_add(1);
        let shift = (self.failures - 1).min(16);
        let delay = self.base.saturating_mul(1u32 << shift).min(self.max);
        self.retry_at = Some(now + delay);
        delay
    }

    pub fn record_success(&mut self) {
        self.failures = 0;
        self.retry_at = None;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }
}

impl Default for WriteBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_BASE, DEFAULT_BACKOFF_MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub now: f64,
    pub tier: &'static str,
    pub path: PathBuf,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassReport {
    pub stored: Vec<StoredSnapshot>,
    /// Set when a write failed; the pass stopped there.
    pub error: Option<String>,
    /// The pass did not run because a previous write failure is still backing off.
    pub skipped: bool,
}

pub struct Archiver<S: SnapshotSink> {
    sink: S,
    backoff: WriteBackoff,
}

impl<S: SnapshotSink> Archiver<S> {
    pub fn new(sink: S) -> Self {
        Self::with_backoff(sink, WriteBackoff::default())
    }

    pub fn with_backoff(sink: S, backoff: WriteBackoff) -> Self {
        Self { sink, backoff }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn backoff(&self) -> &WriteBackoff {
        &self.backoff
    }

    /// Store candidates until the selector has nothing left.
    ///
    /// Each store advances the watermark to the stored `now`, which puts
    /// everything at or before it out of reach, so the loop ends on its own;
    /// the iteration cap is only a backstop.
    pub async fn run_pass(&mut self, state: &mut FeedState, now: Instant) -> PassReport {
        let mut report = PassReport::default();

        if !self.backoff.ready(now) {
            counter!("archive_passes_skipped_total").increment(1);
            tracing::debug!(
                failures = self.backoff.consecutive_failures(),
                "archive pass skipped: write backoff active"
            );
            report.skipped = true;
            return report;
        }

        for _ in 0..=state.buffer().len() {
            let Some(candidate) = state.select_candidate() else {
                if report.stored.is_empty() {
                    tracing::debug!(
                        last_stored_at = ?state.last_stored_at(),
                        buffered = state.buffer().len(),
                        "no candidate"
                    );
                }
                break;
            };
            let tier = candidate.selection.label();
            let snapshot = candidate.snapshot.clone();

            match self.sink.store(&snapshot).await {
                Ok(path) => {
                    tracing::info!(
                        tier,
                        now = snapshot.now(),
                        last_stored_at = ?state.last_stored_at(),
                        path = %path.display(),
                        "stored snapshot"
                    );
                    state.record_stored(snapshot.now());
                    self.backoff.record_success();
                    counter!("archive_stored_total", "tier" => tier).increment(1);
                    gauge!("archive_last_stored_ts").set(snapshot.now());
                    report.stored.push(StoredSnapshot {
                        now: snapshot.now(),
                        tier,
                        path,
                    });
                }
                Err(e) => {
                    let delay = self.backoff.record_failure(now);
                    tracing::error!(
                        error = %format!("{e:#}"),
                        tier,
                        now = snapshot.now(),
                        retry_in_ms = delay.as_millis() as u64,
                        "archive write failed"
                    );
                    counter!("archive_write_errors_total").increment(1);
                    report.error = Some(format!("{e:#}"));
                    break;
                }
            }
        }

        report
    }
}
