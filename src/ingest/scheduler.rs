// src/ingest/scheduler.rs
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::archive::{sink::SnapshotSink, Archiver, PassReport};
use crate::ingest::{fetch_into, types::FeedSource, FetchReport};
use crate::state::{FeedState, SharedStatus};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CycleReport {
    pub fetch: FetchReport,
    pub pass: PassReport,
}

/// Drives fetch → buffer → select → store, one cycle at a time.
pub struct Poller<S: SnapshotSink> {
    sources: Vec<Box<dyn FeedSource>>,
    state: FeedState,
    archiver: Archiver<S>,
    interval: Duration,
    status: SharedStatus,
}

impl<S: SnapshotSink> Poller<S> {
    pub fn new(
        sources: Vec<Box<dyn FeedSource>>,
        state: FeedState,
        archiver: Archiver<S>,
        status: SharedStatus,
    ) -> Self {
        Self {
            sources,
            state,
            archiver,
            interval: DEFAULT_INTERVAL,
            status,
        }
    }

    /// Pause between cycles. Measured from the end of a cycle, so slow cycles drift.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn archiver(&self) -> &Archiver<S> {
        &self.archiver
    }

    /// Fetch from every source, then archive whatever has become eligible.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let fetch = fetch_into(&self.sources, &mut self.state).await;
        let pass = self.archiver.run_pass(&mut self.state, Instant::now()).await;
        self.publish_status(&fetch, &pass);
        CycleReport { fetch, pass }
    }

    /// Loop until `shutdown` flips (or its sender goes away). An in-flight
    /// cycle is dropped at its current await point.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            sources = self.sources.len(),
            interval_ms = self.interval.as_millis() as u64,
            "poller started"
        );
        if self.sources.is_empty() {
            tracing::warn!("no feed sources configured; poller will only idle");
        }

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = self.run_cycle() => {}
                _ = shutdown.changed() => break,
            }
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = shutdown.changed() => break,
            }
        }

        tracing::info!(
            last_stored_at = ?self.state.last_stored_at(),
            "poller stopped"
        );
    }

    fn publish_status(&self, fetch: &FetchReport, pass: &PassReport) {
        let mut st = self.status.write().unwrap_or_else(|p| p.into_inner());
        st.cycles += 1;
        st.buffer_len = self.state.buffer().len();
        st.latest_now = self.state.buffer().latest().map(|s| s.now());
        st.last_stored_at = self.state.last_stored_at();
        if let Some(last) = pass.stored.last() {
            st.last_stored_path = Some(last.path.display().to_string());
        }
        st.stored_total += pass.stored.len() as u64;
        st.duplicates_total += fetch.duplicates as u64;
        st.fetch_errors_total += fetch.errors.len() as u64;
        if let Some(err) = &pass.error {
            st.write_errors_total += 1;
            st.last_error = Some(err.clone());
        } else if let Some((src, err)) = fetch.errors.last() {
            st.last_error = Some(format!("{src}: {err}"));
        }
    }
}
