// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod archive;
pub mod config;
pub mod ingest;
pub mod metrics;
pub mod rolling;
pub mod shutdown;
pub mod snapshot;
pub mod state;
pub mod tiers;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::archive::{sink::FsSink, sink::SnapshotSink, Archiver, WriteBackoff};
pub use crate::config::archiver::ArchiverConfig;
pub use crate::ingest::{providers::http_feed::HttpFeed, scheduler::Poller, types::FeedSource};
pub use crate::snapshot::Snapshot;
pub use crate::state::{FeedState, FeedStatus};

/// Build the poller described by `cfg`, writing through `FsSink`.
pub fn build_poller(cfg: &ArchiverConfig, status: state::SharedStatus) -> Poller<FsSink> {
    let client = reqwest::Client::new();
    let sources: Vec<Box<dyn FeedSource>> = cfg
        .hubs
        .iter()
        .map(|h| {
            Box::new(HttpFeed::with_client(
                client.clone(),
                h,
                &cfg.feed_path,
                cfg.request_timeout(),
            )) as Box<dyn FeedSource>
        })
        .collect();

    let archiver = Archiver::with_backoff(
        FsSink::new(cfg.layout()),
        WriteBackoff::new(cfg.write_backoff_base(), cfg.write_backoff_max()),
    );

    Poller::new(
        sources,
        FeedState::with_capacity(cfg.buffer_capacity),
        archiver,
        status,
    )
    .with_interval(cfg.poll_interval())
}
