// src/state.rs
//! Process state shared by the poller and the archiver.
//!
//! `FeedState` owns the retention buffer and the "last stored" watermark.
//! The poller is the only caller of [`FeedState::append`], the archiver the
//! only caller of [`FeedState::record_stored`]. Both run on the same task, so
//! no lock is needed around it; the HTTP side only ever sees a copied
//! [`FeedStatus`].

use serde::Serialize;
use std::sync::{Arc, RwLock};

use crate::rolling::{AppendOutcome, RetentionBuffer};
use crate::snapshot::Snapshot;
use crate::tiers::{self, Candidate};

#[derive(Debug, Default)]
pub struct FeedState {
    buffer: RetentionBuffer,
    last_stored_at: Option<f64>,
}

impl FeedState {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buffer: RetentionBuffer::with_capacity(cap),
            last_stored_at: None,
        }
    }

    pub fn append(&mut self, snapshot: Snapshot) -> AppendOutcome {
        self.buffer.append(snapshot)
    }

    pub fn record_stored(&mut self, now: f64) {
        self.last_stored_at = Some(now);
    }

    pub fn select_candidate(&self) -> Option<Candidate<'_>> {
        tiers::select_candidate(&self.buffer, self.last_stored_at)
    }

    pub fn buffer(&self) -> &RetentionBuffer {
        &self.buffer
    }

    /// `None` until the first successful store.
    pub fn last_stored_at(&self) -> Option<f64> {
        self.last_stored_at
    }
}

/// Point-in-time view for `/status`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FeedStatus {
    pub cycles: u64,
    pub buffer_len: usize,
    pub latest_now: Option<f64>,
    pub last_stored_at: Option<f64>,
    pub last_stored_path: Option<String>,
    pub stored_total: u64,
    pub duplicates_total: u64,
    pub fetch_errors_total: u64,
    pub write_errors_total: u64,
    pub last_error: Option<String>,
}

pub type SharedStatus = Arc<RwLock<FeedStatus>>;

pub fn shared_status() -> SharedStatus {
    Arc::new(RwLock::new(FeedStatus::default()))
}
