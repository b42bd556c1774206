//! # Rolling Window
//! Bounded retention buffer of the most recent distinct snapshots (default 30).
//!
//! Oldest entries sit at the front. Appending a snapshot identical to the
//! current tail is a no-op; appending past capacity evicts from the front.

use std::collections::VecDeque;

use crate::snapshot::Snapshot;

pub const DEFAULT_CAPACITY: usize = 30;
/// Hard upper bound; larger requested capacities are clamped to it.
pub const MAX_CAPACITY: usize = 30;

/// Result of [`RetentionBuffer::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Content-identical to the current tail; buffer unchanged.
    Duplicate,
    /// Pushed to the back. `evicted` is set when the oldest entry was dropped.
    Appended { evicted: bool },
}

#[derive(Debug)]
pub struct RetentionBuffer {
    buf: VecDeque<Snapshot>,
    cap: usize,
}

impl RetentionBuffer {
    /// Create an empty buffer. Capacity is clamped to `1..=MAX_CAPACITY`.
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_CAPACITY);
        Self {
            buf: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn append(&mut self, snapshot: Snapshot) -> AppendOutcome {
        if let Some(last) = self.buf.back() {
            if last.same_content(&snapshot) {
                return AppendOutcome::Duplicate;
            }
        }

        self.buf.push_back(snapshot);
        let mut evicted = false;
        while self.buf.len() > self.cap {
            self.buf.pop_front();
            evicted = true;
        }
        AppendOutcome::Appended { evicted }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn oldest(&self) -> Option<&Snapshot> {
        self.buf.front()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.buf.back()
    }

    /// Oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.buf.iter()
    }

    pub fn iter_newest_first(&self) -> impl Iterator<Item = &Snapshot> {
        self.buf.iter().rev()
    }
}

impl Default for RetentionBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}
