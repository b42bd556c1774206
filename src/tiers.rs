// src/tiers.rs
//! Age-tier candidate selection.
//!
//! A snapshot becomes eligible for archiving once its age relative to the
//! last stored snapshot falls inside one of the tier windows below. The
//! windows get wider as the gap grows, so a feed that stalls for a while
//! still gets archived, just less often.

use crate::rolling::RetentionBuffer;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tier {
    pub name: &'static str,
    /// Exclusive lower bound, seconds.
    pub min_age: f64,
    /// Exclusive upper bound, seconds.
    pub max_age: f64,
}

impl Tier {
    /// Open interval on both ends: `min_age < age < max_age`.
    pub fn contains(&self, age: f64) -> bool {
        self.min_age < age && age < self.max_age
    }
}

/// Tightest first.
pub static TIERS: [Tier; 7] = [
    Tier {
        name: "gold",
        min_age: 4.5,
        max_age: 5.5,
    },
    Tier {
        name: "silver",
        min_age: 5.5,
        max_age: 7.0,
    },
    Tier {
        name: "bronze",
        min_age: 7.0,
        max_age: 10.0,
    },
    Tier {
        name: "wood",
        min_age: 10.0,
        max_age: 15.0,
    },
    Tier {
        name: "plastic",
        min_age: 15.0,
        max_age: 20.0,
    },
    Tier {
        name: "paper",
        min_age: 20.0,
        max_age: 30.0,
    },
    Tier {
        name: "stone",
        min_age: 30.0,
        max_age: 60.0,
    },
];

/// First (tightest) tier whose window contains `age`. Exact boundaries match nothing.
pub fn classify(age: f64) -> Option<&'static Tier> {
    TIERS.iter().find(|t| t.contains(age))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// Nothing stored yet; the oldest buffered snapshot is taken as-is.
    Bootstrap,
    Tier(&'static Tier),
}

impl Selection {
    pub fn label(&self) -> &'static str {
        match self {
            Selection::Bootstrap => "bootstrap",
            Selection::Tier(t) => t.name,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub snapshot: &'a Snapshot,
    pub selection: Selection,
}

/// Pick the next snapshot to archive, if any.
///
/// With no watermark the oldest buffered snapshot wins. Otherwise the buffer
/// is scanned newest to oldest and the first snapshot whose age falls in any
/// tier is returned, so recency beats tier tightness: with a watermark of 100
/// and entries at 106 (silver) and 108 (bronze), 108 is chosen.
///
/// Two other readings are possible and deliberately not used: giving up
/// when the newest entry alone is ineligible, or preferring the tightest
/// tier over the newest entry. Tightest-tier-first spaces archived snapshots
/// more evenly but lags further behind the feed.
pub fn select_candidate(buffer: &RetentionBuffer, watermark: Option<f64>) -> Option<Candidate<'_>> {
    let Some(last_stored) = watermark else {
        return buffer.oldest().map(|snapshot| Candidate {
            snapshot,
            selection: Selection::Bootstrap,
        });
    };

    buffer.iter_newest_first().find_map(|snapshot| {
        classify(snapshot.now() - last_stored).map(|tier| Candidate {
            snapshot,
            selection: Selection::Tier(tier),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn buffer_of(nows: &[f64]) -> RetentionBuffer {
        let mut b = RetentionBuffer::default();
        for &n in nows {
            b.append(Snapshot::from_value(json!({ "now": n })).unwrap());
        }
        b
    }

    #[test]
    fn tier_table_is_contiguous_and_ordered() {
        for pair in TIERS.windows(2) {
            assert_eq!(pair[0].max_age, pair[1].min_age);
            assert!(pair[0].min_age < pair[0].max_age);
        }
        assert_eq!(TIERS[0].name, "gold");
        assert_eq!(TIERS[6].name, "stone");
    }

    #[test]
    fn boundaries_are_excluded() {
        assert!(classify(4.5).is_none());
        assert_eq!(classify(4.6).unwrap().name, "gold");
        assert!(classify(5.5).is_none());
        assert!(classify(7.0).is_none());
        assert_eq!(classify(7.01).unwrap().name, "bronze");
        assert!(classify(60.0).is_none());
        assert!(classify(-3.0).is_none());
    }

    #[test]
    fn bootstrap_takes_oldest() {
        let b = buffer_of(&[10.0, 11.0, 12.0]);
        let c = select_candidate(&b, None).unwrap();
        assert_eq!(c.snapshot.now(), 10.0);
        assert_eq!(c.selection, Selection::Bootstrap);
        assert!(select_candidate(&RetentionBuffer::default(), None).is_none());
    }

    #[test]
    fn gold_lower_bound_is_open() {
        let b = buffer_of(&[104.5]);
        assert!(select_candidate(&b, Some(100.0)).is_none());

        let b = buffer_of(&[104.6]);
        let c = select_candidate(&b, Some(100.0)).unwrap();
        assert_eq!(c.selection.label(), "gold");
    }

    #[test]
    fn newest_eligible_wins_over_tighter_tier() {
        let b = buffer_of(&[106.0, 108.0]);
        let c = select_candidate(&b, Some(100.0)).unwrap();
        assert_eq!(c.snapshot.now(), 108.0);
        assert_eq!(c.selection.label(), "bronze");
    }

    #[test]
    fn ineligible_newer_entries_are_skipped() {
        // 101 is too young, 170 too old; 106 is the newest eligible.
        let b = buffer_of(&[106.0, 170.0, 101.0]);
        let c = select_candidate(&b, Some(100.0)).unwrap();
        assert_eq!(c.snapshot.now(), 106.0);
    }

    #[test]
    fn nothing_in_any_window() {
        let b = buffer_of(&[100.0, 102.0, 104.5, 160.0, 200.0]);
        assert!(select_candidate(&b, Some(100.0)).is_none());
    }
}
