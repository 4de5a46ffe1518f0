//! Per-side sequence continuity tracking.
//!
//! Each side of each discipline carries its own tracker. The tracker only
//! classifies messages; the processor decides what to log and whether to
//! request a resync.

use crate::types::{Sequence, UpdateKind, UpdateMsg};

/// Coarse state of a tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Receiving live updates in order
    Normal,
    /// Inside a feed retransmission batch
    Retransmitting,
    /// A gap is known and awaiting repair
    GapDetected,
}

/// Classification of one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCheck {
    /// In order (or no sequence carried); apply
    InOrder,
    /// Part of a retransmission batch; apply without sequence checks
    Retransmitted {
        /// Whether this update closed the batch
        last: bool,
    },
    /// Skipped ahead; apply, the book may be stale until resynced
    Gap {
        /// Sequence that was expected
        expected: Sequence,
        /// Sequence received
        got: Sequence,
        /// Already reported (gap flagged by the feed, or resync requested)
        suppressed: bool,
    },
    /// Older than or equal to the last accepted sequence; drop
    Stale {
        /// Last accepted sequence
        last: Sequence,
        /// Sequence received
        got: Sequence,
    },
}

/// Sequence tracker for one side.
///
/// `last` holds the last accepted sequence; 0 means unset and 1 is treated
/// the same way, so the next live update re-seeds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceTracker {
    last: Sequence,
    gap_detected: bool,
    retransmitting: bool,
    resubscribed: bool,
}

impl SequenceTracker {
    /// Create a tracker in the initial state
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify an update and advance the tracker
    pub fn observe(&mut self, update: &UpdateMsg) -> SequenceCheck {
        if update.gap_detected {
            self.gap_detected = true;
        }

        match update.update_kind {
            UpdateKind::Retransmission => {
                self.retransmitting = true;
                let last = update.multi_tick_remaining == Some(0);
                if last {
                    self.end_retransmission();
                }
                SequenceCheck::Retransmitted { last }
            }
            UpdateKind::Normal => match update.sequence {
                Some(seq) => self.check(seq),
                None => SequenceCheck::InOrder,
            },
        }
    }

    /// Classify a live sequence number
    pub fn check(&mut self, seq: Sequence) -> SequenceCheck {
        let last = self.last;

        // Unset, or the feed restarted its numbering
        if last <= 1 || (seq == 1 && last > 1) {
            self.last = seq;
            return SequenceCheck::InOrder;
        }

        let suppressed = self.gap_detected || self.resubscribed;

        // Nothing can follow u64::MAX, so whatever arrives next re-seeds
        let Some(expected) = last.checked_add(1) else {
            self.last = seq;
            return SequenceCheck::Gap {
                expected: Sequence::MAX,
                got: seq,
                suppressed,
            };
        };

        if seq == expected {
            self.last = seq;
            return SequenceCheck::InOrder;
        }

        if seq <= last {
            return SequenceCheck::Stale { last, got: seq };
        }

        self.last = seq;
        SequenceCheck::Gap {
            expected,
            got: seq,
            suppressed,
        }
    }

    /// Latch that a resync has been requested for the current gap
    pub fn mark_resubscribed(&mut self) {
        self.resubscribed = true;
    }

    /// Close a retransmission batch
    pub fn end_retransmission(&mut self) {
        self.last = 0;
        self.retransmitting = false;
        self.gap_detected = false;
    }

    /// Return to the initial state (after an initial paint)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Last accepted sequence (0 if unset)
    pub const fn last_sequence(&self) -> Sequence {
        self.last
    }

    /// Whether the feed or the tracker has flagged a gap still unrepaired
    pub const fn gap_detected(&self) -> bool {
        self.gap_detected
    }

    /// Whether a retransmission batch is in progress
    pub const fn retransmitting(&self) -> bool {
        self.retransmitting
    }

    /// Whether a resync was requested since the last initial paint
    pub const fn resubscribed(&self) -> bool {
        self.resubscribed
    }

    /// Coarse state
    pub fn state(&self) -> SequenceState {
        if self.retransmitting {
            SequenceState::Retransmitting
        } else if self.gap_detected {
            SequenceState::GapDetected
        } else {
            SequenceState::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Side, TableRow};

    fn live(seq: Sequence) -> UpdateMsg {
        UpdateMsg::new(Side::Bid, TableRow::new("ADD", 1)).with_sequence(seq)
    }

    #[test]
    fn test_seed_and_advance() {
        let mut tracker = SequenceTracker::new();
        assert_eq!(tracker.check(1), SequenceCheck::InOrder);
        assert_eq!(tracker.last_sequence(), 1);
        assert_eq!(tracker.check(2), SequenceCheck::InOrder);
        assert_eq!(tracker.check(3), SequenceCheck::InOrder);
        assert_eq!(tracker.last_sequence(), 3);
        assert_eq!(tracker.state(), SequenceState::Normal);
    }

    #[test]
    fn test_seed_from_any_value() {
        let mut tracker = SequenceTracker::new();
        assert_eq!(tracker.check(500), SequenceCheck::InOrder);
        assert_eq!(tracker.check(501), SequenceCheck::InOrder);
    }

    #[test]
    fn test_gap() {
        let mut tracker = SequenceTracker::new();
        tracker.check(1);
        tracker.check(2);
        assert_eq!(
            tracker.check(4),
            SequenceCheck::Gap {
                expected: 3,
                got: 4,
                suppressed: false
            }
        );
        assert_eq!(tracker.last_sequence(), 4);

        tracker.mark_resubscribed();
        assert_eq!(
            tracker.check(7),
            SequenceCheck::Gap {
                expected: 5,
                got: 7,
                suppressed: true
            }
        );
    }

    #[test]
    fn test_sequence_at_u64_max() {
        let mut tracker = SequenceTracker::new();
        tracker.check(5);
        tracker.check(6);
        assert_eq!(
            tracker.check(Sequence::MAX),
            SequenceCheck::Gap {
                expected: 7,
                got: Sequence::MAX,
                suppressed: false
            }
        );
        assert_eq!(tracker.last_sequence(), Sequence::MAX);

        // The next live update is taken as a gap rather than dropped
        assert_eq!(
            tracker.check(7),
            SequenceCheck::Gap {
                expected: Sequence::MAX,
                got: 7,
                suppressed: false
            }
        );
        assert_eq!(tracker.check(8), SequenceCheck::InOrder);
        assert_eq!(tracker.last_sequence(), 8);
    }

    #[test]
    fn test_stale_leaves_state_alone() {
        let mut tracker = SequenceTracker::new();
        tracker.check(10);
        tracker.check(11);
        assert_eq!(tracker.check(11), SequenceCheck::Stale { last: 11, got: 11 });
        assert_eq!(tracker.check(5), SequenceCheck::Stale { last: 11, got: 5 });
        assert_eq!(tracker.last_sequence(), 11);
    }

    #[test]
    fn test_restart_at_one() {
        let mut tracker = SequenceTracker::new();
        tracker.check(40);
        tracker.check(41);
        assert_eq!(tracker.check(1), SequenceCheck::InOrder);
        assert_eq!(tracker.last_sequence(), 1);
    }

    #[test]
    fn test_feed_gap_flag_suppresses() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(&live(1));
        tracker.observe(&live(2));
        let check = tracker.observe(&live(5).with_gap_detected());
        assert_eq!(
            check,
            SequenceCheck::Gap {
                expected: 3,
                got: 5,
                suppressed: true
            }
        );
        assert_eq!(tracker.state(), SequenceState::GapDetected);
    }

    #[test]
    fn test_retransmission_batch() {
        let mut tracker = SequenceTracker::new();
        tracker.observe(&live(1));
        tracker.observe(&live(3).with_gap_detected());

        let retran = UpdateMsg::new(Side::Bid, TableRow::new("ADD", 1));
        let check = tracker.observe(&retran.clone().retransmission(2));
        assert_eq!(check, SequenceCheck::Retransmitted { last: false });
        assert_eq!(tracker.state(), SequenceState::Retransmitting);

        let check = tracker.observe(&retran.retransmission(0));
        assert_eq!(check, SequenceCheck::Retransmitted { last: true });
        assert_eq!(tracker.state(), SequenceState::Normal);
        assert!(!tracker.gap_detected());
        assert_eq!(tracker.last_sequence(), 0);

        // Next live update re-seeds
        assert_eq!(tracker.observe(&live(9)), SequenceCheck::InOrder);
    }

    #[test]
    fn test_reset_clears_latch() {
        let mut tracker = SequenceTracker::new();
        tracker.check(1);
        tracker.check(2);
        tracker.check(9);
        tracker.mark_resubscribed();
        assert!(tracker.resubscribed());

        tracker.reset();
        assert!(!tracker.resubscribed());
        assert_eq!(tracker.last_sequence(), 0);
    }

    #[test]
    fn test_unsequenced_update_in_order() {
        let mut tracker = SequenceTracker::new();
        let update = UpdateMsg::new(Side::Ask, TableRow::new("DEL", 1));
        assert_eq!(tracker.observe(&update), SequenceCheck::InOrder);
    }
}
