//! Single-winner consensus flag.
//!
//! Lanes that accept a proposal publish their id with an atomic take-max,
//! so after all lanes finish the flag holds the highest id among the lanes
//! that published. The slot stores `lane + 1` so that zero keeps meaning
//! "no winner yet" and lane 0 can still win.

use std::sync::atomic::{AtomicUsize, Ordering};

const EMPTY: usize = 0;

/// Shared flag raced for by all proposal lanes in a round.
#[derive(Debug, Default)]
pub struct ConsensusFlag {
    slot: AtomicUsize,
}

impl ConsensusFlag {
    pub fn new() -> Self {
        Self {
            slot: AtomicUsize::new(EMPTY),
        }
    }

    /// Whether some lane has already published this round.
    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.slot.load(Ordering::Acquire) != EMPTY
    }

    /// Publishes `lane` as a candidate winner. Returns `true` if `lane` is
    /// the leader right after the update.
    #[inline]
    pub fn publish(&self, lane: usize) -> bool {
        let ticket = lane + 1;
        let previous = self.slot.fetch_max(ticket, Ordering::AcqRel);
        previous < ticket
    }

    /// The current leader, if any.
    pub fn winner(&self) -> Option<usize> {
        match self.slot.load(Ordering::Acquire) {
            EMPTY => None,
            ticket => Some(ticket - 1),
        }
    }

    /// Clears the flag and returns the lane that held it.
    pub fn take(&self) -> Option<usize> {
        match self.slot.swap(EMPTY, Ordering::AcqRel) {
            EMPTY => None,
            ticket => Some(ticket - 1),
        }
    }

    pub fn reset(&self) {
        self.slot.store(EMPTY, Ordering::Release);
    }
}
