//! Moves, round outcomes and the round state machine.

use super::config::MoveFamily;
use super::insertion::{is_valid_insertion, shift_serial};
use crate::error::{Error, Result};
use crate::tour::Tour;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A committed structural change, in tour positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Move {
    /// The cities at positions `a` and `b` traded places.
    Swap { a: usize, b: usize },

    /// The city at position `from` was removed and reinserted directly after
    /// the city that sat at position `after`.
    Insertion { from: usize, after: usize },
}

impl Move {
    /// Family this move belongs to.
    pub fn family(&self) -> MoveFamily {
        match self {
            Move::Swap { .. } => MoveFamily::Swap,
            Move::Insertion { .. } => MoveFamily::Insertion,
        }
    }

    /// Replays this move on `tour`, e.g. to mirror a committed round on a
    /// second copy of the tour.
    ///
    /// Swap positions must be distinct and movable (`1..=N-1`). An insertion
    /// must move a movable city to a real new place; `after` may be the
    /// anchor slot 0.
    ///
    /// ```
    /// use u_tsp_anneal::anneal::Move;
    /// use u_tsp_anneal::tour::Tour;
    ///
    /// let mut tour = Tour::identity(5).unwrap();
    /// Move::Insertion { from: 1, after: 3 }.apply_to(&mut tour).unwrap();
    /// assert_eq!(tour.as_slice(), &[0, 2, 3, 1, 4, 0]);
    /// ```
    pub fn apply_to(&self, tour: &mut Tour) -> Result<()> {
        self.check(tour.num_cities())?;
        match *self {
            Move::Swap { a, b } => tour.as_mut_slice().swap(a, b),
            Move::Insertion { from, after } => shift_serial(tour.as_mut_slice(), from, after),
        }
        Ok(())
    }

    /// The move that undoes this one.
    ///
    /// A swap is its own inverse. An insertion's inverse sends the moved city
    /// back behind its old predecessor; it is only valid when the original
    /// source was not the last movable slot.
    ///
    /// ```
    /// use u_tsp_anneal::anneal::Move;
    /// use u_tsp_anneal::tour::Tour;
    ///
    /// let mut tour = Tour::identity(6).unwrap();
    /// let mv = Move::Insertion { from: 4, after: 1 };
    /// mv.apply_to(&mut tour).unwrap();
    /// mv.inverse().apply_to(&mut tour).unwrap();
    /// assert_eq!(tour, Tour::identity(6).unwrap());
    /// ```
    pub fn inverse(&self) -> Move {
        match *self {
            Move::Swap { a, b } => Move::Swap { a: b, b: a },
            Move::Insertion { from, after } if from < after => Move::Insertion {
                from: after,
                after: from - 1,
            },
            Move::Insertion { from, after } => Move::Insertion {
                from: after + 1,
                after: from,
            },
        }
    }

    /// Checks that this move is applicable to a tour over `n` cities.
    pub(crate) fn check(&self, n: usize) -> Result<()> {
        let valid = match *self {
            Move::Swap { a, b } => a != b && (1..n).contains(&a) && (1..n).contains(&b),
            Move::Insertion { from, after } => {
                (1..n).contains(&from) && after < n && is_valid_insertion(from, after, n)
            }
        };
        if valid {
            Ok(())
        } else {
            Err(Error::InvalidMove(*self, n))
        }
    }
}

/// Result of one propose/commit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RoundOutcome {
    /// No lane accepted within the retry budget; the tour is unchanged.
    Idle,

    /// Lane `lane` won and its move was applied.
    Committed { lane: usize, mv: Move },
}

impl RoundOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, RoundOutcome::Committed { .. })
    }
}

/// Where a [`SolverRound`](super::SolverRound) is in its cycle.
///
/// `Idle` -> propose -> `Won` -> commit -> `Idle`. A proposal pass in which
/// no lane accepts leaves the round `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    Idle,
    Won { family: MoveFamily, lane: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_family() {
        assert_eq!(Move::Swap { a: 1, b: 2 }.family(), MoveFamily::Swap);
        assert_eq!(
            Move::Insertion { from: 3, after: 1 }.family(),
            MoveFamily::Insertion
        );
    }

    #[test]
    fn test_apply_swap() {
        let mut tour = Tour::new(vec![0, 2, 1, 3, 0]).unwrap();
        Move::Swap { a: 2, b: 1 }.apply_to(&mut tour).unwrap();
        assert_eq!(tour.as_slice(), &[0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_apply_rejects_anchor_and_identity() {
        let mut tour = Tour::identity(5).unwrap();
        assert!(Move::Swap { a: 0, b: 2 }.apply_to(&mut tour).is_err());
        assert!(Move::Swap { a: 2, b: 5 }.apply_to(&mut tour).is_err());
        assert!(Move::Swap { a: 2, b: 2 }.apply_to(&mut tour).is_err());
        assert!(Move::Insertion { from: 3, after: 2 }
            .apply_to(&mut tour)
            .is_err());
        assert!(Move::Insertion { from: 0, after: 2 }
            .apply_to(&mut tour)
            .is_err());
        assert_eq!(tour, Tour::identity(5).unwrap());
    }

    #[test]
    fn test_apply_insertion_after_anchor() {
        let mut tour = Tour::identity(5).unwrap();
        Move::Insertion { from: 3, after: 0 }.apply_to(&mut tour).unwrap();
        assert_eq!(tour.as_slice(), &[0, 3, 1, 2, 4, 0]);
    }

    #[test]
    fn test_inverse_undoes_every_valid_insertion() {
        let n = 7;
        let start = Tour::new(vec![3, 0, 5, 1, 4, 2, 6, 3]).unwrap();
        for from in 1..n - 1 {
            for after in 0..n {
                let mv = Move::Insertion { from, after };
                let mut tour = start.clone();
                if mv.apply_to(&mut tour).is_err() {
                    continue;
                }
                mv.inverse().apply_to(&mut tour).unwrap();
                assert_eq!(tour, start, "from={from} after={after}");
            }
        }
    }

    #[test]
    fn test_outcome_is_committed() {
        assert!(!RoundOutcome::Idle.is_committed());
        let outcome = RoundOutcome::Committed {
            lane: 0,
            mv: Move::Swap { a: 1, b: 2 },
        };
        assert!(outcome.is_committed());
    }
}
