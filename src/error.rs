//! Error types.

use crate::anneal::{Move, MoveFamily};
use thiserror::Error;

/// Errors raised when inputs to the annealing pipeline are malformed.
///
/// Rounds in which no proposal is accepted are not errors; they are reported
/// as [`RoundOutcome::Idle`](crate::anneal::RoundOutcome::Idle).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("at least 3 cities are required, got {0}")]
    TooFewCities(usize),

    #[error("tour must hold {expected} entries (N + 1), got {actual}")]
    TourLength { expected: usize, actual: usize },

    #[error("tour is not a permutation of 0..{n}: {reason}")]
    NotAPermutation { n: usize, reason: String },

    #[error("tour is not closed: first entry {first} != last entry {last}")]
    OpenTour { first: usize, last: usize },

    #[error("temperature must be strictly positive and finite, got {0}")]
    NonPositiveTemperature(f64),

    #[error("coordinate of city {0} is not finite")]
    NonFiniteCoordinate(usize),

    #[error("grid must contain at least one lane")]
    EmptyGrid,

    #[error("lane random states are not seeded; call init_rng or configure a seed")]
    RngNotInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("move {0:?} does not apply to a tour over {1} cities")]
    InvalidMove(Move, usize),

    #[error("lane {lane} holds an uncommitted {family:?} move")]
    UncommittedRound { family: MoveFamily, lane: usize },

    #[error("pending move is a {pending:?}, cannot commit it as {requested:?}")]
    CommitMismatch {
        pending: MoveFamily,
        requested: MoveFamily,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejects temperatures for which the acceptance formula is undefined.
pub(crate) fn check_temperature(temperature: f64) -> Result<()> {
    if temperature > 0.0 && temperature.is_finite() {
        Ok(())
    } else {
        Err(Error::NonPositiveTemperature(temperature))
    }
}
