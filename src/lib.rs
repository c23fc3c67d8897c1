//! Massively parallel simulated annealing for the closed-tour TSP.
//!
//! Thousands of independent proposal lanes each sample a local move (a city
//! swap or a city insertion), evaluate its cost change incrementally, and
//! race to commit it. A lock-free take-max flag picks a single winner per
//! round, and a serialized committer applies that one move so the shared
//! tour stays a valid closed permutation between rounds.
//!
//! - [`geometry`]: city coordinates and squared edge costs
//! - [`tour`]: the closed permutation and its invariants
//! - [`rng`]: per-lane independent random streams
//! - [`anneal`]: proposers, acceptance test, consensus flag, committers,
//!   and a reference cooling driver
//!
//! # Architecture
//!
//! The pipeline is a pure compute interface over typed buffers. The caller
//! owns the coordinate table and tour and supplies a positive temperature
//! each round; [`anneal::SolverRound`] owns everything else.

pub mod anneal;
pub mod error;
pub mod geometry;
pub mod rng;
pub mod tour;

pub use error::{Error, Result};
