//! Parallel simulated annealing over a closed tour.
//!
//! Every round, a grid of independent lanes each samples candidate moves,
//! evaluates their local cost change in O(1), and runs a Metropolis test.
//! Accepting lanes race for a single shared [`ConsensusFlag`]; the highest
//! accepting lane id wins and exactly one move (or none) is committed to the
//! tour before the next round.
//!
//! # Move families
//!
//! - **Swap**: exchange the cities at two positions (4 incident edges).
//! - **Insertion**: remove one city and reinsert it after another position
//!   (3 edges each side), committed by one of the [`InsertionCommit`]
//!   strategies.
//!
//! # Key Types
//!
//! - [`SolverRound`]: owns the flag, proposal buffers, lane RNG streams and
//!   the snapshot buffer; exposes propose/commit operations
//! - [`AnnealConfig`]: grid size, retry budget, window decay, acceptance
//!   steepness, commit strategy
//! - [`AnnealRunner`]: reference cooling driver
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Lundy & Mees (1986), "Convergence of an Annealing Algorithm"

mod acceptance;
mod config;
mod flag;
mod insertion;
mod lane;
mod round;
mod runner;
mod swap;
mod types;

pub use acceptance::{relative_increase, sampling_half_width, window_bounds, Metropolis};
pub use config::{AnnealConfig, CoolingSchedule, InsertionCommit, MoveFamily, RunnerConfig};
pub use flag::ConsensusFlag;
pub use insertion::{insertion_costs, is_valid_insertion};
pub use lane::ProposalBuffers;
pub use round::SolverRound;
pub use runner::{AnnealResult, AnnealRunner};
pub use swap::swap_costs;
pub use types::{Move, RoundOutcome, RoundState};
