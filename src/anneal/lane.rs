//! Lane grid plumbing shared by both move families.
//!
//! A lane is one logical proposal thread. Each lane owns one RNG stream and
//! one slot in each proposal buffer, so lanes never write to the same memory
//! except through the [`ConsensusFlag`].
//!
//! Proposal runs in lockstep sweeps: every lane makes exactly one attempt
//! per sweep, and the flag is only inspected between sweeps. The winner is
//! therefore the highest lane that accepted in the first accepting sweep,
//! regardless of how the lanes were scheduled.

use super::acceptance::Metropolis;
use super::flag::ConsensusFlag;
use crate::geometry::CityTable;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Per-lane proposal slots, rewritten every attempt and read by the
/// committer for the winning lane only.
#[derive(Debug, Clone)]
pub struct ProposalBuffers {
    pub city_one: Vec<usize>,
    pub city_two: Vec<usize>,
}

impl ProposalBuffers {
    pub fn new(grid_size: usize) -> Self {
        Self {
            city_one: vec![0; grid_size],
            city_two: vec![0; grid_size],
        }
    }

    pub fn len(&self) -> usize {
        self.city_one.len()
    }

    pub fn is_empty(&self) -> bool {
        self.city_one.is_empty()
    }

    /// The `(city_one, city_two)` pair written by `lane`.
    pub fn pair(&self, lane: usize) -> (usize, usize) {
        (self.city_one[lane], self.city_two[lane])
    }
}

/// Read-only inputs every lane sees during one proposal round.
pub(crate) struct LaneContext<'a> {
    pub cities: &'a CityTable,
    pub route: &'a [usize],
    pub rule: Metropolis,
    pub half_width: usize,
    pub flag: &'a ConsensusFlag,
}

impl LaneContext<'_> {
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }
}

/// Runs `kernel` once per lane, on the rayon pool when `parallel` is set and
/// in lane order otherwise.
pub(crate) fn run_lanes<F>(
    states: &mut [ChaCha8Rng],
    buffers: &mut ProposalBuffers,
    parallel: bool,
    kernel: F,
) where
    F: Fn(usize, &mut ChaCha8Rng, &mut usize, &mut usize) + Sync + Send,
{
    if parallel {
        states
            .par_iter_mut()
            .zip(buffers.city_one.par_iter_mut())
            .zip(buffers.city_two.par_iter_mut())
            .enumerate()
            .for_each(|(lane, ((rng, one), two))| kernel(lane, rng, one, two));
    } else {
        states
            .iter_mut()
            .zip(buffers.city_one.iter_mut())
            .zip(buffers.city_two.iter_mut())
            .enumerate()
            .for_each(|(lane, ((rng, one), two))| kernel(lane, rng, one, two));
    }
}

/// Runs up to `retry_budget` sweeps of `attempt` over every lane, stopping
/// after the first sweep that leaves `flag` claimed. Returns the number of
/// sweeps run.
pub(crate) fn run_sweeps<F>(
    states: &mut [ChaCha8Rng],
    buffers: &mut ProposalBuffers,
    flag: &ConsensusFlag,
    retry_budget: usize,
    parallel: bool,
    attempt: F,
) -> usize
where
    F: Fn(usize, &mut ChaCha8Rng, &mut usize, &mut usize) + Sync + Send,
{
    for sweep in 1..=retry_budget {
        run_lanes(states, buffers, parallel, &attempt);
        if flag.is_claimed() {
            return sweep;
        }
    }
    retry_budget
}
