//! Reference host-side driver.
//!
//! [`AnnealRunner`] owns the annealing schedule: it cools the temperature,
//! picks the move family for each round and tracks the best tour seen. The
//! propose/commit operations on [`SolverRound`] remain usable on their own
//! by drivers with other schedules.

use super::config::{AnnealConfig, MoveFamily, RunnerConfig};
use super::round::SolverRound;
use crate::error::{Error, Result};
use crate::geometry::CityTable;
use crate::tour::Tour;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Result of an annealing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnealResult {
    /// Shortest tour observed at a temperature-level boundary.
    pub best: Tour,

    /// Euclidean length of `best`.
    pub best_length: f64,

    /// Tour at the moment the run stopped.
    pub last: Tour,

    /// Total propose/commit rounds executed.
    pub rounds: usize,

    /// Rounds that ended with a committed move.
    pub committed_rounds: usize,

    /// Rounds in which no lane accepted.
    pub idle_rounds: usize,

    /// Temperature when the run stopped.
    pub final_temperature: f64,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Best length after every temperature level.
    pub length_history: Vec<f64>,
}

/// Executes the annealing schedule on top of a [`SolverRound`].
///
/// ```
/// use u_tsp_anneal::anneal::{AnnealConfig, AnnealRunner, RunnerConfig};
/// use u_tsp_anneal::geometry::CityTable;
/// use u_tsp_anneal::tour::Tour;
///
/// let cities = CityTable::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
/// let start = Tour::new(vec![0, 2, 1, 3, 0]).unwrap();
/// let result = AnnealRunner::run(
///     &cities,
///     start,
///     &AnnealConfig::default().with_grid_size(32).with_seed(7),
///     &RunnerConfig::default().with_max_rounds(200),
/// )
/// .unwrap();
/// assert!(result.best.validate().is_ok());
/// assert!(result.best_length <= 2.0 + 2.0 * 2f64.sqrt() + 1e-9);
/// ```
pub struct AnnealRunner;

impl AnnealRunner {
    /// Runs the schedule starting from `initial`.
    pub fn run(
        cities: &CityTable,
        initial: Tour,
        anneal: &AnnealConfig,
        schedule: &RunnerConfig,
    ) -> Result<AnnealResult> {
        Self::run_with_cancel(cities, initial, anneal, schedule, None)
    }

    /// Runs with an optional cancellation token, checked once per
    /// temperature level.
    pub fn run_with_cancel(
        cities: &CityTable,
        initial: Tour,
        anneal: &AnnealConfig,
        schedule: &RunnerConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        schedule.validate()?;
        initial.validate()?;
        if initial.num_cities() != cities.len() {
            return Err(Error::TourLength {
                expected: cities.len() + 1,
                actual: initial.as_slice().len(),
            });
        }
        if cities.len() == 3 {
            tracing::warn!("3 cities leave a single movable slot; every round will be idle");
        }

        let mut round = SolverRound::new(anneal.clone())?;
        if !round.is_seeded() {
            round.init_rng(rand::random())?;
        }
        let mut tour = initial;
        let mut best = tour.clone();
        let mut best_length = best.length(cities);
        let mut length_history = vec![best_length];

        let mut temperature = schedule.initial_temperature;
        let mut rounds = 0usize;
        let mut committed_rounds = 0usize;
        let mut cancelled = false;
        let mut step = 0usize;

        while temperature > schedule.min_temperature {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let mut level_commits = 0usize;
            for _ in 0..schedule.rounds_per_level() {
                if budget_spent(schedule, rounds) {
                    break;
                }
                let family = family_for_round(schedule.moves, rounds);
                if round.round(family, cities, &mut tour, temperature)?.is_committed() {
                    level_commits += 1;
                }
                rounds += 1;
            }
            committed_rounds += level_commits;

            let length = tour.length(cities);
            if length < best_length {
                best_length = length;
                best = tour.clone();
            }
            length_history.push(best_length);
            tracing::debug!(
                step,
                temperature,
                level_commits,
                length,
                best_length,
                "temperature level done"
            );

            if budget_spent(schedule, rounds) {
                break;
            }
            temperature = schedule.next_temperature(temperature, step);
            step += 1;
        }

        Ok(AnnealResult {
            best,
            best_length,
            last: tour,
            rounds,
            committed_rounds,
            idle_rounds: rounds - committed_rounds,
            final_temperature: temperature,
            cancelled,
            length_history,
        })
    }
}

fn budget_spent(schedule: &RunnerConfig, rounds: usize) -> bool {
    schedule.max_rounds > 0 && rounds >= schedule.max_rounds
}

/// Family proposed in round number `round`.
fn family_for_round(moves: MoveFamily, round: usize) -> MoveFamily {
    match moves {
        MoveFamily::Alternate if round % 2 == 0 => MoveFamily::Swap,
        MoveFamily::Alternate => MoveFamily::Insertion,
        other => other,
    }
}
