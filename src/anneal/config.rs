//! Pipeline configuration, insertion commit strategies and cooling schedules.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a winning insertion is written back to the tour.
///
/// Both strategies produce the same tour for the same winning move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InsertionCommit {
    /// Copy the whole tour into a snapshot buffer, then let every position
    /// inside the moved band gather its new value from the snapshot in
    /// parallel.
    #[default]
    Snapshot,

    /// Shift only the moved band in place, one slot after another. No
    /// snapshot buffer is allocated.
    Serial,
}

/// Which move family the driver proposes each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MoveFamily {
    /// Pairwise city swaps only.
    Swap,
    /// Single-city relocations only.
    Insertion,
    /// Swap on even rounds, insertion on odd rounds.
    #[default]
    Alternate,
}

/// Configuration of the propose/commit pipeline.
///
/// # Examples
///
/// ```
/// use u_tsp_anneal::anneal::{AnnealConfig, InsertionCommit};
///
/// let config = AnnealConfig::default()
///     .with_grid_size(4096)
///     .with_retry_budget(50)
///     .with_insertion_commit(InsertionCommit::Serial)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnnealConfig {
    /// Number of proposal lanes per round.
    pub grid_size: usize,

    /// Lockstep sweeps (one attempt per lane each) before the round is
    /// given up as idle.
    pub retry_budget: usize,

    /// Decay constant `c` of the sampling half-width
    /// `w = floor(exp(-c / T) * N)`.
    pub window_decay: f64,

    /// Steepness of the acceptance probability
    /// `exp(-scale * (proposal / original - 1) / T)`.
    pub acceptance_scale: f64,

    /// Strategy used to apply a winning insertion.
    pub insertion_commit: InsertionCommit,

    /// Run lanes on the rayon pool. When `false`, lanes run one after
    /// another in id order and a round is fully reproducible.
    pub parallel: bool,

    /// Seed for the lane streams. With `None` the round stays unseeded
    /// until [`SolverRound::init_rng`](super::SolverRound::init_rng).
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            grid_size: 1024,
            retry_budget: 100,
            window_decay: 0.01,
            acceptance_scale: 20.0,
            insertion_commit: InsertionCommit::default(),
            parallel: true,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn with_grid_size(mut self, n: usize) -> Self {
        self.grid_size = n;
        self
    }

    pub fn with_retry_budget(mut self, n: usize) -> Self {
        self.retry_budget = n;
        self
    }

    pub fn with_window_decay(mut self, c: f64) -> Self {
        self.window_decay = c;
        self
    }

    pub fn with_acceptance_scale(mut self, scale: f64) -> Self {
        self.acceptance_scale = scale;
        self
    }

    pub fn with_insertion_commit(mut self, strategy: InsertionCommit) -> Self {
        self.insertion_commit = strategy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size == 0 {
            return Err(Error::EmptyGrid);
        }
        if self.retry_budget == 0 {
            return Err(Error::InvalidConfig("retry_budget must be at least 1".into()));
        }
        if !(self.window_decay >= 0.0 && self.window_decay.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "window_decay must be finite and non-negative, got {}",
                self.window_decay
            )));
        }
        if !(self.acceptance_scale > 0.0 && self.acceptance_scale.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "acceptance_scale must be finite and positive, got {}",
                self.acceptance_scale
            )));
        }
        Ok(())
    }
}

/// Cooling schedule used by [`AnnealRunner`](super::AnnealRunner).
///
/// # References
///
/// - Geometric: standard textbook approach
/// - Linear: fixed-duration cooling
/// - LundyMees: Lundy & Mees (1986), with convergence proof
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CoolingSchedule {
    /// `T_{k+1} = alpha * T_k`.
    Geometric {
        /// Cooling factor in (0, 1). Higher = slower cooling.
        alpha: f64,
    },

    /// `T_k = T_0 - k * (T_0 - T_min) / steps`, where `steps` is
    /// `max_rounds / rounds_per_temperature`.
    Linear,

    /// `T_{k+1} = T_k / (1 + beta * T_k)`, one round per temperature.
    LundyMees {
        /// Cooling parameter. Typically `(T_0 - T_min) / (max_rounds * T_0 * T_min)`.
        beta: f64,
    },
}

impl Default for CoolingSchedule {
    fn default() -> Self {
        CoolingSchedule::Geometric { alpha: 0.95 }
    }
}

/// Host-side schedule for [`AnnealRunner`](super::AnnealRunner).
///
/// ```
/// use u_tsp_anneal::anneal::{CoolingSchedule, MoveFamily, RunnerConfig};
///
/// let config = RunnerConfig::default()
///     .with_initial_temperature(10.0)
///     .with_min_temperature(0.001)
///     .with_cooling(CoolingSchedule::Geometric { alpha: 0.98 })
///     .with_moves(MoveFamily::Swap);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunnerConfig {
    /// Starting temperature.
    pub initial_temperature: f64,

    /// The run stops once the temperature drops to or below this.
    pub min_temperature: f64,

    pub cooling: CoolingSchedule,

    /// Propose/commit rounds per temperature level. Ignored by
    /// `LundyMees` (one round per level).
    pub rounds_per_temperature: usize,

    /// Hard budget on rounds. 0 = no limit.
    pub max_rounds: usize,

    pub moves: MoveFamily,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1.0,
            min_temperature: 1e-4,
            cooling: CoolingSchedule::default(),
            rounds_per_temperature: 100,
            max_rounds: 0,
            moves: MoveFamily::default(),
        }
    }
}

impl RunnerConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_cooling(mut self, cooling: CoolingSchedule) -> Self {
        self.cooling = cooling;
        self
    }

    pub fn with_rounds_per_temperature(mut self, n: usize) -> Self {
        self.rounds_per_temperature = n;
        self
    }

    pub fn with_max_rounds(mut self, n: usize) -> Self {
        self.max_rounds = n;
        self
    }

    pub fn with_moves(mut self, moves: MoveFamily) -> Self {
        self.moves = moves;
        self
    }

    /// Rounds run at one temperature level.
    pub fn rounds_per_level(&self) -> usize {
        match self.cooling {
            CoolingSchedule::LundyMees { .. } => 1,
            _ => self.rounds_per_temperature,
        }
    }

    /// Number of levels a linear schedule spreads its descent over: the
    /// round budget split into levels, or 1000 levels when unbounded.
    pub fn linear_levels(&self) -> usize {
        match self.max_rounds {
            0 => 1000,
            budget => (budget / self.rounds_per_temperature).max(1),
        }
    }

    /// Temperature for the level after `level`, which ran at `temperature`.
    ///
    /// ```
    /// use u_tsp_anneal::anneal::{CoolingSchedule, RunnerConfig};
    ///
    /// let config = RunnerConfig::default()
    ///     .with_initial_temperature(1.0)
    ///     .with_min_temperature(0.2)
    ///     .with_cooling(CoolingSchedule::Linear)
    ///     .with_rounds_per_temperature(10)
    ///     .with_max_rounds(40);
    /// assert!((config.next_temperature(1.0, 0) - 0.8).abs() < 1e-12);
    /// assert_eq!(config.next_temperature(0.4, 3), 0.2);
    /// ```
    pub fn next_temperature(&self, temperature: f64, level: usize) -> f64 {
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => alpha * temperature,
            CoolingSchedule::LundyMees { beta } => temperature / (1.0 + beta * temperature),
            CoolingSchedule::Linear => {
                let span = self.initial_temperature - self.min_temperature;
                let progress = (level + 1) as f64 / self.linear_levels() as f64;
                (self.initial_temperature - span * progress).max(self.min_temperature)
            }
        }
    }

    /// Validates the schedule.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(Error::NonPositiveTemperature(self.initial_temperature));
        }
        if !(self.min_temperature > 0.0 && self.min_temperature.is_finite()) {
            return Err(Error::NonPositiveTemperature(self.min_temperature));
        }
        if self.min_temperature >= self.initial_temperature {
            return Err(Error::InvalidConfig(
                "min_temperature must be less than initial_temperature".into(),
            ));
        }
        if self.rounds_per_temperature == 0 {
            return Err(Error::InvalidConfig(
                "rounds_per_temperature must be at least 1".into(),
            ));
        }
        match self.cooling {
            CoolingSchedule::Geometric { alpha } => {
                if alpha <= 0.0 || alpha >= 1.0 {
                    return Err(Error::InvalidConfig(format!(
                        "geometric alpha must be in (0, 1), got {alpha}"
                    )));
                }
            }
            CoolingSchedule::LundyMees { beta } => {
                if beta <= 0.0 {
                    return Err(Error::InvalidConfig(format!(
                        "lundy-mees beta must be positive, got {beta}"
                    )));
                }
            }
            CoolingSchedule::Linear => {}
        }
        Ok(())
    }
}
