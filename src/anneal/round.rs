//! Solver round: owner of all per-round state.
//!
//! [`SolverRound`] holds the consensus flag, proposal buffers, lane RNG
//! streams and the snapshot buffer. The coordinate table and tour stay with
//! the caller and are passed into each operation, so a driver can inspect or
//! replace the tour between rounds.
//!
//! Per round the caller invokes one proposer followed by the matching
//! committer:
//!
//! ```
//! use u_tsp_anneal::anneal::{AnnealConfig, SolverRound};
//! use u_tsp_anneal::geometry::CityTable;
//! use u_tsp_anneal::tour::Tour;
//!
//! let cities = CityTable::new(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]).unwrap();
//! let mut tour = Tour::new(vec![0, 2, 1, 3, 0]).unwrap();
//! let mut round = SolverRound::new(AnnealConfig::default().with_grid_size(64)).unwrap();
//! round.init_rng(1).unwrap();
//!
//! round.propose_swap(&cities, &tour, 0.5).unwrap();
//! let outcome = round.commit_swap(&mut tour).unwrap();
//! assert!(tour.validate().is_ok());
//! # let _ = outcome;
//! ```

use super::acceptance::{sampling_half_width, Metropolis};
use super::config::{AnnealConfig, InsertionCommit, MoveFamily};
use super::flag::ConsensusFlag;
use super::lane::{run_sweeps, LaneContext, ProposalBuffers};
use super::types::{Move, RoundOutcome, RoundState};
use super::{insertion, swap};
use crate::error::{check_temperature, Error, Result};
use crate::geometry::CityTable;
use crate::rng::RngStates;
use crate::tour::Tour;

/// Explicit per-solve state for the propose/commit pipeline.
#[derive(Debug)]
pub struct SolverRound {
    config: AnnealConfig,
    flag: ConsensusFlag,
    buffers: ProposalBuffers,
    states: Option<RngStates>,
    snapshot: Vec<usize>,
    state: RoundState,
}

impl SolverRound {
    /// Validates `config` and allocates the buffers.
    ///
    /// When `config.seed` is set the lane streams are seeded from it right
    /// away; otherwise [`init_rng`](Self::init_rng) must be called before
    /// the first proposal.
    pub fn new(config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        let states = config
            .seed
            .map(|seed| RngStates::init(seed, config.grid_size))
            .transpose()?;
        tracing::debug!(
            grid_size = config.grid_size,
            retry_budget = config.retry_budget,
            seed = ?config.seed,
            "initialized solver round"
        );
        Ok(Self {
            buffers: ProposalBuffers::new(config.grid_size),
            flag: ConsensusFlag::new(),
            states,
            snapshot: Vec::new(),
            state: RoundState::Idle,
            config,
        })
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Proposal slots as left by the last proposal pass.
    pub fn buffers(&self) -> &ProposalBuffers {
        &self.buffers
    }

    pub fn flag(&self) -> &ConsensusFlag {
        &self.flag
    }

    /// Whether the lane streams have been seeded.
    pub fn is_seeded(&self) -> bool {
        self.states.is_some()
    }

    /// Seeds one stream per lane from `seed`, starting a new solve.
    ///
    /// The streams then advance monotonically across rounds; calling this
    /// again restarts them and discards any pending winner.
    pub fn init_rng(&mut self, seed: u64) -> Result<()> {
        self.states = Some(RngStates::init(seed, self.config.grid_size)?);
        self.flag.reset();
        self.state = RoundState::Idle;
        tracing::debug!(seed, "seeded lane streams");
        Ok(())
    }

    /// Runs the swap proposer on every lane. Returns the winning lane, if
    /// any lane accepted.
    pub fn propose_swap(
        &mut self,
        cities: &CityTable,
        tour: &Tour,
        temperature: f64,
    ) -> Result<Option<usize>> {
        self.propose(MoveFamily::Swap, cities, tour, temperature)
    }

    /// Runs the insertion proposer on every lane. Returns the winning lane,
    /// if any lane accepted.
    pub fn propose_insertion(
        &mut self,
        cities: &CityTable,
        tour: &Tour,
        temperature: f64,
    ) -> Result<Option<usize>> {
        self.propose(MoveFamily::Insertion, cities, tour, temperature)
    }

    /// Applies a pending swap winner to `tour` and resets the flag.
    pub fn commit_swap(&mut self, tour: &mut Tour) -> Result<RoundOutcome> {
        if !self.begin_commit(MoveFamily::Swap, tour)? {
            return Ok(RoundOutcome::Idle);
        }
        let committed = swap::commit(&self.buffers, tour.as_mut_slice(), &self.flag);
        Ok(self.finish_commit(committed))
    }

    /// Applies a pending insertion winner with the configured strategy.
    pub fn commit_insertion(&mut self, tour: &mut Tour) -> Result<RoundOutcome> {
        self.commit_insertion_with(tour, self.config.insertion_commit)
    }

    /// Applies a pending insertion winner through the snapshot buffer.
    pub fn commit_insertion_snapshot(&mut self, tour: &mut Tour) -> Result<RoundOutcome> {
        self.commit_insertion_with(tour, InsertionCommit::Snapshot)
    }

    /// Applies a pending insertion winner with the narrow in-place shift.
    pub fn commit_insertion_shift(&mut self, tour: &mut Tour) -> Result<RoundOutcome> {
        self.commit_insertion_with(tour, InsertionCommit::Serial)
    }

    /// Applies a pending insertion winner with an explicit strategy.
    pub fn commit_insertion_with(
        &mut self,
        tour: &mut Tour,
        strategy: InsertionCommit,
    ) -> Result<RoundOutcome> {
        if !self.begin_commit(MoveFamily::Insertion, tour)? {
            return Ok(RoundOutcome::Idle);
        }
        let route = tour.as_mut_slice();
        self.fit_snapshot(route.len(), strategy);
        let committed = insertion::commit(
            &self.buffers,
            route,
            &mut self.snapshot,
            &self.flag,
            strategy,
            self.config.parallel,
        );
        Ok(self.finish_commit(committed))
    }

    /// Applies an explicit move through this round's committers, e.g. to
    /// mirror or undo a committed round. Insertions use the configured
    /// commit strategy.
    ///
    /// Fails while a winner is pending, since the pending move was
    /// evaluated against the current tour.
    pub fn replay(&mut self, tour: &mut Tour, mv: Move) -> Result<()> {
        if let RoundState::Won { family, lane } = self.state {
            return Err(Error::UncommittedRound { family, lane });
        }
        mv.check(tour.num_cities())?;
        let route = tour.as_mut_slice();
        match mv {
            Move::Swap { a, b } => route.swap(a, b),
            Move::Insertion { from, after } => {
                let strategy = self.config.insertion_commit;
                self.fit_snapshot(route.len(), strategy);
                insertion::relocate(
                    route,
                    &mut self.snapshot,
                    from,
                    after,
                    strategy,
                    self.config.parallel,
                );
            }
        }
        Ok(())
    }

    /// One full round: propose with `family` then commit.
    ///
    /// `family` must be `Swap` or `Insertion`; alternating between them is
    /// the driver's job.
    pub fn round(
        &mut self,
        family: MoveFamily,
        cities: &CityTable,
        tour: &mut Tour,
        temperature: f64,
    ) -> Result<RoundOutcome> {
        match family {
            MoveFamily::Swap => {
                self.propose_swap(cities, tour, temperature)?;
                self.commit_swap(tour)
            }
            MoveFamily::Insertion => {
                self.propose_insertion(cities, tour, temperature)?;
                self.commit_insertion(tour)
            }
            MoveFamily::Alternate => Err(Error::InvalidConfig(
                "a single round needs a concrete move family, not Alternate".into(),
            )),
        }
    }

    fn propose(
        &mut self,
        family: MoveFamily,
        cities: &CityTable,
        tour: &Tour,
        temperature: f64,
    ) -> Result<Option<usize>> {
        check_temperature(temperature)?;
        if let RoundState::Won { family, lane } = self.state {
            return Err(Error::UncommittedRound { family, lane });
        }
        let n = cities.len();
        if tour.num_cities() != n {
            return Err(Error::TourLength {
                expected: n + 1,
                actual: tour.as_slice().len(),
            });
        }
        let states = self.states.as_mut().ok_or(Error::RngNotInitialized)?;

        let ctx = LaneContext {
            cities,
            route: tour.as_slice(),
            rule: Metropolis::new(temperature, self.config.acceptance_scale),
            half_width: sampling_half_width(temperature, self.config.window_decay, n),
            flag: &self.flag,
        };
        let budget = self.config.retry_budget;
        let parallel = self.config.parallel;
        let sweeps = match family {
            MoveFamily::Insertion => run_sweeps(
                states.as_mut_slice(),
                &mut self.buffers,
                &self.flag,
                budget,
                parallel,
                |lane, rng, one, two| {
                    insertion::propose_attempt(&ctx, lane, rng, one, two);
                },
            ),
            MoveFamily::Swap | MoveFamily::Alternate => run_sweeps(
                states.as_mut_slice(),
                &mut self.buffers,
                &self.flag,
                budget,
                parallel,
                |lane, rng, one, two| {
                    swap::propose_attempt(&ctx, lane, rng, one, two);
                },
            ),
        };

        let winner = self.flag.winner();
        tracing::trace!(?family, sweeps, ?winner, "proposal pass done");
        if let Some(lane) = winner {
            let family = match family {
                MoveFamily::Insertion => MoveFamily::Insertion,
                _ => MoveFamily::Swap,
            };
            self.state = RoundState::Won { family, lane };
        }
        Ok(winner)
    }

    fn fit_snapshot(&mut self, len: usize, strategy: InsertionCommit) {
        if strategy == InsertionCommit::Snapshot && self.snapshot.len() != len {
            self.snapshot = vec![0; len];
        }
    }

    /// Checks the pending winner against the requested committer. Returns
    /// `false` when there is nothing to commit.
    fn begin_commit(&self, requested: MoveFamily, tour: &Tour) -> Result<bool> {
        match self.state {
            RoundState::Idle => Ok(false),
            RoundState::Won { family, .. } if family != requested => {
                Err(Error::CommitMismatch {
                    pending: family,
                    requested,
                })
            }
            RoundState::Won { .. } => {
                let expected = self.buffers_len_hint();
                if tour.as_slice().len() < expected {
                    return Err(Error::TourLength {
                        expected,
                        actual: tour.as_slice().len(),
                    });
                }
                Ok(true)
            }
        }
    }

    /// Smallest route length the pending winner's positions fit in.
    fn buffers_len_hint(&self) -> usize {
        match self.state {
            RoundState::Won { lane, .. } => {
                let (a, b) = self.buffers.pair(lane);
                a.max(b) + 2
            }
            RoundState::Idle => 0,
        }
    }

    fn finish_commit(&mut self, committed: Option<(usize, Move)>) -> RoundOutcome {
        self.state = RoundState::Idle;
        match committed {
            Some((lane, mv)) => RoundOutcome::Committed { lane, mv },
            None => RoundOutcome::Idle,
        }
    }
}
