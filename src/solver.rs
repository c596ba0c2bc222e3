//! Strategy dispatch and the types shared by every search strategy.
//!
//! [`solve`] is the single entry point: it generates the candidate
//! rectangles for a grid and hands them to the configured strategy. Both
//! strategies return a [`Selection`], a non-overlapping subset of candidates
//! together with its score. Search limits live in [`SolverConfig`]; there is
//! no process-wide state, so independent solve calls are safe to run side by
//! side on different grids.
use crate::candidates::{self, Candidate};
use crate::grid::{Grid, GridError};
use crate::{dfs, qubo};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors surfaced by the solver crate's fallible surfaces (grid
/// construction and the host adapters). Budget exhaustion is deliberately
/// not here; it is reported through [`Selection::is_provisional`].
#[derive(Debug, Error)]
pub enum SolverError {
    /// The grid was malformed or addressed out of bounds.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// A problem file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The search strategy to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Algorithm {
    /// Branch-and-bound depth-first search. Exact within its budget and the
    /// most robust choice.
    #[default]
    Dfs,
    /// QUBO formulation solved by a heuristic sampler. Experimental; may
    /// return sub-optimal selections.
    Qubo,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dfs" => Ok(Algorithm::Dfs),
            "qubo" => Ok(Algorithm::Qubo),
            other => Err(format!("unknown algorithm '{}', expected dfs or qubo", other)),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Dfs => write!(f, "dfs"),
            Algorithm::Qubo => write!(f, "qubo"),
        }
    }
}

/// Default seed for the simulated-annealing sampler. Fixed so that QUBO runs
/// are reproducible unless the caller picks a seed.
pub const DEFAULT_SAMPLER_SEED: u64 = 1010;

/// Configuration for one solve call.
///
/// # Examples
/// ```
/// use fruitbox_solver::solver::{Algorithm, SolverConfig};
/// use std::time::Duration;
///
/// let config = SolverConfig {
///     algorithm: Algorithm::Dfs,
///     time_budget: Some(Duration::from_secs(2)),
///     ..SolverConfig::default()
/// };
/// assert_eq!(config.node_budget, None);
/// ```
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Which strategy to run.
    pub algorithm: Algorithm,
    /// Maximum number of DFS nodes to expand; `None` means unbounded.
    pub node_budget: Option<u64>,
    /// Wall-clock limit for the whole solve; `None` means unbounded. The
    /// DFS checks it while searching and the QUBO sampler between sweeps,
    /// so a solve never blocks past the deadline by more than one step.
    pub time_budget: Option<Duration>,
    /// Seed for the QUBO simulated-annealing sampler.
    pub sampler_seed: u64,
    /// Number of independent annealing restarts.
    pub sampler_reads: u32,
    /// Sweeps (full single-flip passes) per restart.
    pub sampler_sweeps: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            algorithm: Algorithm::Dfs,
            node_budget: None,
            time_budget: None,
            sampler_seed: DEFAULT_SAMPLER_SEED,
            sampler_reads: 64,
            sampler_sweeps: 400,
        }
    }
}

/// A non-overlapping set of chosen candidates.
///
/// The order of `candidates()` is the order the strategy committed to them
/// (DFS exploration order, or ascending generation order for QUBO); the move
/// sequencer preserves it. The overlap-free invariant holds for every
/// `Selection` this crate returns, provisional or not.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Selection {
    chosen: Vec<Candidate>,
    score: u32,
    provisional: bool,
}

impl Selection {
    /// The empty selection, score 0.
    pub fn empty() -> Self {
        Selection::default()
    }

    /// Builds a selection from already-disjoint candidates, in order.
    pub(crate) fn from_candidates(chosen: Vec<Candidate>, provisional: bool) -> Self {
        let score = chosen.iter().map(|c| c.reward).sum();
        let selection = Selection {
            chosen,
            score,
            provisional,
        };
        debug_assert!(selection.is_overlap_free());
        selection
    }

    /// The chosen candidates in commitment order.
    pub fn candidates(&self) -> &[Candidate] {
        &self.chosen
    }

    /// Total score: the sum of the members' rewards (apples removed).
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Number of chosen candidates.
    pub fn len(&self) -> usize {
        self.chosen.len()
    }

    /// True when nothing was chosen.
    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// True when a node or time budget expired before the search space was
    /// exhausted: the selection is valid but possibly sub-optimal.
    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    /// Checks the core invariant: no two members share a cell. Exhaustive
    /// over all pairs; meant for tests and debug assertions, not hot paths.
    pub fn is_overlap_free(&self) -> bool {
        for (i, a) in self.chosen.iter().enumerate() {
            for b in &self.chosen[i + 1..] {
                if a.rect.intersects(&b.rect) {
                    return false;
                }
            }
        }
        true
    }
}

/// Tracks the node and wall-clock budget of one search.
///
/// The clock is polled once every `CHECK_INTERVAL` nodes to keep
/// `Instant::now` off the hot path.
pub(crate) struct Budget {
    deadline: Option<Instant>,
    nodes_left: Option<u64>,
    since_clock_check: u32,
    exhausted: bool,
}

impl Budget {
    const CHECK_INTERVAL: u32 = 1024;

    pub(crate) fn from_config(config: &SolverConfig) -> Self {
        Budget {
            deadline: config.time_budget.map(|d| Instant::now() + d),
            nodes_left: config.node_budget,
            since_clock_check: 0,
            exhausted: false,
        }
    }

    /// The absolute deadline, when a time budget was configured.
    pub(crate) fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Accounts for one expanded node. Returns `false` once the budget is
    /// spent; from then on the search must unwind and keep its best-so-far.
    pub(crate) fn consume_node(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if let Some(left) = self.nodes_left.as_mut() {
            if *left == 0 {
                self.exhausted = true;
                return false;
            }
            *left -= 1;
        }
        if let Some(deadline) = self.deadline {
            self.since_clock_check += 1;
            if self.since_clock_check >= Self::CHECK_INTERVAL {
                self.since_clock_check = 0;
                if Instant::now() >= deadline {
                    self.exhausted = true;
                    return false;
                }
            }
        }
        true
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Solves a grid: generates all sum-10 rectangle candidates and picks a
/// maximal-score non-overlapping subset with the configured strategy.
///
/// Deterministic for a given grid and configuration. Always returns a valid
/// selection, including the empty one for grids with no candidates.
///
/// # Examples
/// ```
/// use fruitbox_solver::grid::Grid;
/// use fruitbox_solver::solver::{solve, SolverConfig};
///
/// let grid = Grid::from_rows(vec![vec![1, 9], vec![9, 1]]).unwrap();
/// let selection = solve(&grid, &SolverConfig::default());
/// assert_eq!(selection.score(), 4);
/// ```
pub fn solve(grid: &Grid, config: &SolverConfig) -> Selection {
    let found = candidates::generate(grid);
    log::info!(
        "{} candidate rectangles on a {}x{} grid, solving with {}",
        found.len(),
        grid.rows(),
        grid.cols(),
        config.algorithm
    );
    let selection = match config.algorithm {
        Algorithm::Dfs => dfs::solve(grid, &found, config),
        Algorithm::Qubo => qubo::solve(grid, &found, config),
    };
    debug_assert!(selection.is_overlap_free());
    log::info!(
        "selection: {} rectangles, score {}{}",
        selection.len(),
        selection.score(),
        if selection.is_provisional() {
            " (provisional, budget exhausted)"
        } else {
            ""
        }
    );
    selection
}
