//! # Fruit Box Solver Library
//!
//! This library provides the core logic for the Fruit Box puzzle: a grid of
//! apples valued 1-9 where the player drags axis-aligned rectangles whose
//! values sum to exactly 10, scoring one point per apple removed. The solver
//! enumerates every sum-10 rectangle and picks a maximal-score set of
//! non-overlapping rectangles.
//!
//! It is used by two binaries:
//! - `box_solver`: Solves a problem file (or a seeded random grid) and
//!   prints the move sequence with a replay of the resulting board states.
//! - `strategy_evaluator`: Compares the search strategies and the greedy
//!   baselines across a batch of seeded random grids.
//!
//! ## Modules
//! - `grid`: The validated, immutable grid of apple values, text parsing,
//!   seeded random generation, and the `CellSet` covered-cell bitmask.
//! - `candidates`: Enumeration of every rectangle summing to exactly 10,
//!   backed by a prefix-sum table.
//! - `solver`: The `solve` entry point, `SolverConfig`, and the `Selection`
//!   type shared by all strategies.
//! - `dfs`: Branch-and-bound depth-first search, the default strategy.
//! - `qubo`: The experimental QUBO formulation with pluggable samplers.
//! - `heuristics`: Greedy baseline strategies.
//! - `moves`: Move sequencing and replay simulation.
//! - `host`: The `GameHost` capability trait and the problem-file host.

pub mod candidates;
pub mod dfs;
pub mod grid;
pub mod heuristics;
pub mod host;
pub mod moves;
pub mod qubo;
pub mod solver;

// Public items are accessed via their full path, e.g.
// `fruitbox_solver::solver::solve()`. This keeps the top-level library
// namespace cleaner.
