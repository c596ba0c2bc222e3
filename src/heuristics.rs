//! Greedy baseline strategies.
//!
//! These single-pass heuristics exist as a quality floor for the search
//! strategies and as cheap reference points in the strategy evaluator. They
//! make no optimality claim; the DFS strategy must match or beat them on any
//! grid, and the tests hold it to that.
use crate::candidates::Candidate;
use crate::grid::{CellSet, Grid};
use crate::solver::Selection;

/// Greedy scan in descending-reward order: take every candidate that does
/// not overlap anything taken so far. Equal rewards keep generation order.
pub fn greedy_by_reward(grid: &Grid, candidates: &[Candidate]) -> Selection {
    let mut ordered: Vec<Candidate> = candidates.to_vec();
    ordered.sort_by_key(|c| std::cmp::Reverse(c.reward));
    take_first_fit(grid, &ordered)
}

/// Greedy scan in candidate generation order (row-major by top-left corner).
pub fn greedy_first_fit(grid: &Grid, candidates: &[Candidate]) -> Selection {
    take_first_fit(grid, candidates)
}

fn take_first_fit(grid: &Grid, ordered: &[Candidate]) -> Selection {
    let mut covered = CellSet::for_grid(grid);
    let mut chosen = Vec::new();
    for cand in ordered {
        let mask = cand.cell_set(grid);
        if covered.is_disjoint(&mask) {
            covered.union_with(&mask);
            chosen.push(*cand);
        }
    }
    Selection::from_candidates(chosen, false)
}
