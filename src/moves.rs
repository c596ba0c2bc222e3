//! Move sequencing and replay.
//!
//! A [`Selection`] is turned into an ordered list of [`Move`]s for an
//! executor to play back, and [`replay`] simulates that playback on a grid,
//! yielding per-move scores and the final grid state.
use crate::candidates::Rect;
use crate::grid::{Grid, GridError};
use crate::solver::Selection;
use std::fmt;

/// One playable move: the two corner coordinates of a chosen rectangle, in
/// 0-based `(row, col)` grid-index space. Pixel mapping is the executor's
/// concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    /// Top-left corner.
    pub top_left: (usize, usize),
    /// Bottom-right corner, inclusive.
    pub bottom_right: (usize, usize),
}

impl Move {
    fn from_rect(rect: &Rect) -> Self {
        Move {
            top_left: (rect.r1, rect.c1),
            bottom_right: (rect.r2, rect.c2),
        }
    }

    /// Rebuilds the rectangle, rejecting corners built out of order. The
    /// fields are public, so moves from outside the solver need this check.
    fn rect(&self) -> Result<Rect, GridError> {
        let (r1, c1) = self.top_left;
        let (r2, c2) = self.bottom_right;
        if r1 > r2 || c1 > c2 {
            return Err(GridError::UnorderedCorners { r1, c1, r2, c2 });
        }
        Ok(Rect::new(r1, c1, r2, c2))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}) -> ({}, {})",
            self.top_left.0, self.top_left.1, self.bottom_right.0, self.bottom_right.1
        )
    }
}

/// Converts a selection into moves in its commitment order. No re-sorting,
/// splitting, or merging.
pub fn sequence(selection: &Selection) -> Vec<Move> {
    selection
        .candidates()
        .iter()
        .map(|c| Move::from_rect(&c.rect))
        .collect()
}

/// Total score of a selection: the apples its members remove.
pub fn total_score(selection: &Selection) -> u32 {
    selection.score()
}

/// One step of a replay: the move, the apples it removed, and the grid
/// afterwards.
#[derive(Clone, Debug)]
pub struct ReplayStep {
    /// The move played.
    pub mv: Move,
    /// Apples removed by this move.
    pub gained: u32,
    /// Grid state after the move.
    pub grid_after: Grid,
}

/// Result of replaying a move list against a grid.
#[derive(Clone, Debug)]
pub struct Replay {
    /// Per-move outcomes in play order.
    pub steps: Vec<ReplayStep>,
    /// Sum of the per-move gains.
    pub total_score: u32,
}

/// Plays `moves` in order against `grid`, clearing each move's rectangle and
/// recording the score gained per move.
///
/// The grid itself is untouched; each step carries a fresh snapshot. For
/// moves produced by [`sequence`] from a solver selection, the replay total
/// equals the selection score.
///
/// # Returns
/// `Err(GridError::UnorderedCorners)` when a move's corners are not in
/// top-left/bottom-right order, and `Err(GridError::OutOfBounds)` when a
/// move's bottom-right corner falls outside the grid.
pub fn replay(grid: &Grid, moves: &[Move]) -> Result<Replay, GridError> {
    let mut current = grid.clone();
    let mut steps = Vec::with_capacity(moves.len());
    let mut total_score = 0;

    for &mv in moves {
        let rect = mv.rect()?;
        if rect.r2 >= current.rows() || rect.c2 >= current.cols() {
            return Err(GridError::OutOfBounds {
                row: rect.r2,
                col: rect.c2,
                rows: current.rows(),
                cols: current.cols(),
            });
        }

        let after = current.cleared(&rect);
        let gained = current.non_empty_count() - after.non_empty_count();
        total_score += gained;
        current = after;
        steps.push(ReplayStep {
            mv,
            gained,
            grid_after: current.clone(),
        });
    }

    Ok(Replay { steps, total_score })
}
