//! Grid model for the Fruit Box puzzle.
//!
//! This module defines the puzzle's fundamental data:
//! - `Grid`: an immutable 2D array of apple values (1-9, or 0 for an empty
//!   cell) with validated construction, text parsing, and seeded random
//!   generation.
//! - `CellSet`: a fixed-size bitset over flattened `(row, col)` indices,
//!   used by the search strategies to track covered cells.
//! - `GridError`: everything that can go wrong while building or addressing
//!   a grid.
use crate::candidates::Rect;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use thiserror::Error;

/// The largest value an apple cell may hold. Cells hold `0..=MAX_CELL_VALUE`,
/// with 0 meaning the cell is empty.
pub const MAX_CELL_VALUE: u8 = 9;

/// Errors produced while constructing, parsing, or addressing a [`Grid`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    /// The grid has zero rows or zero columns.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// A row's width disagrees with the first row's width.
    #[error("row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A cell value is outside `0..=9`.
    #[error("cell ({row}, {col}) holds {value}, but values must be in 0..=9")]
    InvalidValue { row: usize, col: usize, value: u32 },

    /// A cell address is outside the grid.
    #[error("cell ({row}, {col}) is out of bounds for a {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// A token in a problem file could not be read as an integer.
    #[error("line {line}: token '{token}' is not an integer")]
    ParseToken { line: usize, token: String },

    /// A rectangle's corners are not in top-left/bottom-right order.
    #[error("corners ({r1}, {c1}) -> ({r2}, {c2}) are out of order")]
    UnorderedCorners {
        r1: usize,
        c1: usize,
        r2: usize,
        c2: usize,
    },
}

/// An immutable grid of apple values.
///
/// Cells are stored row-major in a flat buffer. The grid is validated on
/// construction and never mutated afterwards; replaying moves produces new
/// grids instead (see [`crate::moves::replay`]).
///
/// # Examples
/// ```
/// use fruitbox_solver::grid::Grid;
/// let grid = Grid::from_rows(vec![vec![1, 9], vec![9, 1]]).unwrap();
/// assert_eq!(grid.rows(), 2);
/// assert_eq!(grid.cols(), 2);
/// assert_eq!(grid.cell(0, 1).unwrap(), 9);
/// assert_eq!(grid.total_sum(), 20);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Grid {
    /// Builds a grid from row vectors.
    ///
    /// # Arguments
    /// * `values`: one inner vector per row, top to bottom.
    ///
    /// # Returns
    /// * `Ok(Grid)` when every row has the same non-zero width and every
    ///   value is in `0..=9`.
    /// * `Err(GridError::Empty)` when there are no rows or the first row is
    ///   empty.
    /// * `Err(GridError::RaggedRow)` when a later row's width differs.
    /// * `Err(GridError::InvalidValue)` when a value exceeds 9.
    pub fn from_rows(values: Vec<Vec<u8>>) -> Result<Self, GridError> {
        if values.is_empty() || values[0].is_empty() {
            return Err(GridError::Empty);
        }
        let rows = values.len();
        let cols = values[0].len();
        let mut cells = Vec::with_capacity(rows * cols);
        for (r, row) in values.iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::RaggedRow {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                if value > MAX_CELL_VALUE {
                    return Err(GridError::InvalidValue {
                        row: r,
                        col: c,
                        value: u32::from(value),
                    });
                }
                cells.push(value);
            }
        }
        Ok(Grid { rows, cols, cells })
    }

    /// Parses a grid from problem-file text.
    ///
    /// One row per line, cells as whitespace-separated integers, 0 for an
    /// empty cell. Blank lines are skipped so trailing newlines are harmless.
    ///
    /// # Returns
    /// * `Err(GridError::ParseToken)` on a non-integer token, with the
    ///   1-based line number of the offending row.
    /// * `Err(GridError::InvalidValue)` on values outside `0..=9` (a literal
    ///   `10` is rejected here, not split into two cells).
    /// * Structural errors as in [`Grid::from_rows`].
    ///
    /// # Examples
    /// ```
    /// use fruitbox_solver::grid::Grid;
    /// let grid = Grid::parse("1 9\n9 1\n").unwrap();
    /// assert_eq!(grid.cell(1, 0).unwrap(), 9);
    /// assert!(Grid::parse("10").is_err());
    /// assert!(Grid::parse("3 x").is_err());
    /// ```
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let mut values = Vec::new();
        for (line_idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row_idx = values.len();
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                let parsed: u32 = token.parse().map_err(|_| GridError::ParseToken {
                    line: line_idx + 1,
                    token: token.to_string(),
                })?;
                if parsed > u32::from(MAX_CELL_VALUE) {
                    return Err(GridError::InvalidValue {
                        row: row_idx,
                        col: row.len(),
                        value: parsed,
                    });
                }
                row.push(parsed as u8);
            }
            values.push(row);
        }
        Grid::from_rows(values)
    }

    /// Creates a fully-filled random grid with values 1-9 using the given
    /// seed.
    ///
    /// The same seed always produces the same grid, which keeps the CLI's
    /// random mode, the strategy evaluator, and tests reproducible.
    ///
    /// # Returns
    /// `Err(GridError::Empty)` when `rows` or `cols` is zero.
    pub fn random_with_seed(rows: usize, cols: usize, seed: u64) -> Result<Self, GridError> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        let mut rng = SmallRng::seed_from_u64(seed);
        let cells = (0..rows * cols)
            .map(|_| rng.gen_range(1..=MAX_CELL_VALUE))
            .collect();
        Ok(Grid { rows, cols, cells })
    }

    /// Returns a copy of the grid with every cell inside `rect` set to 0.
    ///
    /// This is the one state transition of the game: playing a rectangle
    /// consumes all of its cells, empty ones included. The receiver is
    /// untouched.
    ///
    /// # Panics
    /// Panics when `rect` extends past the grid's bounds; callers that
    /// accept untrusted coordinates must bound-check first.
    ///
    /// # Examples
    /// ```
    /// use fruitbox_solver::candidates::Rect;
    /// use fruitbox_solver::grid::Grid;
    ///
    /// let grid = Grid::from_rows(vec![vec![1, 9], vec![8, 2]]).unwrap();
    /// let after = grid.cleared(&Rect::new(0, 0, 0, 1));
    /// assert_eq!(after.cell(0, 1).unwrap(), 0);
    /// assert_eq!(after.cell(1, 1).unwrap(), 2);
    /// assert_eq!(grid.cell(0, 1).unwrap(), 9);
    /// ```
    pub fn cleared(&self, rect: &Rect) -> Grid {
        assert!(
            rect.r2 < self.rows && rect.c2 < self.cols,
            "rect ({}, {}) -> ({}, {}) exceeds a {}x{} grid",
            rect.r1,
            rect.c1,
            rect.r2,
            rect.c2,
            self.rows,
            self.cols
        );
        let mut cells = self.cells.clone();
        for (r, c) in rect.cells() {
            cells[r * self.cols + c] = 0;
        }
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total cell count (`rows * cols`), the index space of [`CellSet`].
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True for the degenerate case `len() == 0`. Construction forbids it,
    /// so this only exists to satisfy the usual `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the value at `(r, c)`.
    ///
    /// # Returns
    /// `Err(GridError::OutOfBounds)` when the address is outside the grid.
    pub fn cell(&self, r: usize, c: usize) -> Result<u8, GridError> {
        if r >= self.rows || c >= self.cols {
            return Err(GridError::OutOfBounds {
                row: r,
                col: c,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.cells[r * self.cols + c])
    }

    /// Unchecked value lookup for internal loops that already iterate within
    /// bounds.
    pub(crate) fn at(&self, r: usize, c: usize) -> u8 {
        self.cells[r * self.cols + c]
    }

    /// Flattened index of `(r, c)`, the key used by [`CellSet`].
    pub(crate) fn flat_index(&self, r: usize, c: usize) -> usize {
        r * self.cols + c
    }

    /// Sum of every cell value on the grid.
    pub fn total_sum(&self) -> u32 {
        self.cells.iter().map(|&v| u32::from(v)).sum()
    }

    /// Count of cells holding an apple (value > 0).
    pub fn non_empty_count(&self) -> u32 {
        self.cells.iter().filter(|&&v| v > 0).count() as u32
    }
}

impl fmt::Display for Grid {
    /// Writes rows of space-separated values, one row per line, in the same
    /// shape [`Grid::parse`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..self.rows {
            for c in 0..self.cols {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.at(r, c))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A fixed-size bitset over flattened grid cell indices.
///
/// The DFS strategy carries one of these as its covered-cell mask, and every
/// candidate precomputes its footprint as a `CellSet` so overlap checks are
/// a handful of word-wise ANDs instead of nested coordinate loops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSet {
    bits: Vec<u64>,
    len: usize,
}

impl CellSet {
    /// Creates an empty set able to hold indices `0..len`.
    pub fn new(len: usize) -> Self {
        CellSet {
            bits: vec![0; len.div_ceil(64)],
            len,
        }
    }

    /// Creates an empty set sized for every cell of `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        CellSet::new(grid.len())
    }

    /// Marks index `idx` as present.
    ///
    /// # Panics
    /// Panics if `idx` is outside the capacity given at construction.
    pub fn insert(&mut self, idx: usize) {
        assert!(idx < self.len, "CellSet index {} out of range {}", idx, self.len);
        self.bits[idx / 64] |= 1 << (idx % 64);
    }

    /// True when index `idx` is present.
    pub fn contains(&self, idx: usize) -> bool {
        idx < self.len && self.bits[idx / 64] & (1 << (idx % 64)) != 0
    }

    /// True when the two sets share no index.
    pub fn is_disjoint(&self, other: &CellSet) -> bool {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .all(|(a, b)| a & b == 0)
    }

    /// Adds every index of `other` to `self`.
    pub fn union_with(&mut self, other: &CellSet) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a |= b;
        }
    }

    /// Removes every index of `other` from `self`. The DFS backtrack step
    /// relies on this; `other` must be a subset of `self` there, but the
    /// operation is a plain difference either way.
    pub fn difference_with(&mut self, other: &CellSet) {
        for (a, b) in self.bits.iter_mut().zip(other.bits.iter()) {
            *a &= !b;
        }
    }

    /// Number of indices present.
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|b| b.count_ones()).sum()
    }
}
