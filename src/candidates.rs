//! Rectangle candidate generation.
//!
//! A candidate is an axis-aligned sub-rectangle whose contained values sum to
//! exactly [`TARGET_SUM`]. This module enumerates every such rectangle in a
//! deterministic order (row-major by top-left corner, then row-major by
//! bottom-right corner), which keeps the downstream search reproducible.
//! Interior sums come from a prefix-sum table so each rectangle is O(1).
use crate::grid::{CellSet, Grid};

/// The interior sum a rectangle must hit to be selectable.
pub const TARGET_SUM: u32 = 10;

/// An axis-aligned rectangle with inclusive corners.
///
/// Invariant: `r1 <= r2` and `c1 <= c2`. All coordinates are 0-based grid
/// indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Top-left row.
    pub r1: usize,
    /// Top-left column.
    pub c1: usize,
    /// Bottom-right row (inclusive).
    pub r2: usize,
    /// Bottom-right column (inclusive).
    pub c2: usize,
}

impl Rect {
    /// Builds a rectangle from inclusive corners.
    ///
    /// # Panics
    /// Panics when the corners are not in top-left/bottom-right order; the
    /// generator only ever produces ordered corners, so a violation here is
    /// an internal bug rather than bad user input.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        assert!(r1 <= r2 && c1 <= c2, "rect corners out of order");
        Rect { r1, c1, r2, c2 }
    }

    /// Number of cells inside the rectangle, empty cells included.
    pub fn area(&self) -> usize {
        (self.r2 - self.r1 + 1) * (self.c2 - self.c1 + 1)
    }

    /// True when `(r, c)` lies inside the rectangle.
    pub fn contains(&self, r: usize, c: usize) -> bool {
        self.r1 <= r && r <= self.r2 && self.c1 <= c && c <= self.c2
    }

    /// True when the two rectangles share at least one cell.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.r1 <= other.r2 && other.r1 <= self.r2 && self.c1 <= other.c2 && other.c1 <= self.c2
    }

    /// Iterates over every `(r, c)` inside the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.r1..=self.r2).flat_map(move |r| (self.c1..=self.c2).map(move |c| (r, c)))
    }
}

/// A rectangle whose interior sums to [`TARGET_SUM`], with its reward cached.
///
/// The reward is the count of non-empty cells inside: selecting the candidate
/// removes those apples. Empty cells inside are consumed too but score
/// nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// The selectable rectangle.
    pub rect: Rect,
    /// Number of apples (cells with value > 0) the rectangle removes.
    pub reward: u32,
}

impl Candidate {
    /// Builds the candidate's footprint mask over `grid`'s flattened cell
    /// indices. The whole rectangle is marked, empty cells included, because
    /// a selected rectangle consumes every cell it covers.
    pub fn cell_set(&self, grid: &Grid) -> CellSet {
        let mut set = CellSet::for_grid(grid);
        for (r, c) in self.rect.cells() {
            set.insert(grid.flat_index(r, c));
        }
        set
    }
}

/// Inclusion-exclusion prefix sums over a grid.
///
/// `table[r][c]` holds the sum of the sub-grid with exclusive bottom-right
/// `(r, c)`, so any rectangle sum is four lookups.
#[derive(Clone, Debug)]
pub struct PrefixSums {
    table: Vec<u32>,
    cols: usize,
}

impl PrefixSums {
    /// Builds the `(rows + 1) x (cols + 1)` table for `grid`.
    pub fn new(grid: &Grid) -> Self {
        let rows = grid.rows();
        let cols = grid.cols();
        let width = cols + 1;
        let mut table = vec![0u32; (rows + 1) * width];
        for r in 0..rows {
            for c in 0..cols {
                table[(r + 1) * width + (c + 1)] = table[(r + 1) * width + c]
                    + table[r * width + (c + 1)]
                    - table[r * width + c]
                    + u32::from(grid.at(r, c));
            }
        }
        PrefixSums { table, cols }
    }

    /// Sum of every value inside `rect` in O(1).
    pub fn rect_sum(&self, rect: &Rect) -> u32 {
        let width = self.cols + 1;
        let at = |r: usize, c: usize| self.table[r * width + c];
        at(rect.r2 + 1, rect.c2 + 1) + at(rect.r1, rect.c1)
            - at(rect.r2 + 1, rect.c1)
            - at(rect.r1, rect.c2 + 1)
    }
}

/// Enumerates every rectangle of `grid` whose interior sums to exactly
/// [`TARGET_SUM`].
///
/// The enumeration visits top-left corners row-major and, within each, the
/// bottom-right corners row-major, so the output order is deterministic and
/// duplicate-free. A qualifying rectangle always contains at least one
/// non-empty cell (an all-zero rectangle sums to 0, never 10), so every
/// emitted candidate has `reward >= 1`.
///
/// Cell values are non-negative, so a rectangle's sum is monotone in its
/// bottom-right corner; the inner loop stops early once the sum passes the
/// target. Correctness only relies on the exhaustive corner scan.
///
/// # Examples
/// ```
/// use fruitbox_solver::candidates::generate;
/// use fruitbox_solver::grid::Grid;
///
/// let grid = Grid::from_rows(vec![vec![1, 9], vec![8, 2]]).unwrap();
/// let found = generate(&grid);
/// // Each row sums to 10; no column or larger rectangle does.
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[0].reward, 2);
/// ```
pub fn generate(grid: &Grid) -> Vec<Candidate> {
    let sums = PrefixSums::new(grid);
    let mut found = Vec::new();
    for r1 in 0..grid.rows() {
        for c1 in 0..grid.cols() {
            for r2 in r1..grid.rows() {
                for c2 in c1..grid.cols() {
                    let rect = Rect::new(r1, c1, r2, c2);
                    let sum = sums.rect_sum(&rect);
                    if sum > TARGET_SUM {
                        // Widening the rectangle can only grow the sum.
                        break;
                    }
                    if sum == TARGET_SUM {
                        let reward = rect
                            .cells()
                            .filter(|&(r, c)| grid.at(r, c) > 0)
                            .count() as u32;
                        found.push(Candidate { rect, reward });
                    }
                }
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Brute-force cross-check: sum a rectangle by walking its cells.
    fn naive_rect_sum(grid: &Grid, rect: &Rect) -> u32 {
        rect.cells().map(|(r, c)| u32::from(grid.at(r, c))).sum()
    }

    /// Brute-force candidate enumeration without prefix sums.
    fn naive_generate(grid: &Grid) -> Vec<Candidate> {
        let mut found = Vec::new();
        for r1 in 0..grid.rows() {
            for c1 in 0..grid.cols() {
                for r2 in r1..grid.rows() {
                    for c2 in c1..grid.cols() {
                        let rect = Rect::new(r1, c1, r2, c2);
                        if naive_rect_sum(grid, &rect) == TARGET_SUM {
                            let reward = rect
                                .cells()
                                .filter(|&(r, c)| grid.at(r, c) > 0)
                                .count() as u32;
                            found.push(Candidate { rect, reward });
                        }
                    }
                }
            }
        }
        found
    }

    #[test]
    fn test_rect_area_contains() {
        let rect = Rect::new(1, 2, 3, 5);
        assert_eq!(rect.area(), 12);
        assert!(rect.contains(1, 2));
        assert!(rect.contains(3, 5));
        assert!(!rect.contains(0, 2));
        assert!(!rect.contains(1, 6));
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0, 0, 1, 1);
        let b = Rect::new(1, 1, 2, 2);
        let c = Rect::new(2, 0, 3, 0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
        assert!(!a.intersects(&c));
        assert!(b.intersects(&c) == c.intersects(&b));
    }

    #[test]
    #[should_panic(expected = "corners out of order")]
    fn test_rect_new_rejects_unordered_corners() {
        Rect::new(2, 0, 1, 0);
    }

    #[test]
    fn test_prefix_sums_match_naive() {
        let grid = Grid::from_rows(vec![
            vec![1, 2, 3, 0],
            vec![0, 9, 1, 4],
            vec![5, 0, 0, 2],
        ])
        .unwrap();
        let sums = PrefixSums::new(&grid);
        for r1 in 0..grid.rows() {
            for c1 in 0..grid.cols() {
                for r2 in r1..grid.rows() {
                    for c2 in c1..grid.cols() {
                        let rect = Rect::new(r1, c1, r2, c2);
                        assert_eq!(
                            sums.rect_sum(&rect),
                            naive_rect_sum(&grid, &rect),
                            "mismatch for {:?}",
                            rect
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_generate_two_row_grid() {
        // [[1,9],[8,2]] has exactly the two row candidates; the columns sum
        // to 9 and 11 and the full square to 20.
        let grid = Grid::from_rows(vec![vec![1, 9], vec![8, 2]]).unwrap();
        let found = generate(&grid);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].rect, Rect::new(0, 0, 0, 1));
        assert_eq!(found[1].rect, Rect::new(1, 0, 1, 1));
        assert!(found.iter().all(|c| c.reward == 2));
    }

    #[test]
    fn test_generate_finds_row_and_column_candidates() {
        // In [[1,9],[9,1]] both rows and both columns sum to 10.
        let grid = Grid::from_rows(vec![vec![1, 9], vec![9, 1]]).unwrap();
        let found = generate(&grid);
        assert_eq!(found.len(), 4);
        assert!(found.iter().any(|c| c.rect == Rect::new(0, 0, 1, 0)));
        assert!(found.iter().any(|c| c.rect == Rect::new(0, 1, 1, 1)));
    }

    #[test]
    fn test_generate_all_zero_grid() {
        let grid = Grid::from_rows(vec![vec![0; 4]; 4]).unwrap();
        assert!(generate(&grid).is_empty());
    }

    #[test]
    fn test_generate_counts_empty_cells_in_footprint_not_reward() {
        // 5 0 5 sums to 10 across all three cells; the zero is consumed but
        // does not score.
        let grid = Grid::from_rows(vec![vec![5, 0, 5]]).unwrap();
        let found = generate(&grid);
        let wide = found
            .iter()
            .find(|c| c.rect == Rect::new(0, 0, 0, 2))
            .expect("full row should be a candidate");
        assert_eq!(wide.reward, 2);
        assert_eq!(wide.rect.area(), 3);
    }

    #[test]
    fn test_generate_order_is_deterministic() {
        let grid = Grid::random_with_seed(6, 6, 99).unwrap();
        let a = generate(&grid);
        let b = generate(&grid);
        assert_eq!(a, b);
        // Row-major by top-left corner.
        for pair in a.windows(2) {
            let (p, q) = (pair[0].rect, pair[1].rect);
            assert!((p.r1, p.c1, p.r2, p.c2) < (q.r1, q.c1, q.r2, q.c2));
        }
    }

    #[test]
    fn test_generate_never_emits_non_target_sums() {
        let grid = Grid::random_with_seed(8, 8, 3).unwrap();
        let sums = PrefixSums::new(&grid);
        for cand in generate(&grid) {
            assert_eq!(sums.rect_sum(&cand.rect), TARGET_SUM);
            assert!(cand.reward >= 1);
        }
    }

    #[test]
    fn test_candidate_cell_set_covers_footprint() {
        let grid = Grid::from_rows(vec![vec![5, 0, 5], vec![1, 1, 1]]).unwrap();
        let cand = Candidate {
            rect: Rect::new(0, 0, 0, 2),
            reward: 2,
        };
        let set = cand.cell_set(&grid);
        assert_eq!(set.count(), 3);
        assert!(set.contains(grid.flat_index(0, 1)));
        assert!(!set.contains(grid.flat_index(1, 0)));
    }

    proptest! {
        /// Exhaustiveness: the prefix-sum generator agrees with a
        /// brute-force double loop on small grids.
        #[test]
        fn prop_generate_matches_naive(
            values in prop::collection::vec(
                prop::collection::vec(0u8..=9, 1..=6),
                1..=6,
            )
        ) {
            let cols = values[0].len();
            let rows: Vec<Vec<u8>> = values
                .into_iter()
                .map(|mut row| { row.resize(cols, 0); row })
                .collect();
            let grid = Grid::from_rows(rows).unwrap();
            prop_assert_eq!(generate(&grid), naive_generate(&grid));
        }
    }
}
