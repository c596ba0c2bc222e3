//! Host capability boundary.
//!
//! Everything host-specific about the game (reading the board, performing
//! drags) sits behind [`GameHost`]. The core only needs the two operations:
//! get a valid [`Grid`] in, send an ordered move list out. A live-screen
//! host with template matching and mouse automation would implement the same
//! trait; this crate ships the problem-file host used by the CLI.
use crate::grid::Grid;
use crate::moves::{self, Move};
use crate::solver::SolverError;
use std::fs;
use std::path::PathBuf;

/// The two operations the core requires from a game host.
pub trait GameHost {
    /// Produces the current board as a validated grid.
    fn capture_grid(&mut self) -> Result<Grid, SolverError>;

    /// Plays the moves in order against the given grid and returns the
    /// score achieved.
    fn execute_moves(&mut self, grid: &Grid, moves: &[Move]) -> Result<u32, SolverError>;
}

/// A host backed by a problem file: capture parses the file, execution is a
/// logged replay simulation.
pub struct ProblemFileHost {
    path: PathBuf,
}

impl ProblemFileHost {
    /// Creates a host reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ProblemFileHost { path: path.into() }
    }
}

impl GameHost for ProblemFileHost {
    fn capture_grid(&mut self) -> Result<Grid, SolverError> {
        let text = fs::read_to_string(&self.path)?;
        let grid = Grid::parse(&text)?;
        log::info!(
            "loaded {}x{} grid from {} (apple sum {})",
            grid.rows(),
            grid.cols(),
            self.path.display(),
            grid.total_sum()
        );
        Ok(grid)
    }

    fn execute_moves(&mut self, grid: &Grid, moves: &[Move]) -> Result<u32, SolverError> {
        let replayed = moves::replay(grid, moves)?;
        let mut running = 0;
        for (i, step) in replayed.steps.iter().enumerate() {
            running += step.gained;
            log::info!(
                "move {}/{}: {} removes {} apples, score {}",
                i + 1,
                replayed.steps.len(),
                step.mv,
                step.gained,
                running
            );
            log::debug!("grid after move {}:\n{}", i + 1, step.grid_after);
        }
        Ok(replayed.total_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridError;
    use crate::solver::{solve, SolverConfig};
    use std::io::Write as _;

    fn write_temp_problem(contents: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "fruitbox_host_test_{}_{}.txt",
            std::process::id(),
            contents.len()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_capture_and_execute_round_trip() {
        let path = write_temp_problem("1 9\n9 1\n");
        let mut host = ProblemFileHost::new(&path);

        let grid = host.capture_grid().unwrap();
        assert_eq!(grid.rows(), 2);

        let selection = solve(&grid, &SolverConfig::default());
        let moves = moves::sequence(&selection);
        let score = host.execute_moves(&grid, &moves).unwrap();
        assert_eq!(score, selection.score());

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_capture_invalid_grid_fails() {
        let path = write_temp_problem("1 2\n3 10\n");
        let mut host = ProblemFileHost::new(&path);
        let err = host.capture_grid().unwrap_err();
        assert!(matches!(
            err,
            SolverError::Grid(GridError::InvalidValue { .. })
        ));
        fs::remove_file(path).ok();
    }

    #[test]
    fn test_capture_missing_file_fails() {
        let mut host = ProblemFileHost::new("/nonexistent/fruitbox_problem.txt");
        assert!(matches!(
            host.capture_grid().unwrap_err(),
            SolverError::Io(_)
        ));
    }
}
