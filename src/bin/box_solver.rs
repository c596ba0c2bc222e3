use clap::Parser;
use fruitbox_solver::grid::Grid;
use fruitbox_solver::host::{GameHost, ProblemFileHost};
use fruitbox_solver::moves;
use fruitbox_solver::solver::{solve, Algorithm, SolverConfig, SolverError};
use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a problem file (rows of space-separated values, 0 = empty)
    #[clap(short, long)]
    file: Option<PathBuf>,

    /// Strategy: dfs (default) or qubo (experimental)
    #[clap(short, long, default_value_t = Algorithm::Dfs)]
    algorithm: Algorithm,

    /// Seed for a random grid when no file is given
    #[clap(short, long, default_value_t = 0)]
    seed: u64,

    /// Rows of the random grid
    #[clap(long, default_value_t = 10)]
    rows: usize,

    /// Columns of the random grid
    #[clap(long, default_value_t = 17)]
    cols: usize,

    /// Stop the DFS after this many search nodes and keep the best so far
    #[clap(long)]
    node_budget: Option<u64>,

    /// Wall-clock budget for the solve, in milliseconds
    #[clap(long)]
    time_budget_ms: Option<u64>,
}

fn run(args: &Args) -> Result<(), SolverError> {
    let mut file_host = args.file.as_ref().map(ProblemFileHost::new);
    let grid = match file_host.as_mut() {
        Some(host) => host.capture_grid()?,
        None => Grid::random_with_seed(args.rows, args.cols, args.seed)?,
    };

    println!("Grid ({}x{}, apple sum {}):", grid.rows(), grid.cols(), grid.total_sum());
    println!("{}", grid);

    let config = SolverConfig {
        algorithm: args.algorithm,
        node_budget: args.node_budget,
        time_budget: args.time_budget_ms.map(Duration::from_millis),
        ..SolverConfig::default()
    };

    println!("Searching with {}...", config.algorithm);
    let search_start = Instant::now();
    let selection = solve(&grid, &config);
    let elapsed = search_start.elapsed();

    println!(
        "Found {} rectangles, score {} in {:.2?}{}",
        selection.len(),
        selection.score(),
        elapsed,
        if selection.is_provisional() {
            " (provisional: budget exhausted)"
        } else {
            ""
        }
    );

    let move_list = moves::sequence(&selection);
    if move_list.is_empty() {
        println!("No moves available.");
        return Ok(());
    }

    match file_host.as_mut() {
        Some(host) => {
            let score = host.execute_moves(&grid, &move_list)?;
            println!("Executed {} moves for a score of {}.", move_list.len(), score);
        }
        None => {
            let replayed = moves::replay(&grid, &move_list)?;
            let mut running = 0;
            for (i, step) in replayed.steps.iter().enumerate() {
                running += step.gained;
                println!(
                    "Move {}/{}: {}  (+{}, total {})",
                    i + 1,
                    replayed.steps.len(),
                    step.mv,
                    step.gained,
                    running
                );
            }
            println!("Final score: {}", replayed.total_score);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
