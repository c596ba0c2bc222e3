use fruitbox_solver::candidates::{generate, Candidate};
use fruitbox_solver::grid::Grid;
use fruitbox_solver::heuristics::{greedy_by_reward, greedy_first_fit};
use fruitbox_solver::solver::{solve, Algorithm, Selection, SolverConfig};
use std::collections::HashMap;
use std::time::Duration;

const NUM_RANDOM_GRIDS_FOR_EVALUATION: usize = 20;
const START_SEED: u64 = 0;
const GRID_ROWS: usize = 10;
const GRID_COLS: usize = 17;
const QUBO_TIME_BUDGET: Duration = Duration::from_secs(5);

type StrategyFn = fn(&Grid, &[Candidate]) -> Selection;

fn run_dfs(grid: &Grid, _candidates: &[Candidate]) -> Selection {
    solve(grid, &SolverConfig::default())
}

fn run_qubo(grid: &Grid, _candidates: &[Candidate]) -> Selection {
    let config = SolverConfig {
        algorithm: Algorithm::Qubo,
        time_budget: Some(QUBO_TIME_BUDGET),
        ..SolverConfig::default()
    };
    solve(grid, &config)
}

fn main() {
    env_logger::init();

    let strategies: Vec<(&str, StrategyFn)> = vec![
        ("DFS", run_dfs),
        ("QUBO", run_qubo),
        ("GreedyReward", greedy_by_reward),
        ("GreedyFirst", greedy_first_fit),
    ];

    let mut all_scores: HashMap<String, Vec<u32>> = HashMap::new();
    for (name, _) in &strategies {
        all_scores.insert(name.to_string(), Vec::new());
    }

    println!(
        "Starting strategy evaluation for {} random {}x{} grids...",
        NUM_RANDOM_GRIDS_FOR_EVALUATION, GRID_ROWS, GRID_COLS
    );

    for grid_idx in 0..NUM_RANDOM_GRIDS_FOR_EVALUATION {
        let current_seed = START_SEED + grid_idx as u64;
        let grid = match Grid::random_with_seed(GRID_ROWS, GRID_COLS, current_seed) {
            Ok(grid) => grid,
            Err(err) => {
                eprintln!("Error generating grid {} (seed {}): {}", grid_idx, current_seed, err);
                continue;
            }
        };
        let candidates = generate(&grid);

        println!(
            "\nEvaluating Grid {} (Seed: {}, {} candidates)",
            grid_idx,
            current_seed,
            candidates.len()
        );

        for (strategy_name, strategy_fn) in &strategies {
            let selection = strategy_fn(&grid, &candidates);
            if !selection.is_overlap_free() {
                eprintln!(
                    "Error: Strategy {} produced an overlapping selection on grid {} (Seed: {}).",
                    strategy_name, grid_idx, current_seed
                );
                continue;
            }
            println!(
                "  Strategy: {:<12}, Score: {:<4}, Rectangles: {}{}",
                strategy_name,
                selection.score(),
                selection.len(),
                if selection.is_provisional() {
                    " (provisional)"
                } else {
                    ""
                }
            );
            all_scores
                .get_mut(*strategy_name)
                .unwrap()
                .push(selection.score());
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of grids evaluated: {}", NUM_RANDOM_GRIDS_FOR_EVALUATION);
    println!(
        "Strategies evaluated: {}",
        strategies
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<&str>>()
            .join(", ")
    );
    println!("\n--- Average Scores ---");

    let mut sorted_avg_scores: Vec<(&str, f64)> = Vec::new();

    for (strategy_name, _) in &strategies {
        let scores = &all_scores[*strategy_name];
        if scores.is_empty() {
            println!("Strategy {}: No scores recorded.", strategy_name);
            continue;
        }
        let total_score: u32 = scores.iter().sum();
        let avg_score = total_score as f64 / scores.len() as f64;
        sorted_avg_scores.push((strategy_name, avg_score));
    }

    // Sort by average score descending.
    sorted_avg_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    for (strategy_name, avg_score) in sorted_avg_scores {
        println!("Strategy {:<12}: Average Score = {:.2}", strategy_name, avg_score);
    }
}
