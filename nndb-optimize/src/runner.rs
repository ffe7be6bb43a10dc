//! Generation loop
//!
//! Two warm-up generations settle the oversized initial population, then
//! each generation logs its best solution. The first time any of the top
//! three solutions appears it is appended to the results writer, so the
//! results file reads as a history of discoveries.

use crate::engine::OptEngine;
use crate::report::{describe, separator};
use std::collections::HashSet;
use std::io::Write;
use tracing::info;

pub const WARMUP_GENERATIONS: usize = 2;

/// Solutions per generation checked for first sightings
pub const TRACKED_TOP: usize = 3;

/// Outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generations: usize,
    pub best_score: f64,
    /// Distinct solutions written to the results
    pub first_sightings: usize,
}

/// Run `generations` generations after the warm-up
pub fn run<W: Write>(
    engine: &mut OptEngine,
    generations: usize,
    results: &mut W,
) -> std::io::Result<RunSummary> {
    info!("Pre-running {} generations", WARMUP_GENERATIONS);
    for _ in 0..WARMUP_GENERATIONS {
        engine.generation();
    }

    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    let mut best_score = f64::INFINITY;

    for gen in 1..=generations {
        engine.generation();

        let last = engine.last_generation();
        if let Some(best) = last.first() {
            best_score = best.score;
            info!("BEGIN Generation {} (pop size {})", gen, last.len());
            for line in describe(engine, best) {
                info!("{}", line);
            }
            info!("END Generation {}", gen);
            info!("{}", "-".repeat(20));
        }

        for solution in last.iter().take(TRACKED_TOP) {
            let key: Vec<u64> = solution.instance.iter().map(|v| v.to_bits()).collect();
            if !seen.insert(key) {
                continue;
            }

            writeln!(results, "First Seen Generation {}", gen)?;
            for line in describe(engine, solution) {
                writeln!(results, "{}", line)?;
            }
            writeln!(results, "{}", separator())?;
            results.flush()?;
        }
    }

    Ok(RunSummary {
        generations,
        best_score,
        first_sightings: seen.len(),
    })
}

/// Log every food's standalone score, best first
pub fn log_food_scores(engine: &mut OptEngine) {
    let scores = engine.food_scores().to_vec();
    for solution in &scores {
        for line in describe(engine, solution) {
            info!("{}", line);
        }
        info!("{}", separator());
    }
}
