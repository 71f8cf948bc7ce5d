//! Batch distribution for parallel simulation.
//!
//! Splits trials into batches for progress reporting. The battle runner
//! uses one trial per parallel task; this module provides batch boundaries.

use crate::data::SimulationConfig;
use crate::error::Result;
use crate::parallel::pool::WorkerPool;
use crate::simulation::monte_carlo::run_battles_parallel;
use crate::simulation::stats::AggregateStats;

/// Trial index ranges `[start, end)` for at most `num_batches` batches.
/// Sizes differ by at most one trial, larger batches first.
///
/// ```
/// # use skirmish::parallel::batch_ranges;
/// assert_eq!(batch_ranges(10, 3), vec![(0, 4), (4, 7), (7, 10)]);
/// ```
pub fn batch_ranges(total: usize, num_batches: usize) -> Vec<(usize, usize)> {
    if total == 0 || num_batches == 0 {
        return Vec::new();
    }
    let num_batches = num_batches.min(total);
    let (base, remainder) = (total / num_batches, total % num_batches);
    (0..num_batches)
        .scan(0, |start, batch| {
            let end = *start + base + usize::from(batch < remainder);
            let range = (*start, end);
            *start = end;
            Some(range)
        })
        .collect()
}

/// Run a parallel battle simulation on `pool`. Splitting into batches
/// does not change results, since every trial's stream is derived from
/// `seed` and its index.
pub fn run_battle_batches(
    config: &SimulationConfig,
    seed: u64,
    pool: &WorkerPool,
) -> Result<AggregateStats> {
    pool.install(|| run_battles_parallel(config, seed))
}
