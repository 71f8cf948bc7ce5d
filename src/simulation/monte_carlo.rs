use std::ops::Range;

use rayon::prelude::*;
use serde::Serialize;

use crate::combat::{
    resolve_seed, seeded, trial_seed, Battle, BattleConfig, BattleOutcome, SimRng,
};
use crate::data::SimulationConfig;
use crate::error::Result;
use crate::parallel::{batch_ranges, WorkerPool};
use crate::simulation::stats::AggregateStats;

/// Number of progress-reporting batches for long runs.
const PROGRESS_BATCH_COUNT: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub seed: u64,
    pub iterations: usize,
    pub parallel: bool,
    pub stats: AggregateStats,
}

fn run_trial(config: &SimulationConfig, battle: BattleConfig, rng: &mut SimRng) -> Result<BattleOutcome> {
    Battle::new(config.players(), config.opponents(), battle).run(rng)
}

/// Runs `config.iterations` battles on one random stream seeded with `seed`.
/// Each trial starts from freshly built rosters.
pub fn run_battles(config: &SimulationConfig, seed: u64) -> Result<AggregateStats> {
    let battle = config.battle_config();
    let mut rng = seeded(seed);
    let mut stats = AggregateStats::new();
    for _ in 0..config.iterations {
        let outcome = run_trial(config, battle, &mut rng)?;
        stats.track(&outcome);
    }
    Ok(stats)
}

/// Like [run_battles] but distributes trials across rayon workers. Each trial
/// gets its own stream derived from `seed` and its index, so results do not
/// depend on the worker count.
pub fn run_battles_parallel(config: &SimulationConfig, seed: u64) -> Result<AggregateStats> {
    run_trial_range(config, seed, 0..config.iterations)
}

fn run_trial_range(config: &SimulationConfig, seed: u64, trials: Range<usize>) -> Result<AggregateStats> {
    let battle = config.battle_config();
    let outcomes: Vec<BattleOutcome> = trials
        .into_par_iter()
        .map(|index| {
            let mut rng = seeded(trial_seed(seed, index as u64));
            run_trial(config, battle, &mut rng)
        })
        .collect::<Result<_>>()?;

    let mut stats = AggregateStats::new();
    for outcome in &outcomes {
        stats.track(outcome);
    }
    Ok(stats)
}

/// Parallel run split into batches; `on_progress(done, total)` fires after each batch.
/// Produces the same stats as [run_battles_parallel] for the same seed. Every
/// batch runs on the same `pool`.
pub fn run_battles_with_progress<F>(
    config: &SimulationConfig,
    seed: u64,
    pool: &WorkerPool,
    mut on_progress: F,
) -> Result<AggregateStats>
where
    F: FnMut(usize, usize) + Send,
{
    let total = config.iterations;
    pool.install(move || {
        let mut stats = AggregateStats::new();
        on_progress(0, total);
        for (start, end) in batch_ranges(total, PROGRESS_BATCH_COUNT.min(total)) {
            stats.merge(run_trial_range(config, seed, start..end)?);
            on_progress(end, total);
        }
        Ok(stats)
    })
}

/// Entry point used by the CLI: resolves the seed and picks sequential or
/// parallel execution from the config.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationRun> {
    let seed = resolve_seed(config.seed);
    tracing::info!(
        iterations = config.iterations,
        seed,
        parallel = config.parallel,
        pc_strategy = %config.pc_strategy,
        npc_strategy = %config.npc_strategy,
        "starting battle simulation"
    );
    let stats = if config.parallel {
        let pool = WorkerPool::with_workers(config.workers);
        run_battles_with_progress(config, seed, &pool, |done, total| {
            tracing::debug!(done, total, "battle batch finished");
        })?
    } else {
        run_battles(config, seed)?
    };
    tracing::info!(trials = stats.total_trials(), "battle simulation finished");
    Ok(SimulationRun {
        seed,
        iterations: config.iterations,
        parallel: config.parallel,
        stats,
    })
}
