//! CSV and JSON export of simulation results.

use std::io::Write;

use serde::Serialize;

use crate::combat::CombatEvent;
use crate::error::Result;
use crate::simulation::matrix::WeaponMatrix;
use crate::simulation::monte_carlo::SimulationRun;
use crate::simulation::stats::StatsSummary;

/// One CSV row per matrix cell, with the rule that produced it.
#[derive(Debug, Serialize)]
struct MatrixRow<'a> {
    rule: &'a str,
    die_size: u32,
    quantity: u32,
    defense: u32,
    crushing: bool,
    mean_damage: Option<f64>,
    expected_damage: f64,
    iterations: usize,
}

pub fn write_matrix_csv<W: Write>(matrix: &WeaponMatrix, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for cell in &matrix.cells {
        csv.serialize(MatrixRow {
            rule: matrix.rule.as_str(),
            die_size: cell.die_size,
            quantity: cell.quantity,
            defense: cell.defense,
            crushing: cell.crushing,
            mean_damage: cell.mean_damage,
            expected_damage: cell.expected_damage,
            iterations: matrix.iterations,
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct RunReport<'a> {
    seed: u64,
    iterations: usize,
    parallel: bool,
    summary: Option<StatsSummary>,
    round_counts: &'a [u32],
}

/// JSON document with the run parameters and its summary (null when no data).
pub fn run_to_json(run: &SimulationRun) -> Result<String> {
    let report = RunReport {
        seed: run.seed,
        iterations: run.iterations,
        parallel: run.parallel,
        summary: run.stats.summary(),
        round_counts: run.stats.round_counts(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn matrix_to_json(matrix: &WeaponMatrix) -> Result<String> {
    Ok(serde_json::to_string_pretty(matrix)?)
}

pub fn serialize_events_json(events: &[CombatEvent]) -> Result<String> {
    Ok(serde_json::to_string_pretty(events)?)
}
