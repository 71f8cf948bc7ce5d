//! Weapon-matrix analyzer: average damage per attack for every
//! `(quantity, die_size, defense, crushing)` profile, estimated by repeated
//! single attacks under the matrix rule. No combatants, no turn order.

use std::fmt::Write as _;

use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::combat::{matrix_die_damage, resolve_seed, seeded, trial_seed, DicePool, ResolutionRule};
use crate::data::MatrixConfig;
use crate::error::Result;
use crate::simulation::analytical::expected_matrix_attack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MatrixKey {
    pub die_size: u32,
    pub quantity: u32,
    pub defense: u32,
    pub crushing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixCell {
    pub die_size: u32,
    pub quantity: u32,
    pub defense: u32,
    pub crushing: bool,
    /// Monte Carlo mean damage per attack; `None` when no trials ran.
    pub mean_damage: Option<f64>,
    /// Closed-form expectation for the same profile.
    pub expected_damage: f64,
}

impl MatrixCell {
    pub fn key(&self) -> MatrixKey {
        MatrixKey {
            die_size: self.die_size,
            quantity: self.quantity,
            defense: self.defense,
            crushing: self.crushing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeaponMatrix {
    pub rule: ResolutionRule,
    pub iterations: usize,
    pub seed: u64,
    pub sizes: Vec<u32>,
    pub quantities: Vec<u32>,
    pub defenses: Vec<u32>,
    pub crushing: Vec<bool>,
    /// Ordered by crushing, defense, quantity, die size.
    pub cells: Vec<MatrixCell>,
}

/// Total damage over `iterations` single attacks, divided by `iterations`.
/// Zero iterations report no data.
pub fn simulate_attacks<R: Rng + ?Sized>(
    quantity: u32,
    die_size: u32,
    defense: u32,
    crushing: bool,
    iterations: usize,
    rng: &mut R,
) -> Result<Option<f64>> {
    if iterations == 0 {
        return Ok(None);
    }
    let pool = DicePool::new(quantity, die_size);
    if pool.is_empty() {
        return Ok(Some(0.0));
    }
    // Dice are resolved as they are rolled; the pool is never materialized.
    let mut total_damage = 0u64;
    for _ in 0..iterations {
        for _ in 0..quantity {
            let die = rng.gen_range(1..=die_size);
            total_damage += u64::from(matrix_die_damage(die, die_size, defense, crushing)?);
        }
    }
    Ok(Some(total_damage as f64 / iterations as f64))
}

fn matrix_keys(config: &MatrixConfig) -> Vec<MatrixKey> {
    let mut keys = Vec::with_capacity(config.cell_count());
    for &crushing in &config.crushing {
        for &defense in &config.defenses {
            for &quantity in &config.quantities {
                for &die_size in &config.sizes {
                    keys.push(MatrixKey {
                        die_size,
                        quantity,
                        defense,
                        crushing,
                    });
                }
            }
        }
    }
    keys
}

/// Runs every cell of the configured cross-product in parallel. Each cell owns
/// a stream derived from the base seed and its position, so output is
/// reproducible for a given seed.
pub fn run_weapon_matrix(config: &MatrixConfig) -> Result<WeaponMatrix> {
    let seed = resolve_seed(config.seed);
    tracing::info!(
        cells = config.cell_count(),
        iterations = config.iterations,
        seed,
        "starting weapon matrix"
    );
    let cells = matrix_keys(config)
        .into_par_iter()
        .enumerate()
        .map(|(index, key)| -> Result<MatrixCell> {
            let mut rng = seeded(trial_seed(seed, index as u64));
            let mean_damage = simulate_attacks(
                key.quantity,
                key.die_size,
                key.defense,
                key.crushing,
                config.iterations,
                &mut rng,
            )?;
            let expected_damage =
                expected_matrix_attack(key.quantity, key.die_size, key.defense, key.crushing)?;
            Ok(MatrixCell {
                die_size: key.die_size,
                quantity: key.quantity,
                defense: key.defense,
                crushing: key.crushing,
                mean_damage,
                expected_damage,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(WeaponMatrix {
        rule: ResolutionRule::Matrix,
        iterations: config.iterations,
        seed,
        sizes: config.sizes.clone(),
        quantities: config.quantities.clone(),
        defenses: config.defenses.clone(),
        crushing: config.crushing.clone(),
        cells,
    })
}

impl WeaponMatrix {
    pub fn cell(&self, key: MatrixKey) -> Option<&MatrixCell> {
        self.cells.iter().find(|cell| cell.key() == key)
    }

    pub fn mean_damage(&self, key: MatrixKey) -> Option<f64> {
        self.cell(key).and_then(|cell| cell.mean_damage)
    }

    /// One `(defense, crushing)` slice: rows by quantity, columns by die size.
    pub fn render_slice(&self, defense: u32, crushing: bool) -> String {
        let header = format!(
            "Qty | {}",
            self.sizes
                .iter()
                .map(|size| format!("d{size:<4}"))
                .collect::<Vec<_>>()
                .join(" | ")
        );
        let rule = "-".repeat(header.len());
        let mut out = String::new();
        let _ = writeln!(out, "\nTarget Defense: {defense}");
        let _ = writeln!(out, "{rule}\n{header}\n{rule}");
        for &quantity in &self.quantities {
            let row = self
                .sizes
                .iter()
                .map(|&die_size| {
                    let key = MatrixKey {
                        die_size,
                        quantity,
                        defense,
                        crushing,
                    };
                    match self.mean_damage(key) {
                        Some(mean) => format!("{mean:<5.2}"),
                        None => format!("{:<5}", "--"),
                    }
                })
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(out, "{quantity:<3} | {row}");
        }
        out
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for &crushing in &self.crushing {
            let banner = "=".repeat(60);
            let _ = writeln!(out, "\n{banner}");
            let _ = writeln!(
                out,
                "DAMAGE MATRIX (rule: {}, crushing: {crushing}, {} attacks per cell)",
                self.rule, self.iterations
            );
            let _ = write!(out, "{banner}");
            for &defense in &self.defenses {
                out.push_str(&self.render_slice(defense, crushing));
            }
        }
        out
    }
}
