//! Simulation configuration: rosters, strategies, iteration counts.

use serde::{Deserialize, Serialize};

use crate::combat::{
    BattleConfig, Combatant, DicePool, Team, TargetStrategy, TraceMode, Weapon, DEFAULT_MAX_ROUNDS,
};

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_BATTLE_ITERATIONS: usize = 100;
pub const DEFAULT_MATRIX_ITERATIONS: usize = 10_000;

/// One roster entry, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantTemplate {
    pub name: String,
    pub hp: i64,
    #[serde(default)]
    pub defense: u32,
    #[serde(alias = "weapon")]
    pub weapon_pool: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CombatantTemplate {
    pub fn pool(&self) -> DicePool {
        DicePool::parse(&self.weapon_pool)
    }

    pub fn weapon(&self) -> Weapon {
        Weapon::new(self.pool(), self.tags.iter().cloned())
    }

    pub fn to_combatant(&self, team: Team) -> Combatant {
        Combatant::new(self.name.clone(), team, self.hp, self.defense, self.weapon())
    }
}

/// Fresh combatants for one trial.
pub fn build_roster(templates: &[CombatantTemplate], team: Team) -> Vec<Combatant> {
    templates.iter().map(|t| t.to_combatant(team)).collect()
}

fn default_iterations() -> usize {
    DEFAULT_BATTLE_ITERATIONS
}

fn default_max_rounds() -> u32 {
    DEFAULT_MAX_ROUNDS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub pc_strategy: TargetStrategy,
    #[serde(default)]
    pub npc_strategy: TargetStrategy,
    #[serde(default)]
    pub pcs: Vec<CombatantTemplate>,
    #[serde(default)]
    pub npcs: Vec<CombatantTemplate>,
    /// Base seed. Absent means a fresh seed from OS entropy per run.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Run trials across a rayon pool instead of one sequential stream.
    #[serde(default)]
    pub parallel: bool,
    /// Worker threads for parallel runs; 0 uses every core.
    #[serde(default)]
    pub workers: usize,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Reject weapon specs with text after `<quantity>d<size>`.
    #[serde(default)]
    pub strict_weapon_specs: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_BATTLE_ITERATIONS,
            pc_strategy: TargetStrategy::RandomAttack,
            npc_strategy: TargetStrategy::RandomAttack,
            pcs: Vec::new(),
            npcs: Vec::new(),
            seed: None,
            parallel: false,
            workers: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            strict_weapon_specs: false,
        }
    }
}

impl SimulationConfig {
    pub fn battle_config(&self) -> BattleConfig {
        BattleConfig {
            pc_strategy: self.pc_strategy,
            npc_strategy: self.npc_strategy,
            max_rounds: self.max_rounds,
            trace_mode: TraceMode::Off,
        }
    }

    pub fn players(&self) -> Vec<Combatant> {
        build_roster(&self.pcs, Team::Players)
    }

    pub fn opponents(&self) -> Vec<Combatant> {
        build_roster(&self.npcs, Team::Opponents)
    }

    pub fn roster(&self, team: Team) -> &[CombatantTemplate] {
        match team {
            Team::Players => &self.pcs,
            Team::Opponents => &self.npcs,
        }
    }
}

fn default_sizes() -> Vec<u32> {
    vec![4, 6, 8, 10, 12]
}

fn default_quantities() -> Vec<u32> {
    (1..=10).collect()
}

fn default_defenses() -> Vec<u32> {
    (3..=10).collect()
}

fn default_crushing() -> Vec<bool> {
    vec![false, true]
}

fn default_matrix_iterations() -> usize {
    DEFAULT_MATRIX_ITERATIONS
}

/// Cross-product swept by the weapon-matrix analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixConfig {
    #[serde(default = "default_sizes")]
    pub sizes: Vec<u32>,
    #[serde(default = "default_quantities")]
    pub quantities: Vec<u32>,
    #[serde(default = "default_defenses")]
    pub defenses: Vec<u32>,
    #[serde(default = "default_crushing")]
    pub crushing: Vec<bool>,
    #[serde(default = "default_matrix_iterations")]
    pub iterations: usize,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            sizes: default_sizes(),
            quantities: default_quantities(),
            defenses: default_defenses(),
            crushing: default_crushing(),
            iterations: DEFAULT_MATRIX_ITERATIONS,
            seed: None,
        }
    }
}

impl MatrixConfig {
    pub fn cell_count(&self) -> usize {
        self.sizes.len() * self.quantities.len() * self.defenses.len() * self.crushing.len()
    }
}
