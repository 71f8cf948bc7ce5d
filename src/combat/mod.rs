pub mod combatant;
pub mod dice;
pub mod engine;
pub mod resolution;
pub mod rng;
pub mod targeting;

pub use combatant::{Combatant, Team};
pub use dice::{DicePool, Weapon, CRUSHING_TAG};
pub use engine::{
    simulate_battle, AttackEvent, Battle, BattleConfig, BattleOutcome, BattleState, CombatEvent,
    NamedDamage, TraceMode, DEFAULT_MAX_ROUNDS,
};
pub use resolution::{
    matrix_damage, matrix_die_damage, threshold_damage, threshold_die_damage, ResolutionRule,
};
pub use rng::{entropy_seed, resolve_seed, seeded, trial_seed, SimRng};
pub use targeting::TargetStrategy;
