pub mod analytical;
pub mod export;
pub mod matrix;
pub mod monte_carlo;
pub mod stats;

pub use analytical::{
    expected_matrix_attack, expected_matrix_die_damage, expected_threshold_attack,
    expected_threshold_die_damage, threshold_hit_chance,
};
pub use export::{matrix_to_json, run_to_json, serialize_events_json, write_matrix_csv};
pub use matrix::{run_weapon_matrix, simulate_attacks, MatrixCell, MatrixKey, WeaponMatrix};
pub use monte_carlo::{
    run_battles, run_battles_parallel, run_battles_with_progress, run_simulation, SimulationRun,
};
pub use stats::{render_report, AggregateStats, DamageRanking, DamageTotal, StatsSummary, TeamWins};
