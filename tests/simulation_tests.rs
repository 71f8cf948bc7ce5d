use skirmish::combat::{
    seeded, Battle, BattleConfig, BattleOutcome, Combatant, NamedDamage, Team, Weapon,
};
use skirmish::data::{CombatantTemplate, MatrixConfig, SimulationConfig};
use skirmish::parallel::{run_battle_batches, WorkerPool};
use skirmish::simulation::{
    expected_matrix_attack, expected_threshold_attack, render_report, run_battles,
    run_battles_parallel, run_weapon_matrix, simulate_attacks, AggregateStats, MatrixKey,
};

fn approx_eq(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() <= tol, "expected {b}, got {a}");
}

fn template(name: &str, hp: i64, defense: u32, spec: &str) -> CombatantTemplate {
    CombatantTemplate {
        name: name.to_string(),
        hp,
        defense,
        weapon_pool: spec.to_string(),
        tags: Vec::new(),
    }
}

fn outcome(winner: Team, rounds: u32, damage: &[(&str, u64)]) -> BattleOutcome {
    BattleOutcome {
        winner,
        rounds,
        damage_by_name: damage
            .iter()
            .map(|(name, damage)| NamedDamage {
                name: name.to_string(),
                damage: *damage,
            })
            .collect(),
        events: Vec::new(),
    }
}

#[test]
fn tracker_accumulates_wins_rounds_and_damage() {
    let mut stats = AggregateStats::new();
    stats.track(&outcome(Team::Players, 3, &[("Hero", 6), ("Goblin", 2)]));
    stats.track(&outcome(Team::Opponents, 5, &[("Hero", 1), ("Goblin", 9)]));
    stats.track(&outcome(Team::Players, 1, &[("Hero", 4), ("Goblin", 0)]));

    assert_eq!(stats.total_trials(), 3);
    assert_eq!(stats.wins().get(Team::Players), 2);
    assert_eq!(stats.wins().get(Team::Opponents), 1);
    assert_eq!(stats.round_counts(), &[3, 5, 1]);
    assert_eq!(stats.damage_total("Hero"), Some(11.0));
    assert_eq!(stats.damage_total("Goblin"), Some(11.0));

    let summary = stats.summary().expect("three trials tracked");
    approx_eq(summary.average_rounds, 3.0, 1e-12);
    assert_eq!(summary.min_rounds, 1);
    assert_eq!(summary.max_rounds, 5);
    // Equal totals keep first-seen order.
    assert_eq!(summary.damage[0].name, "Hero");
    assert_eq!(summary.damage[1].name, "Goblin");
    approx_eq(summary.damage[0].average, 11.0 / 3.0, 1e-12);
}

#[test]
fn empty_tracker_reports_no_data() {
    let stats = AggregateStats::new();
    assert!(stats.summary().is_none());
    assert_eq!(render_report(&stats), "No battles simulated.");
}

#[test]
fn ranking_is_descending_by_total() {
    let mut stats = AggregateStats::new();
    stats.track(&outcome(Team::Players, 2, &[("A", 1), ("B", 7), ("C", 3)]));
    let summary = stats.summary().expect("one trial tracked");
    let names: Vec<&str> = summary.damage.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["B", "C", "A"]);
}

#[test]
fn win_counts_always_sum_to_trials() {
    let config = SimulationConfig {
        iterations: 300,
        pcs: vec![template("Knight", 16, 4, "2d6"), template("Archer", 10, 3, "1d8")],
        npcs: vec![template("Troll", 25, 3, "1d12"), template("Imp", 5, 5, "3d4")],
        ..SimulationConfig::default()
    };
    let stats = run_battles(&config, 77).expect("run should succeed");
    assert_eq!(stats.wins().total(), 300);
    let summary = stats.summary().expect("trials ran");
    approx_eq(summary.player_win_rate + summary.opponent_win_rate, 1.0, 1e-9);
}

#[test]
fn parallel_runs_do_not_depend_on_worker_count() {
    let config = SimulationConfig {
        iterations: 120,
        pcs: vec![template("Knight", 16, 4, "2d6")],
        npcs: vec![template("Troll", 25, 3, "1d12")],
        ..SimulationConfig::default()
    };
    let one = run_battle_batches(&config, 10, &WorkerPool::with_workers(1)).expect("run ok");
    let four = run_battle_batches(&config, 10, &WorkerPool::with_workers(4)).expect("run ok");
    let global = run_battles_parallel(&config, 10).expect("run ok");
    assert_eq!(one.summary(), four.summary());
    assert_eq!(one.summary(), global.summary());
}

#[test]
fn matrix_cell_matches_closed_form() {
    let mut rng = seeded(11);
    for (quantity, size, defense, crushing) in [(2, 6, 4, true), (3, 8, 5, false), (1, 12, 3, true)] {
        let mean = simulate_attacks(quantity, size, defense, crushing, 10_000, &mut rng)
            .expect("valid profile")
            .expect("trials ran");
        let expected =
            expected_matrix_attack(quantity, size, defense, crushing).expect("valid profile");
        approx_eq(mean, expected, 0.1);
    }
}

#[test]
fn default_matrix_is_reproducible_for_a_seed() {
    let config = MatrixConfig {
        iterations: 200,
        seed: Some(5),
        ..MatrixConfig::default()
    };
    let matrix = run_weapon_matrix(&config).expect("matrix should run");
    assert_eq!(matrix.cells.len(), 5 * 10 * 8 * 2);
    let key = MatrixKey {
        die_size: 6,
        quantity: 2,
        defense: 4,
        crushing: true,
    };
    let cell = matrix.cell(key).expect("cell should exist");
    approx_eq(cell.expected_damage, 1.0, 1e-12);
    let again = run_weapon_matrix(&config).expect("matrix should run");
    assert_eq!(matrix.mean_damage(key), again.mean_damage(key));
}

#[test]
fn battle_attacks_match_expected_threshold_output() {
    let weapon = Weapon::from_spec("3d6", ["crushing"]);
    let expected = expected_threshold_attack(&weapon, 2).expect("valid profile");

    let attacker = Combatant::new("Brute", Team::Players, 10, 30, weapon.clone());
    let dummy = Combatant::new("Dummy", Team::Opponents, 1_000_000, 2, Weapon::default());
    let mut battle = Battle::new(vec![attacker], vec![dummy], BattleConfig::default());
    let mut rng = seeded(3);
    let attacks = 20_000;
    let mut dealt = 0u64;
    for _ in 0..attacks {
        let rolls = weapon.roll(&mut rng);
        dealt += u64::from(battle.resolve_attack(0, 1, &rolls).expect("valid attack"));
    }
    approx_eq(dealt as f64 / attacks as f64, expected, 0.05);
    assert_eq!(battle.combatants()[0].current_battle_damage, dealt);
}
