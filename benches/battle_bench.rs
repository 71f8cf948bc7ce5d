//! Battle throughput: single trials and sequential vs parallel Monte Carlo runs.
//!
//! Run with: `cargo bench --bench battle`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use skirmish::combat::{seeded, simulate_battle, BattleConfig, Combatant, Team, Weapon};
use skirmish::data::{CombatantTemplate, SimulationConfig};
use skirmish::simulation::{run_battles, run_battles_parallel};

fn template(name: &str, hp: i64, defense: u32, spec: &str) -> CombatantTemplate {
    CombatantTemplate {
        name: name.to_string(),
        hp,
        defense,
        weapon_pool: spec.to_string(),
        tags: Vec::new(),
    }
}

fn party_config(iterations: usize) -> SimulationConfig {
    SimulationConfig {
        iterations,
        pcs: vec![
            template("Knight", 24, 5, "2d8"),
            template("Archer", 14, 3, "1d10"),
            template("Cleric", 18, 4, "1d6"),
        ],
        npcs: vec![
            template("Troll", 30, 3, "1d12"),
            template("Goblin", 8, 3, "1d6"),
            template("Goblin Archer", 7, 2, "1d8"),
        ],
        ..SimulationConfig::default()
    }
}

fn bench_single_battle(c: &mut Criterion) {
    let mut group = c.benchmark_group("battle");
    group.sample_size(100);
    group.throughput(Throughput::Elements(1));

    let d6 = Weapon::from_spec("1d6", Vec::<String>::new());
    let duel_pc = vec![Combatant::new("Hero", Team::Players, 20, 5, d6.clone())];
    let duel_npc = vec![Combatant::new("Goblin", Team::Opponents, 10, 3, d6)];
    group.bench_function("duel", |b| {
        let mut rng = seeded(7);
        b.iter_batched(
            || (duel_pc.clone(), duel_npc.clone()),
            |(pcs, npcs)| black_box(simulate_battle(&pcs, &npcs, BattleConfig::default(), &mut rng)),
            BatchSize::SmallInput,
        );
    });

    let config = party_config(1);
    let (pcs, npcs) = (config.players(), config.opponents());
    group.bench_function("three_vs_three", |b| {
        let mut rng = seeded(7);
        b.iter(|| black_box(simulate_battle(&pcs, &npcs, config.battle_config(), &mut rng)));
    });

    group.finish();
}

fn bench_monte_carlo_sequential_vs_parallel(c: &mut Criterion) {
    let config = party_config(2_000);
    let seed = 42u64;

    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));
    group.throughput(Throughput::Elements(config.iterations as u64));

    group.bench_function("sequential", |b| {
        b.iter(|| black_box(run_battles(&config, seed)));
    });

    group.bench_function("parallel", |b| {
        b.iter(|| black_box(run_battles_parallel(&config, seed)));
    });

    group.finish();
}

criterion_group!(benches, bench_single_battle, bench_monte_carlo_sequential_vs_parallel);
criterion_main!(benches);
