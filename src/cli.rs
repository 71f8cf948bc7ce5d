use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use crate::combat::{resolve_seed, seeded, Battle, TraceMode};
use crate::data::config::DEFAULT_CONFIG_PATH;
use crate::data::validate::{validate_matrix_file, validate_simulation_file};
use crate::data::{
    load_and_validate, load_matrix_config, validate_matrix_config, MatrixConfig,
    SimulationConfig, ValidationReport, ValidationSeverity,
};
use crate::error::Result;
use crate::simulation::{
    matrix_to_json, render_report, run_simulation, run_to_json, run_weapon_matrix,
    serialize_events_json, write_matrix_csv,
};

/// Dice-pool combat simulator
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Monte Carlo battles and weapon damage tables for dice-pool combat", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run repeated battles between the configured rosters
    Battle(BattleArgs),

    /// Tabulate average damage per attack across weapon profiles
    Matrix(MatrixArgs),

    /// Check a config file and list its diagnostics
    Validate(ValidateArgs),
}

#[derive(Args, Debug)]
pub struct BattleArgs {
    /// Battle config (.json, .yaml or .yml); defaults to config.json
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Battle config, as an alternative to the positional path
    #[arg(long = "config", value_name = "PATH", conflicts_with = "config")]
    pub config_flag: Option<PathBuf>,

    /// Override the number of trials
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Base seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads for parallel runs (0 = all cores)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Spread trials across worker threads
    #[arg(long)]
    pub parallel: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Run a single battle and print its event log as JSON
    #[arg(long, conflicts_with = "json")]
    pub trace: bool,
}

impl BattleArgs {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .or_else(|| self.config_flag.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }
}

#[derive(Args, Debug)]
pub struct MatrixArgs {
    /// Matrix config; built-in ranges are used when absent
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override attacks per cell
    #[arg(long)]
    pub iterations: Option<usize>,

    /// Base seed for reproducible tables
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write every cell to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the matrix as JSON instead of tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    pub config: PathBuf,

    /// Treat the file as a matrix config
    #[arg(long)]
    pub matrix: bool,
}

/// Parse `args` (program name first). Usage errors are printed here;
/// `Err` carries the exit code to use.
pub fn parse_command(args: &[String]) -> std::result::Result<Command, i32> {
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(cli.command),
        Err(err) => {
            let _ = err.print();
            Err(if err.use_stderr() { 2 } else { 0 })
        }
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Ok(Command::Battle(args)) => handle_battle(&args),
        Ok(Command::Matrix(args)) => handle_matrix(&args),
        Ok(Command::Validate(args)) => handle_validate(&args),
        Err(code) => code,
    }
}

fn handle_battle(args: &BattleArgs) -> i32 {
    let mut config = match load_and_validate(args.config_path()) {
        Ok((config, _)) => config,
        Err(err) => {
            eprintln!("invalid battle config: {err}");
            return 1;
        }
    };
    apply_battle_overrides(&mut config, args);

    let outcome = if args.trace {
        trace_battle(&config)
    } else {
        run_simulation(&config).and_then(|run| {
            if args.json {
                run_to_json(&run)
            } else {
                Ok(render_report(&run.stats))
            }
        })
    };

    match outcome {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("battle failed: {err}");
            1
        }
    }
}

fn apply_battle_overrides(config: &mut SimulationConfig, args: &BattleArgs) {
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if args.parallel {
        config.parallel = true;
    }
}

fn trace_battle(config: &SimulationConfig) -> Result<String> {
    let seed = resolve_seed(config.seed);
    tracing::info!(seed, "tracing a single battle");
    let mut battle_config = config.battle_config();
    battle_config.trace_mode = TraceMode::Events;
    let mut rng = seeded(seed);
    let outcome = Battle::new(config.players(), config.opponents(), battle_config).run(&mut rng)?;
    serialize_events_json(&outcome.events)
}

fn handle_matrix(args: &MatrixArgs) -> i32 {
    let mut config = match &args.config {
        Some(path) => match load_matrix_config(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("invalid matrix config: {err}");
                return 1;
            }
        },
        None => MatrixConfig::default(),
    };
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let report = validate_matrix_config(&config);
    print_diagnostics(&report);
    if report.has_errors() {
        eprintln!("invalid matrix config: {}", report.error_summary());
        return 1;
    }

    let matrix = match run_weapon_matrix(&config) {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("matrix failed: {err}");
            return 1;
        }
    };

    if let Some(path) = &args.csv {
        if let Err(err) = write_csv_file(path, &matrix) {
            eprintln!("failed to write '{}': {err}", path.display());
            return 1;
        }
    }

    if args.json {
        match matrix_to_json(&matrix) {
            Ok(payload) => println!("{payload}"),
            Err(err) => {
                eprintln!("failed to serialize matrix: {err}");
                return 1;
            }
        }
    } else {
        println!("{}", matrix.render());
    }
    0
}

fn write_csv_file(path: &Path, matrix: &crate::simulation::WeaponMatrix) -> Result<()> {
    let file = File::create(path)?;
    write_matrix_csv(matrix, file)
}

fn handle_validate(args: &ValidateArgs) -> i32 {
    let path = args.config.display();
    let report = if args.matrix {
        validate_matrix_file(&args.config)
    } else {
        validate_simulation_file(&args.config)
    };
    let report = match report {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    print_diagnostics(&report);
    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s) in {path}",
            report.count(ValidationSeverity::Error)
        );
        1
    } else {
        println!(
            "validation passed: {path} ({} warning(s))",
            report.count(ValidationSeverity::Warning)
        );
        0
    }
}

fn print_diagnostics(report: &ValidationReport) {
    for diag in &report.diagnostics {
        eprintln!("- {diag}");
    }
}
