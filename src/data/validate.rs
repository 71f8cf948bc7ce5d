//! Roster-load validation. Produces a diagnostic report instead of failing on
//! the first problem so every issue in a config surfaces at once.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::combat::{DicePool, Team, CRUSHING_TAG};
use crate::data::config::{CombatantTemplate, MatrixConfig, SimulationConfig};
use crate::data::loader::{load_matrix_config, load_simulation_config};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }

    /// Error diagnostics joined on one line, for error messages.
    pub fn error_summary(&self) -> String {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
            .map(|diag| format!("{}: {}", diag.context, diag.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn roster_key(team: Team) -> &'static str {
    match team {
        Team::Players => "pcs",
        Team::Opponents => "npcs",
    }
}

pub fn validate_simulation_config(config: &SimulationConfig) -> ValidationReport {
    let mut report = ValidationReport::default();

    if config.iterations == 0 {
        report.push(
            ValidationSeverity::Warning,
            "iterations",
            "zero iterations requested; the run will report no data",
        );
    }

    let mut seen_names = HashSet::new();
    for team in Team::ALL {
        let roster = config.roster(team);
        let key = roster_key(team);
        if roster.is_empty() {
            report.push(ValidationSeverity::Error, key, "roster is empty");
            continue;
        }
        for (index, template) in roster.iter().enumerate() {
            let context = format!("{key}[{index}] '{}'", template.name);
            if !seen_names.insert(template.name.clone()) {
                report.push(
                    ValidationSeverity::Warning,
                    context.clone(),
                    "duplicate name; damage for both entries is reported under one name",
                );
            }
            validate_template(&mut report, &context, template, config.strict_weapon_specs);
            validate_crushing_targets(&mut report, &context, template, config.roster(team.opposing()));
        }
    }

    if !config.pcs.is_empty() && !config.npcs.is_empty() {
        validate_termination(&mut report, config);
    }

    report
}

fn validate_template(
    report: &mut ValidationReport,
    context: &str,
    template: &CombatantTemplate,
    strict: bool,
) {
    if template.hp <= 0 {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.hp"),
            format!("hp must be positive, got {}", template.hp),
        );
    }

    let spec = template.weapon_pool.as_str();
    let weapon_context = format!("{context}.weapon_pool");
    match DicePool::trailing_text(spec) {
        None => report.push(
            ValidationSeverity::Warning,
            weapon_context.clone(),
            format!("'{spec}' does not match <quantity>d<size>; combatant deals no damage"),
        ),
        Some("") => {}
        Some(rest) => {
            let severity = if strict {
                ValidationSeverity::Error
            } else {
                ValidationSeverity::Warning
            };
            report.push(
                severity,
                weapon_context.clone(),
                format!("'{spec}' has trailing text '{rest}' that is ignored"),
            );
        }
    }
    let pool = template.pool();
    if pool.is_empty() && DicePool::trailing_text(spec).is_some() {
        report.push(
            ValidationSeverity::Warning,
            weapon_context,
            format!("'{spec}' rolls no dice; combatant deals no damage"),
        );
    }

    for tag in &template.tags {
        if tag != CRUSHING_TAG {
            report.push(
                ValidationSeverity::Info,
                format!("{context}.tags"),
                format!("tag '{tag}' has no effect on damage resolution"),
            );
        }
    }
}

/// Crushing against defense 0 fails when resolved, not here; flag it early.
fn validate_crushing_targets(
    report: &mut ValidationReport,
    context: &str,
    template: &CombatantTemplate,
    opponents: &[CombatantTemplate],
) {
    if !template.tags.iter().any(|tag| tag == CRUSHING_TAG) {
        return;
    }
    for opponent in opponents.iter().filter(|o| o.defense == 0) {
        report.push(
            ValidationSeverity::Warning,
            format!("{context}.tags"),
            format!(
                "crushing weapon against '{}' with defense 0 will abort the trial on a hit",
                opponent.name
            ),
        );
    }
}

/// Members of `team` that no weapon on the other side can hit. They never die.
pub fn immortal_members<'a>(
    team: &'a [CombatantTemplate],
    opponents: &[CombatantTemplate],
) -> Vec<&'a CombatantTemplate> {
    team.iter()
        .filter(|member| {
            !opponents
                .iter()
                .any(|attacker| attacker.weapon().can_threshold_hit(member.defense))
        })
        .collect()
}

/// Every member of `team` can be hit by at least one weapon on the other side.
pub fn team_is_eliminable(team: &[CombatantTemplate], opponents: &[CombatantTemplate]) -> bool {
    immortal_members(team, opponents).is_empty()
}

/// A team with immortal members can only win by eliminating the other side,
/// and once its mortal members fall only the immortals are left to do it.
fn validate_termination(report: &mut ValidationReport, config: &SimulationConfig) {
    let players_immortal = immortal_members(&config.pcs, &config.npcs);
    let opponents_immortal = immortal_members(&config.npcs, &config.pcs);
    if !players_immortal.is_empty() && !opponents_immortal.is_empty() {
        report.push(
            ValidationSeverity::Error,
            "rosters",
            "neither team can be eliminated: each has a member no opposing weapon can hit",
        );
        return;
    }

    for (team, immortals) in [
        (Team::Players, players_immortal),
        (Team::Opponents, opponents_immortal),
    ] {
        if immortals.is_empty() {
            continue;
        }
        let unreachable: Vec<&str> = config
            .roster(team.opposing())
            .iter()
            .filter(|target| {
                !immortals
                    .iter()
                    .any(|member| member.weapon().can_threshold_hit(target.defense))
            })
            .map(|target| target.name.as_str())
            .collect();
        if !unreachable.is_empty() {
            let names: Vec<&str> = immortals.iter().map(|m| m.name.as_str()).collect();
            report.push(
                ValidationSeverity::Error,
                roster_key(team),
                format!(
                    "{} cannot be hit, but cannot hit {} either; the battle stalls once the rest of the team falls",
                    names.join(", "),
                    unreachable.join(", ")
                ),
            );
        }
    }
}

/// Pools larger than this make matrix cells slow to simulate.
pub const MAX_MATRIX_QUANTITY: u32 = 1_000;

pub fn validate_matrix_config(config: &MatrixConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    if config.iterations == 0 {
        report.push(
            ValidationSeverity::Warning,
            "iterations",
            "zero iterations requested; every cell will report no data",
        );
    }
    for (key, values) in [
        ("sizes", &config.sizes),
        ("quantities", &config.quantities),
        ("defenses", &config.defenses),
    ] {
        if values.is_empty() {
            report.push(ValidationSeverity::Error, key, "must list at least one value");
        }
    }
    if config.crushing.is_empty() {
        report.push(ValidationSeverity::Error, "crushing", "must list at least one value");
    }
    if config.sizes.contains(&0) {
        report.push(ValidationSeverity::Error, "sizes", "die size 0 has no faces");
    }
    if config.quantities.contains(&0) {
        report.push(
            ValidationSeverity::Warning,
            "quantities",
            "quantity 0 rolls no dice; its cells are always 0",
        );
    }
    if let Some(&largest) = config.quantities.iter().max() {
        if largest > MAX_MATRIX_QUANTITY {
            report.push(
                ValidationSeverity::Warning,
                "quantities",
                format!(
                    "quantity {largest} rolls more than {MAX_MATRIX_QUANTITY} dice per attack; cells will be slow"
                ),
            );
        }
    }
    if config.defenses.contains(&0) && config.crushing.contains(&true) {
        report.push(
            ValidationSeverity::Error,
            "defenses",
            "defense 0 cannot be combined with crushing",
        );
    }
    report
}

/// Validate a battle config file on disk.
pub fn validate_simulation_file(path: impl AsRef<Path>) -> Result<ValidationReport> {
    Ok(validate_simulation_config(&load_simulation_config(path)?))
}

/// Validate a matrix config file on disk.
pub fn validate_matrix_file(path: impl AsRef<Path>) -> Result<ValidationReport> {
    Ok(validate_matrix_config(&load_matrix_config(path)?))
}
