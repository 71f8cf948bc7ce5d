//! Aggregate statistics over many battle trials.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::combat::{BattleOutcome, ResolutionRule, Team};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageTotal {
    pub name: String,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamWins {
    pub players: usize,
    pub opponents: usize,
}

impl TeamWins {
    pub fn get(&self, team: Team) -> usize {
        match team {
            Team::Players => self.players,
            Team::Opponents => self.opponents,
        }
    }

    fn increment(&mut self, team: Team) {
        match team {
            Team::Players => self.players += 1,
            Team::Opponents => self.opponents += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.players + self.opponents
    }
}

/// Grows monotonically as trials are tracked. Each [AggregateStats::track]
/// call folds one complete outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    total_trials: usize,
    wins: TeamWins,
    /// Insertion order is first appearance, which keeps ranking ties stable.
    damage_totals: Vec<DamageTotal>,
    #[serde(skip)]
    damage_index: HashMap<String, usize>,
    round_counts: Vec<u32>,
}

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, outcome: &BattleOutcome) {
        self.total_trials += 1;
        self.wins.increment(outcome.winner);
        for entry in &outcome.damage_by_name {
            self.add_damage(&entry.name, entry.damage as f64);
        }
        self.round_counts.push(outcome.rounds);
    }

    fn add_damage(&mut self, name: &str, amount: f64) {
        match self.damage_index.get(name) {
            Some(&idx) => self.damage_totals[idx].total += amount,
            None => {
                self.damage_index
                    .insert(name.to_string(), self.damage_totals.len());
                self.damage_totals.push(DamageTotal {
                    name: name.to_string(),
                    total: amount,
                });
            }
        }
    }

    /// Folds stats tracked elsewhere (e.g. another worker) into this one.
    pub fn merge(&mut self, other: AggregateStats) {
        self.total_trials += other.total_trials;
        self.wins.players += other.wins.players;
        self.wins.opponents += other.wins.opponents;
        for entry in other.damage_totals {
            self.add_damage(&entry.name, entry.total);
        }
        self.round_counts.extend(other.round_counts);
    }

    pub fn total_trials(&self) -> usize {
        self.total_trials
    }

    pub fn wins(&self) -> TeamWins {
        self.wins
    }

    pub fn damage_totals(&self) -> &[DamageTotal] {
        &self.damage_totals
    }

    pub fn damage_total(&self, name: &str) -> Option<f64> {
        self.damage_index
            .get(name)
            .map(|&idx| self.damage_totals[idx].total)
    }

    pub fn round_counts(&self) -> &[u32] {
        &self.round_counts
    }

    /// Reduced statistics, or `None` when no trial has been tracked.
    pub fn summary(&self) -> Option<StatsSummary> {
        if self.total_trials == 0 {
            return None;
        }
        let trials = self.total_trials as f64;
        let round_sum: u64 = self.round_counts.iter().map(|&r| u64::from(r)).sum();

        let mut damage: Vec<DamageRanking> = self
            .damage_totals
            .iter()
            .map(|entry| DamageRanking {
                name: entry.name.clone(),
                total: entry.total,
                average: entry.total / trials,
            })
            .collect();
        damage.sort_by(|left, right| right.total.total_cmp(&left.total));

        Some(StatsSummary {
            rule: ResolutionRule::Threshold,
            total_trials: self.total_trials,
            wins: self.wins,
            player_win_rate: self.wins.players as f64 / trials,
            opponent_win_rate: self.wins.opponents as f64 / trials,
            average_rounds: round_sum as f64 / trials,
            min_rounds: self.round_counts.iter().copied().min().unwrap_or(0),
            max_rounds: self.round_counts.iter().copied().max().unwrap_or(0),
            damage,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageRanking {
    pub name: String,
    pub total: f64,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsSummary {
    pub rule: ResolutionRule,
    pub total_trials: usize,
    pub wins: TeamWins,
    pub player_win_rate: f64,
    pub opponent_win_rate: f64,
    pub average_rounds: f64,
    pub min_rounds: u32,
    pub max_rounds: u32,
    /// Descending by total damage; ties keep roster order.
    pub damage: Vec<DamageRanking>,
}

impl StatsSummary {
    pub fn win_rate(&self, team: Team) -> f64 {
        match team {
            Team::Players => self.player_win_rate,
            Team::Opponents => self.opponent_win_rate,
        }
    }
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== SIMULATION RESULTS ===")?;
        writeln!(f, "Resolution rule: {}", self.rule)?;
        writeln!(f, "Total Battles: {}", self.total_trials)?;
        for team in Team::ALL {
            writeln!(
                f,
                "{} Wins: {} ({:.1}%)",
                team.label().trim_end_matches('s'),
                self.wins.get(team),
                self.win_rate(team) * 100.0
            )?;
        }
        writeln!(
            f,
            "Avg Rounds per Battle: {:.1} (min {}, max {})",
            self.average_rounds, self.min_rounds, self.max_rounds
        )?;
        writeln!(f)?;
        write!(f, "Total Damage Distribution:")?;
        for entry in &self.damage {
            write!(
                f,
                "\n  - {:15}: {:8.0} total (avg {:6.1} per battle)",
                entry.name, entry.total, entry.average
            )?;
        }
        Ok(())
    }
}

/// Plain-text report, or the no-data notice when nothing was tracked.
pub fn render_report(stats: &AggregateStats) -> String {
    match stats.summary() {
        Some(summary) => summary.to_string(),
        None => "No battles simulated.".to_string(),
    }
}
