//! Battle trial engine: runs one battle between two rosters to completion.
//!
//! Every round the living combatants act once in a freshly shuffled order. Each
//! attack rolls the attacker's pool and resolves it with the threshold rule
//! against the chosen target's defense. The battle concludes at the top of a
//! round once a team has no living member.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::combat::combatant::{Combatant, Team};
use crate::combat::resolution::threshold_damage;
use crate::combat::targeting::TargetStrategy;
use crate::error::{Result, SimError};

/// Default runaway guard for a single battle.
pub const DEFAULT_MAX_ROUNDS: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TraceMode {
    #[default]
    Off,
    Events,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BattleConfig {
    pub pc_strategy: TargetStrategy,
    pub npc_strategy: TargetStrategy,
    /// A battle still running after this many rounds fails. 0 disables the guard.
    pub max_rounds: u32,
    pub trace_mode: TraceMode,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            pc_strategy: TargetStrategy::RandomAttack,
            npc_strategy: TargetStrategy::RandomAttack,
            max_rounds: DEFAULT_MAX_ROUNDS,
            trace_mode: TraceMode::Off,
        }
    }
}

impl BattleConfig {
    pub fn strategy_for(&self, team: Team) -> TargetStrategy {
        match team {
            Team::Players => self.pc_strategy,
            Team::Opponents => self.npc_strategy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BattleState {
    InProgress,
    Concluded { winner: Team },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackEvent {
    pub round: u32,
    pub attacker: String,
    pub target: String,
    pub crushing: bool,
    pub rolls: Vec<u32>,
    pub defense: u32,
    pub damage: u32,
    pub target_hp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    RoundStarted { round: u32 },
    Attack(AttackEvent),
    TurnSkipped { round: u32, attacker: String },
    BattleConcluded { rounds: u32, winner: Team },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedDamage {
    pub name: String,
    pub damage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BattleOutcome {
    pub winner: Team,
    pub rounds: u32,
    /// Damage dealt this trial, in roster order (players first).
    pub damage_by_name: Vec<NamedDamage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<CombatEvent>,
}

impl BattleOutcome {
    pub fn damage_of(&self, name: &str) -> Option<u64> {
        self.damage_by_name
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.damage)
    }
}

#[derive(Debug, Clone)]
pub struct Battle {
    combatants: Vec<Combatant>,
    config: BattleConfig,
    round: u32,
    state: BattleState,
    events: Vec<CombatEvent>,
}

impl Battle {
    /// Builds a battle from the two rosters, resetting every combatant. Team
    /// tags are taken from the roster each combatant arrives in.
    pub fn new(players: Vec<Combatant>, opponents: Vec<Combatant>, config: BattleConfig) -> Self {
        let combatants = players
            .into_iter()
            .map(|c| (c, Team::Players))
            .chain(opponents.into_iter().map(|c| (c, Team::Opponents)))
            .map(|(mut c, team)| {
                c.team = team;
                c.reset();
                c
            })
            .collect();
        let mut battle = Self {
            combatants,
            config,
            round: 0,
            state: BattleState::InProgress,
            events: Vec::new(),
        };
        battle.refresh_state();
        battle
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.combatants.iter().position(|c| c.name == name)
    }

    pub fn team_alive(&self, team: Team) -> bool {
        self.combatants
            .iter()
            .any(|c| c.team == team && c.is_alive())
    }

    /// Team with a living member. Players win only when at least one of them
    /// stands, so a double elimination goes to the opponents.
    pub fn winner(&self) -> Team {
        if self.team_alive(Team::Players) {
            Team::Players
        } else {
            Team::Opponents
        }
    }

    fn both_teams_alive(&self) -> bool {
        self.team_alive(Team::Players) && self.team_alive(Team::Opponents)
    }

    fn refresh_state(&mut self) {
        if self.state == BattleState::InProgress && !self.both_teams_alive() {
            let winner = self.winner();
            self.state = BattleState::Concluded { winner };
            if self.config.trace_mode == TraceMode::Events {
                self.events.push(CombatEvent::BattleConcluded {
                    rounds: self.round,
                    winner,
                });
            }
        }
    }

    fn living_members(&self, team: Team) -> Vec<usize> {
        self.combatants
            .iter()
            .enumerate()
            .filter(|(_, c)| c.team == team && c.is_alive())
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Applies one attack with already-rolled dice. Returns the damage dealt.
    pub fn resolve_attack(&mut self, attacker: usize, target: usize, rolls: &[u32]) -> Result<u32> {
        let defense = self.combatants[target].defense;
        let damage = threshold_damage(rolls, defense, &self.combatants[attacker].weapon)?;
        let dealt = self.combatants[target].take_damage(damage);
        self.combatants[attacker].record_damage_dealt(dealt);

        let (attacker_ref, target_ref) = (&self.combatants[attacker], &self.combatants[target]);
        tracing::trace!(
            round = self.round,
            attacker = %attacker_ref.name,
            target = %target_ref.name,
            ?rolls,
            defense,
            damage = dealt,
            target_hp = target_ref.hp,
            "attack resolved"
        );
        if self.config.trace_mode == TraceMode::Events {
            self.events.push(CombatEvent::Attack(AttackEvent {
                round: self.round,
                attacker: attacker_ref.name.clone(),
                target: target_ref.name.clone(),
                crushing: attacker_ref.weapon.is_crushing(),
                rolls: rolls.to_vec(),
                defense,
                damage: dealt,
                target_hp: target_ref.hp,
            }));
        }
        Ok(dealt)
    }

    /// Plays one full round, or concludes the battle if a team is already out.
    pub fn play_round<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<BattleState> {
        self.refresh_state();
        if self.state != BattleState::InProgress {
            return Ok(self.state);
        }
        if self.config.max_rounds > 0 && self.round >= self.config.max_rounds {
            return Err(SimError::InvalidConfiguration(format!(
                "battle still undecided after {} rounds",
                self.config.max_rounds
            )));
        }

        self.round += 1;
        if self.config.trace_mode == TraceMode::Events {
            self.events.push(CombatEvent::RoundStarted { round: self.round });
        }

        let mut order: Vec<usize> = (0..self.combatants.len())
            .filter(|&idx| self.combatants[idx].is_alive())
            .collect();
        order.shuffle(rng);

        for attacker in order {
            if !self.combatants[attacker].is_alive() {
                continue;
            }
            if !self.both_teams_alive() {
                break;
            }

            let team = self.combatants[attacker].team;
            let opponents = self.living_members(team.opposing());
            let strategy = self.config.strategy_for(team);
            let target = match strategy.select_target(&self.combatants, &opponents, rng) {
                Ok(target) => target,
                Err(SimError::NoValidTarget) => {
                    if self.config.trace_mode == TraceMode::Events {
                        self.events.push(CombatEvent::TurnSkipped {
                            round: self.round,
                            attacker: self.combatants[attacker].name.clone(),
                        });
                    }
                    continue;
                }
                Err(err) => return Err(err),
            };

            let rolls = self.combatants[attacker].roll_attack(rng);
            self.resolve_attack(attacker, target, &rolls)?;
        }

        self.refresh_state();
        Ok(self.state)
    }

    /// Plays rounds until a team is eliminated.
    pub fn run<R: Rng + ?Sized>(mut self, rng: &mut R) -> Result<BattleOutcome> {
        while self.play_round(rng)? == BattleState::InProgress {}
        Ok(self.into_outcome())
    }

    /// Snapshot of the trial's result. Valid at any point; callers normally
    /// take it once the battle has concluded.
    pub fn into_outcome(self) -> BattleOutcome {
        let winner = self.winner();
        let mut damage_by_name: Vec<NamedDamage> = Vec::with_capacity(self.combatants.len());
        for combatant in &self.combatants {
            match damage_by_name.iter_mut().find(|e| e.name == combatant.name) {
                Some(entry) => entry.damage += combatant.current_battle_damage,
                None => damage_by_name.push(NamedDamage {
                    name: combatant.name.clone(),
                    damage: combatant.current_battle_damage,
                }),
            }
        }
        tracing::debug!(winner = %winner, rounds = self.round, "battle concluded");
        BattleOutcome {
            winner,
            rounds: self.round,
            damage_by_name,
            events: self.events,
        }
    }
}

/// Runs one trial on fresh copies of the roster templates.
pub fn simulate_battle<R: Rng + ?Sized>(
    players: &[Combatant],
    opponents: &[Combatant],
    config: BattleConfig,
    rng: &mut R,
) -> Result<BattleOutcome> {
    Battle::new(players.to_vec(), opponents.to_vec(), config).run(rng)
}
