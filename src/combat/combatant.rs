use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::dice::Weapon;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    /// Player characters.
    Players,
    /// Non-player characters.
    Opponents,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Players, Team::Opponents];

    pub fn opposing(self) -> Team {
        match self {
            Self::Players => Self::Opponents,
            Self::Opponents => Self::Players,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Players => "PCs",
            Self::Opponents => "NPCs",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One participant in a battle. Player and opponent sides share this type and
/// differ only by [Team].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combatant {
    pub name: String,
    pub team: Team,
    pub max_hp: i64,
    /// May drop below zero; liveness is `hp > 0`.
    pub hp: i64,
    pub defense: u32,
    pub weapon: Weapon,
    /// Damage dealt across every battle this instance took part in.
    pub total_damage_dealt: u64,
    /// Damage dealt since the last [Combatant::reset].
    pub current_battle_damage: u64,
}

impl Combatant {
    pub fn new(name: impl Into<String>, team: Team, max_hp: i64, defense: u32, weapon: Weapon) -> Self {
        Self {
            name: name.into(),
            team,
            max_hp,
            hp: max_hp,
            defense,
            weapon,
            total_damage_dealt: 0,
            current_battle_damage: 0,
        }
    }

    pub fn reset(&mut self) {
        self.hp = self.max_hp;
        self.current_battle_damage = 0;
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Flat subtraction. Defense was already spent by the resolution rule.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        self.hp -= i64::from(amount);
        amount
    }

    pub fn record_damage_dealt(&mut self, amount: u32) {
        self.total_damage_dealt += u64::from(amount);
        self.current_battle_damage += u64::from(amount);
    }

    pub fn roll_attack<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        self.weapon.roll(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::seeded;

    fn goblin() -> Combatant {
        Combatant::new("Goblin", Team::Opponents, 7, 3, Weapon::from_spec("1d6", Vec::<String>::new()))
    }

    #[test]
    fn take_damage_subtracts_without_floor() {
        let mut c = goblin();
        assert_eq!(c.take_damage(5), 5);
        assert_eq!(c.hp, 2);
        assert!(c.is_alive());
        assert_eq!(c.take_damage(4), 4);
        assert_eq!(c.hp, -2);
        assert!(!c.is_alive());
    }

    #[test]
    fn zero_hp_is_dead() {
        let mut c = goblin();
        c.take_damage(7);
        assert_eq!(c.hp, 0);
        assert!(!c.is_alive());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut c = goblin();
        c.take_damage(9);
        c.record_damage_dealt(3);
        c.reset();
        c.reset();
        assert_eq!(c.hp, c.max_hp);
        assert_eq!(c.current_battle_damage, 0);
        assert_eq!(c.total_damage_dealt, 3, "lifetime total survives reset");
    }

    #[test]
    fn roll_attack_uses_weapon_pool() {
        let mut rng = seeded(3);
        assert_eq!(goblin().roll_attack(&mut rng).len(), 1);
        let unarmed = Combatant::new("Monk", Team::Players, 10, 2, Weapon::from_spec("fists", Vec::<String>::new()));
        assert!(unarmed.roll_attack(&mut rng).is_empty());
    }

    #[test]
    fn teams_oppose_each_other() {
        assert_eq!(Team::Players.opposing(), Team::Opponents);
        assert_eq!(Team::Opponents.opposing(), Team::Players);
    }
}
