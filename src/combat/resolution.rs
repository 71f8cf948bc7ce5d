//! Damage resolution rules.
//!
//! Two rules exist and they are not interchangeable:
//!
//! * **Threshold** (full battles): a die hits iff `die >= defense`. A hit deals 1,
//!   or `die / defense` for crushing weapons.
//! * **Matrix** (weapon-matrix analysis only): a die hits iff it shows its max face
//!   or `die >= defense`. The crushing bonus applies only when `die >= defense`,
//!   so a max-face auto-hit below defense deals exactly 1.
//!
//! Crushing against defense 0 would divide by zero; both rules fail with
//! [SimError::InvalidConfiguration] when that combination is actually resolved.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::dice::Weapon;
use crate::error::{Result, SimError};

/// Label attached to every analysis so consumers know which rule produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    Threshold,
    Matrix,
}

impl ResolutionRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Matrix => "matrix",
        }
    }
}

impl fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn crushing_bonus(die: u32, defense: u32) -> Result<u32> {
    if defense == 0 {
        return Err(SimError::InvalidConfiguration(
            "crushing weapon resolved against defense 0".to_string(),
        ));
    }
    Ok(die / defense)
}

/// Damage from one die under the threshold rule.
pub fn threshold_die_damage(die: u32, defense: u32, crushing: bool) -> Result<u32> {
    if die < defense {
        return Ok(0);
    }
    if crushing {
        crushing_bonus(die, defense)
    } else {
        Ok(1)
    }
}

/// Total attack damage under the threshold rule, summed over every rolled die.
pub fn threshold_damage(rolls: &[u32], defense: u32, weapon: &Weapon) -> Result<u32> {
    let crushing = weapon.is_crushing();
    rolls.iter().try_fold(0u32, |total, &die| {
        Ok(total.saturating_add(threshold_die_damage(die, defense, crushing)?))
    })
}

/// Damage from one die under the matrix rule.
pub fn matrix_die_damage(die: u32, die_size: u32, defense: u32, crushing: bool) -> Result<u32> {
    let meets_defense = die >= defense;
    if !(meets_defense || die == die_size) {
        return Ok(0);
    }
    if crushing && meets_defense {
        crushing_bonus(die, defense)
    } else {
        Ok(1)
    }
}

/// Total attack damage under the matrix rule.
pub fn matrix_damage(rolls: &[u32], die_size: u32, defense: u32, crushing: bool) -> Result<u32> {
    rolls.iter().try_fold(0u32, |total, &die| {
        Ok(total.saturating_add(matrix_die_damage(die, die_size, defense, crushing)?))
    })
}
