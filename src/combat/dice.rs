//! Dice pools and weapons.
//!
//! Weapon specs follow the `<quantity>d<die_size>` grammar. Parsing is lenient:
//! only the leading match is read, trailing characters are ignored, and an
//! unparseable spec yields the zero pool (an unarmed combatant) instead of an
//! error. [DicePool::parse_strict] applies the anchored grammar for callers
//! that want trailing text rejected.

use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Tag enabling the crushing bonus (`die / defense` damage per hit).
pub const CRUSHING_TAG: &str = "crushing";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DicePool {
    pub quantity: u32,
    pub die_size: u32,
}

impl DicePool {
    pub const ZERO: DicePool = DicePool {
        quantity: 0,
        die_size: 0,
    };

    pub const fn new(quantity: u32, die_size: u32) -> Self {
        Self { quantity, die_size }
    }

    /// Lenient parse. Anything not starting with `<digits>d<digits>` is the zero pool.
    pub fn parse(spec: &str) -> Self {
        split_leading_pool(spec)
            .map(|(pool, _)| pool)
            .unwrap_or(Self::ZERO)
    }

    /// Anchored parse: the whole string must be `<digits>d<digits>`.
    pub fn parse_strict(spec: &str) -> Result<Self> {
        match split_leading_pool(spec) {
            Some((pool, "")) => Ok(pool),
            Some((_, rest)) => Err(SimError::InvalidConfiguration(format!(
                "weapon spec '{spec}' has trailing characters '{rest}'"
            ))),
            None => Err(SimError::InvalidConfiguration(format!(
                "weapon spec '{spec}' does not match <quantity>d<size>"
            ))),
        }
    }

    /// Characters after the leading dice grammar, if the spec matched at all.
    pub fn trailing_text(spec: &str) -> Option<&str> {
        split_leading_pool(spec).map(|(_, rest)| rest)
    }

    /// True when the pool rolls no dice at all.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0 || self.die_size == 0
    }

    /// Roll `quantity` independent faces in `[1, die_size]`.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        if self.is_empty() {
            return Vec::new();
        }
        (0..self.quantity)
            .map(|_| rng.gen_range(1..=self.die_size))
            .collect()
    }
}

impl fmt::Display for DicePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.quantity, self.die_size)
    }
}

fn split_leading_pool(spec: &str) -> Option<(DicePool, &str)> {
    let (quantity, rest) = take_number(spec)?;
    let rest = rest.strip_prefix('d')?;
    let (die_size, rest) = take_number(rest)?;
    Some((DicePool::new(quantity, die_size), rest))
}

/// Leading decimal digits as a u32. Values that overflow do not match.
fn take_number(input: &str) -> Option<(u32, &str)> {
    let end = input
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(idx, _)| idx)
        .unwrap_or(input.len());
    if end == 0 {
        return None;
    }
    let value = input[..end].parse::<u32>().ok()?;
    Some((value, &input[end..]))
}

/// Dice pool plus tags. Unknown tags are kept but have no effect on resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub pool: DicePool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Weapon {
    pub fn new<I, S>(pool: DicePool, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pool,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_spec<I, S>(spec: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(DicePool::parse(spec), tags)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_crushing(&self) -> bool {
        self.has_tag(CRUSHING_TAG)
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<u32> {
        self.pool.roll(rng)
    }

    /// Whether any face of this weapon can meet `defense` under the threshold rule.
    pub fn can_threshold_hit(&self, defense: u32) -> bool {
        !self.pool.is_empty() && self.pool.die_size >= defense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::rng::seeded;

    #[test]
    fn parses_leading_grammar() {
        assert_eq!(DicePool::parse("3d8"), DicePool::new(3, 8));
        assert_eq!(DicePool::parse("10d12"), DicePool::new(10, 12));
    }

    #[test]
    fn lenient_parse_ignores_trailing_text() {
        assert_eq!(DicePool::parse("2d6+3"), DicePool::new(2, 6));
        assert_eq!(DicePool::trailing_text("2d6+3"), Some("+3"));
        assert_eq!(DicePool::trailing_text("2d6"), Some(""));
    }

    #[test]
    fn unparseable_specs_yield_zero_pool() {
        for spec in ["", "d6", "2x6", "fists", " 1d6", "1d", "99999999999d6"] {
            assert_eq!(DicePool::parse(spec), DicePool::ZERO, "spec={spec:?}");
        }
        assert_eq!(DicePool::trailing_text("fists"), None);
    }

    #[test]
    fn strict_parse_rejects_trailing_text() {
        assert_eq!(DicePool::parse_strict("4d10").ok(), Some(DicePool::new(4, 10)));
        assert!(matches!(
            DicePool::parse_strict("2d6 sword"),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert!(DicePool::parse_strict("sword").is_err());
    }

    #[test]
    fn empty_pools_roll_nothing() {
        let mut rng = seeded(1);
        assert!(DicePool::new(0, 6).roll(&mut rng).is_empty());
        assert!(DicePool::new(3, 0).roll(&mut rng).is_empty());
        assert!(DicePool::ZERO.roll(&mut rng).is_empty());
    }

    #[test]
    fn rolls_stay_within_die_faces() {
        let mut rng = seeded(11);
        let pool = DicePool::new(4, 6);
        let mut seen = [false; 7];
        for _ in 0..500 {
            let rolls = pool.roll(&mut rng);
            assert_eq!(rolls.len(), 4);
            for face in rolls {
                assert!((1..=6).contains(&face));
                seen[face as usize] = true;
            }
        }
        assert!(seen[1..].iter().all(|s| *s), "every face should appear");
    }

    #[test]
    fn unknown_tags_are_preserved() {
        let weapon = Weapon::from_spec("1d8", ["crushing", "reach"]);
        assert!(weapon.is_crushing());
        assert!(weapon.has_tag("reach"));
        assert!(!Weapon::from_spec("1d8", ["reach"]).is_crushing());
    }
}
