//! Team-wide target selection policies.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::combatant::Combatant;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetStrategy {
    #[default]
    #[serde(rename = "random_attack", alias = "random")]
    RandomAttack,
    /// Lowest current hp, ties broken uniformly at random.
    #[serde(rename = "attack_weak", alias = "attack_weakest")]
    AttackWeakest,
    /// Highest current hp, ties broken uniformly at random.
    #[serde(rename = "attack_strong", alias = "attack_strongest")]
    AttackStrongest,
}

impl TargetStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomAttack => "random_attack",
            Self::AttackWeakest => "attack_weak",
            Self::AttackStrongest => "attack_strong",
        }
    }

    /// Pick one of `candidates` (indices into `pool`, all living opponents).
    /// Returns the chosen index into `pool`.
    pub fn select_target<R: Rng + ?Sized>(
        &self,
        pool: &[Combatant],
        candidates: &[usize],
        rng: &mut R,
    ) -> Result<usize> {
        let hp_of = |idx: &usize| pool[*idx].hp;
        let chosen = match self {
            Self::RandomAttack => candidates.choose(rng).copied(),
            Self::AttackWeakest => {
                let Some(min_hp) = candidates.iter().map(hp_of).min() else {
                    return Err(SimError::NoValidTarget);
                };
                choose_tied(candidates, |idx| hp_of(idx) == min_hp, rng)
            }
            Self::AttackStrongest => {
                let Some(max_hp) = candidates.iter().map(hp_of).max() else {
                    return Err(SimError::NoValidTarget);
                };
                choose_tied(candidates, |idx| hp_of(idx) == max_hp, rng)
            }
        };
        chosen.ok_or(SimError::NoValidTarget)
    }
}

fn choose_tied<R, F>(candidates: &[usize], is_tied: F, rng: &mut R) -> Option<usize>
where
    R: Rng + ?Sized,
    F: Fn(&usize) -> bool,
{
    let tied: Vec<usize> = candidates.iter().copied().filter(|idx| is_tied(idx)).collect();
    tied.choose(rng).copied()
}

impl fmt::Display for TargetStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::combatant::Team;
    use crate::combat::dice::Weapon;
    use crate::combat::rng::seeded;

    fn roster(hps: &[i64]) -> Vec<Combatant> {
        hps.iter()
            .enumerate()
            .map(|(i, hp)| {
                Combatant::new(format!("npc{i}"), Team::Opponents, *hp, 2, Weapon::default())
            })
            .collect()
    }

    #[test]
    fn empty_candidates_have_no_target() {
        let pool = roster(&[5]);
        let mut rng = seeded(1);
        for strategy in [
            TargetStrategy::RandomAttack,
            TargetStrategy::AttackWeakest,
            TargetStrategy::AttackStrongest,
        ] {
            assert!(matches!(
                strategy.select_target(&pool, &[], &mut rng),
                Err(SimError::NoValidTarget)
            ));
        }
    }

    #[test]
    fn weakest_picks_minimum_hp() {
        let pool = roster(&[9, 3, 7]);
        let mut rng = seeded(2);
        for _ in 0..50 {
            let chosen = TargetStrategy::AttackWeakest
                .select_target(&pool, &[0, 1, 2], &mut rng)
                .ok();
            assert_eq!(chosen, Some(1));
        }
    }

    #[test]
    fn strongest_picks_maximum_hp() {
        let pool = roster(&[9, 3, 7]);
        let mut rng = seeded(3);
        let chosen = TargetStrategy::AttackStrongest
            .select_target(&pool, &[0, 1, 2], &mut rng)
            .ok();
        assert_eq!(chosen, Some(0));
    }

    #[test]
    fn ties_are_broken_uniformly() {
        let pool = roster(&[4, 4, 4, 10]);
        let mut rng = seeded(4);
        let mut counts = [0usize; 4];
        for _ in 0..3000 {
            if let Ok(idx) = TargetStrategy::AttackWeakest.select_target(&pool, &[0, 1, 2, 3], &mut rng) {
                counts[idx] += 1;
            }
        }
        assert_eq!(counts[3], 0);
        for count in &counts[..3] {
            assert!((800..1200).contains(count), "counts={counts:?}");
        }
    }

    #[test]
    fn random_only_picks_candidates() {
        let pool = roster(&[4, 4, 4]);
        let mut rng = seeded(5);
        for _ in 0..100 {
            let idx = TargetStrategy::RandomAttack.select_target(&pool, &[0, 2], &mut rng).ok();
            assert!(matches!(idx, Some(0) | Some(2)));
        }
    }

    #[test]
    fn strategy_identifiers_deserialize() {
        let parsed: Vec<TargetStrategy> =
            serde_json::from_str(r#"["random_attack","attack_weak","attack_strongest"]"#)
                .expect("strategies should parse");
        assert_eq!(
            parsed,
            vec![
                TargetStrategy::RandomAttack,
                TargetStrategy::AttackWeakest,
                TargetStrategy::AttackStrongest
            ]
        );
    }
}
