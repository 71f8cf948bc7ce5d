//! Closed-form expected damage per attack, enumerated over die faces.
//! Used to cross-check Monte Carlo estimates and to label matrix cells.

use crate::combat::{DicePool, Weapon};
use crate::error::{Result, SimError};

/// Chance that one die of `die_size` meets `defense` under the threshold rule.
pub fn threshold_hit_chance(die_size: u32, defense: u32) -> f64 {
    if die_size == 0 {
        return 0.0;
    }
    faces_meeting(die_size, defense) as f64 / f64::from(die_size)
}

/// Expected damage of one die under the threshold rule.
pub fn expected_threshold_die_damage(die_size: u32, defense: u32, crushing: bool) -> Result<f64> {
    if die_size == 0 {
        return Ok(0.0);
    }
    Ok(threshold_face_total(die_size, defense, crushing)? as f64 / f64::from(die_size))
}

/// Expected damage of one die under the matrix rule.
pub fn expected_matrix_die_damage(die_size: u32, defense: u32, crushing: bool) -> Result<f64> {
    if die_size == 0 {
        return Ok(0.0);
    }
    let mut total = threshold_face_total(die_size, defense, crushing)?;
    // The max face lands for 1 even below defense.
    if die_size < defense {
        total += 1;
    }
    Ok(total as f64 / f64::from(die_size))
}

/// Expected damage of one full attack under the threshold rule.
pub fn expected_threshold_attack(weapon: &Weapon, defense: u32) -> Result<f64> {
    let DicePool { quantity, die_size } = weapon.pool;
    if weapon.pool.is_empty() {
        return Ok(0.0);
    }
    Ok(f64::from(quantity) * expected_threshold_die_damage(die_size, defense, weapon.is_crushing())?)
}

/// Expected damage of one full attack under the matrix rule.
pub fn expected_matrix_attack(quantity: u32, die_size: u32, defense: u32, crushing: bool) -> Result<f64> {
    if quantity == 0 || die_size == 0 {
        return Ok(0.0);
    }
    Ok(f64::from(quantity) * expected_matrix_die_damage(die_size, defense, crushing)?)
}

/// Number of faces in `1..=die_size` that are at least `defense`.
fn faces_meeting(die_size: u32, defense: u32) -> u64 {
    let lowest = defense.max(1);
    if lowest > die_size {
        0
    } else {
        u64::from(die_size - lowest + 1)
    }
}

/// Threshold damage summed over every face of the die.
fn threshold_face_total(die_size: u32, defense: u32, crushing: bool) -> Result<u128> {
    if !crushing {
        return Ok(u128::from(faces_meeting(die_size, defense)));
    }
    if defense == 0 {
        return Err(SimError::InvalidConfiguration(
            "crushing weapon resolved against defense 0".to_string(),
        ));
    }
    // Faces below defense floor to 0, so the crushing total is the full floor sum.
    Ok(floor_sum(u64::from(die_size), u64::from(defense)))
}

/// Sum of `face / divisor` (floored) for `face` in `1..=n`.
fn floor_sum(n: u64, divisor: u64) -> u128 {
    let (n, d) = (u128::from(n), u128::from(divisor));
    let (q, r) = (n / d, n % d);
    d * q * q.saturating_sub(1) / 2 + q * (r + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "expected {b}, got {a}");
    }

    #[test]
    fn two_d6_against_four_with_crushing() {
        approx_eq(expected_matrix_die_damage(6, 4, true).unwrap_or(f64::NAN), 0.5);
        approx_eq(expected_matrix_attack(2, 6, 4, true).unwrap_or(f64::NAN), 1.0);
    }

    #[test]
    fn matrix_auto_hit_adds_max_face_above_defense() {
        // d6 vs defense 9: only the max face lands.
        approx_eq(expected_matrix_die_damage(6, 9, false).unwrap_or(f64::NAN), 1.0 / 6.0);
        approx_eq(expected_threshold_die_damage(6, 9, false).unwrap_or(f64::NAN), 0.0);
    }

    #[test]
    fn crushing_raises_expectation_on_big_dice() {
        // d12 vs 3: faces 3..=12 give 1,1,1,2,2,2,3,3,3,4 = 22.
        approx_eq(expected_threshold_die_damage(12, 3, true).unwrap_or(f64::NAN), 22.0 / 12.0);
        approx_eq(expected_threshold_die_damage(12, 3, false).unwrap_or(f64::NAN), 10.0 / 12.0);
    }

    #[test]
    fn hit_chance_and_empty_pools() {
        approx_eq(threshold_hit_chance(6, 5), 2.0 / 6.0);
        approx_eq(threshold_hit_chance(6, 0), 1.0);
        approx_eq(threshold_hit_chance(0, 1), 0.0);
        let unarmed = Weapon::from_spec("none", Vec::<String>::new());
        approx_eq(expected_threshold_attack(&unarmed, 0).unwrap_or(f64::NAN), 0.0);
    }

    #[test]
    fn closed_form_agrees_with_face_by_face_resolution() {
        use crate::combat::{matrix_die_damage, threshold_die_damage};
        for die_size in 1..=20u32 {
            for defense in 0..=22u32 {
                for crushing in [false, true] {
                    if crushing && defense == 0 {
                        continue;
                    }
                    let faces = 1..=die_size;
                    let threshold: u32 = faces
                        .clone()
                        .map(|f| threshold_die_damage(f, defense, crushing).unwrap_or(0))
                        .sum();
                    let matrix: u32 = faces
                        .map(|f| matrix_die_damage(f, die_size, defense, crushing).unwrap_or(0))
                        .sum();
                    let size = f64::from(die_size);
                    approx_eq(
                        expected_threshold_die_damage(die_size, defense, crushing).unwrap_or(f64::NAN),
                        f64::from(threshold) / size,
                    );
                    approx_eq(
                        expected_matrix_die_damage(die_size, defense, crushing).unwrap_or(f64::NAN),
                        f64::from(matrix) / size,
                    );
                }
            }
        }
    }

    #[test]
    fn huge_dice_are_computed_without_enumeration() {
        let expected = expected_matrix_die_damage(u32::MAX, 3, true).unwrap_or(f64::NAN);
        assert!(expected.is_finite());
        // Mean of floor(f / 3) over a huge die is about size / 6.
        assert!((expected / (f64::from(u32::MAX) / 6.0) - 1.0).abs() < 1e-6);
        approx_eq(threshold_hit_chance(u32::MAX, u32::MAX), 1.0 / f64::from(u32::MAX));
    }

    #[test]
    fn crushing_zero_defense_propagates() {
        assert!(expected_matrix_attack(1, 6, 0, true).is_err());
    }
}
