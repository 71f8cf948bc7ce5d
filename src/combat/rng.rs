//! Random sources for simulation. Trials draw from an injected ChaCha8 stream so
//! seeded runs are reproducible; unseeded runs take their base seed from the OS.
//! Parallel runs derive one seed per trial with SplitMix64 mixing.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SPLITMIX64_GOLDEN: u64 = 0x9e3779b97f4a7c15;
const SPLITMIX64_M1: u64 = 0xbf58476d1ce4e5b9;
const SPLITMIX64_M2: u64 = 0x94d049bb133111eb;

/// Generator used by every trial and roll in the crate.
pub type SimRng = ChaCha8Rng;

pub fn seeded(seed: u64) -> SimRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Fresh 64-bit seed from the operating system. Falls back to the clock when
/// the OS source is unavailable.
pub fn entropy_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(err) => {
            tracing::warn!("OS entropy unavailable ({err}), seeding from clock");
            let nanos = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0);
            splitmix64(nanos)
        }
    }
}

/// Resolve an optional configured seed, drawing from entropy when absent.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(entropy_seed)
}

/// Independent seed for trial `index` of a run seeded with `base`.
#[inline]
pub fn trial_seed(base: u64, index: u64) -> u64 {
    splitmix64(base ^ splitmix64(index))
}

#[inline]
fn splitmix64(value: u64) -> u64 {
    let mut z = value.wrapping_add(SPLITMIX64_GOLDEN);
    z = (z ^ (z >> 30)).wrapping_mul(SPLITMIX64_M1);
    z = (z ^ (z >> 27)).wrapping_mul(SPLITMIX64_M2);
    z ^ (z >> 31)
}
