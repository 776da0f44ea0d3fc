#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic procedural generator deciding which cells hold caches.
//!
//! Every decision is a pure function of the cell coordinates: the generator
//! holds only its tuning parameters, never a cursor or counter, so cells may be
//! queried any number of times in any order and always agree with a previous
//! run of the process.

use geocache_core::{Cell, GenerationConfig};
use sha2::{Digest, Sha256};

const VALUE_KEY_TAG: &str = "initialValue";

/// Maps a key to a pseudo-random number in `[0, 1)`.
///
/// The key is hashed with SHA-256 and the leading 53 bits of the digest are
/// scaled into the unit interval.
#[must_use]
pub fn luck(key: &str) -> f64 {
    const SCALE: f64 = 1.0 / ((1u64 << 53) as f64);
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    let value = u64::from_le_bytes(bytes) >> 11;
    (value as f64) * SCALE
}

/// Key consulted for the spawn decision of a cell.
#[must_use]
pub fn spawn_key(cell: Cell) -> String {
    format!("{},{}", cell.i(), cell.j())
}

/// Key consulted for the initial value of a cell.
#[must_use]
pub fn value_key(cell: Cell) -> String {
    format!("{},{},{VALUE_KEY_TAG}", cell.i(), cell.j())
}

/// Pure generator answering spawn and value queries per cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Generator {
    spawn_probability: f64,
    value_exponents: u32,
}

impl Generator {
    /// Creates a generator from the supplied tuning parameters.
    #[must_use]
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            spawn_probability: config.spawn_probability,
            value_exponents: config.value_exponents.clamp(1, 31),
        }
    }

    /// Reports whether the cell holds a cache.
    #[must_use]
    pub fn spawn_decision(&self, cell: Cell) -> bool {
        luck(&spawn_key(cell)) < self.spawn_probability
    }

    /// Value a cache at this cell starts with.
    ///
    /// Values are powers of two drawn uniformly over the exponents, so with
    /// the default four exponents a cache holds 1, 2, 4 or 8 points.
    #[must_use]
    pub fn initial_value(&self, cell: Cell) -> u32 {
        let scaled = luck(&value_key(cell)) * f64::from(self.value_exponents);
        let exponent = (scaled.floor() as u32).min(self.value_exponents - 1);
        1u32 << exponent
    }

    /// Initial value for cells that hold a cache, `None` otherwise.
    #[must_use]
    pub fn generate(&self, cell: Cell) -> Option<u32> {
        self.spawn_decision(cell).then(|| self.initial_value(cell))
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(&GenerationConfig::default())
    }
}
