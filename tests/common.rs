//! Shared test helpers: deterministic pseudo-random data.
//!
//! Usage in tests:
//! ```ignore
//! mod common;
//! use common::*;
//!
//! let mut rng = rng_from_env(); // honors TEST_SEED if set
//! let pairs = random_pairs(&mut rng, 64, 1_000);
//! ```

use std::env;

#[allow(dead_code)]
pub const DEFAULT_TEST_SEED: u64 = 0xC0DE_5EED_0BAD_F00D;

/// Minimal, fast, deterministic PRNG (XorShift64).
/// Not cryptographically secure—only for tests.
#[derive(Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    #[inline]
    pub fn new(seed: u64) -> Self {
        let s = if seed == 0 { DEFAULT_TEST_SEED } else { seed };
        Self { state: s }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform-ish value in `0..bound` (bound > 0).
    #[inline]
    pub fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }
}

/// Seed from env (`TEST_SEED`), or the fixed default. Accepts decimal or
/// `0x` hex values.
#[allow(dead_code)]
pub fn seed_from_env() -> u64 {
    if let Ok(s) = env::var("TEST_SEED") {
        let s = s.trim();
        let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok()
        } else {
            s.parse().ok()
        };
        return parsed.unwrap_or(DEFAULT_TEST_SEED);
    }
    DEFAULT_TEST_SEED
}

#[allow(dead_code)]
pub fn rng_from_env() -> XorShift64 {
    XorShift64::new(seed_from_env())
}

/// `count` pairs with distinct keys drawn from `0..key_space`.
#[allow(dead_code)]
pub fn random_pairs(rng: &mut XorShift64, count: usize, key_space: u64) -> Vec<(u64, u64)> {
    assert!(count as u64 <= key_space, "cannot draw {count} distinct keys");
    let mut keys = Vec::with_capacity(count);
    while keys.len() < count {
        let k = rng.below(key_space);
        if !keys.contains(&k) {
            keys.push(k);
        }
    }
    keys.into_iter().map(|k| (k, rng.next_u64())).collect()
}

/// Deterministic in-place shuffle (Fisher–Yates).
#[allow(dead_code)]
pub fn shuffle<T>(rng: &mut XorShift64, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        items.swap(i, j);
    }
}
