//! Per-endpoint RNG for branch IDs, tags, and SSRCs.
//!
//! spec.md §9 flags the original source's process-wide `random` usage as
//! something to avoid: each endpoint gets its own seeded generator instead
//! of reaching for a global one.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Wraps a seeded RNG with the handful of id-generation helpers the wire
/// codec and RTP endpoint need.
pub struct EndpointRng {
    rng: StdRng,
}

impl EndpointRng {
    /// Seed a new generator from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed a new generator deterministically, for reproducible tests.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// A 10-digit decimal branch suffix, matching the dialect's
    /// `z9hG4bK-<10-digit>` convention.
    pub fn branch(&mut self) -> String {
        format!("z9hG4bK-{}", self.rng.gen_range(1_000_000_000u64..10_000_000_000))
    }

    /// A 10-digit decimal tag or Call-ID suffix.
    pub fn ten_digit(&mut self) -> String {
        self.rng.gen_range(1_000_000_000u64..10_000_000_000).to_string()
    }

    /// A random 32-bit SSRC.
    pub fn ssrc(&mut self) -> u32 {
        self.rng.gen()
    }
}

impl Default for EndpointRng {
    fn default() -> Self {
        Self::new()
    }
}
