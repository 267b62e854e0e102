//! A simple pseudorandom number generator.
//!
//! Specifically, SplitMix64, as described by Steele, Lea, and Flood in *Fast splittable pseudorandom number generators*, implemented to satisfy the [RngCore] trait.
//!
//! SplitMix64 was chosen as the default source of (pseudo)random numbers as it is simple, fast, and any 64-bit seed (zero included) gives a good sequence.
//! This last point is useful, as each reasoner which requires randomness is given a fresh generator seeded from the generator of the [context](crate::context).
//!
//! Each [context](crate::context) stores a source of rng.
//! The context is paramaterised to anything which satisfies the [Rng](rand::Rng) trait, though to keep the rest of the library straightforward the rng is fixed in [Context](crate::context::Context) as [SplitMix64].

use rand_core::{impls, RngCore, SeedableRng};

/// The state of the generator.
#[derive(Clone, Debug, Default)]
pub struct SplitMix64 {
    state: u64,
}

impl RngCore for SplitMix64 {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);

        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }
}

impl SeedableRng for SplitMix64 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self {
            state: u64::from_le_bytes(seed),
        }
    }

    fn seed_from_u64(state: u64) -> Self {
        Self { state }
    }
}

#[cfg(test)]
mod splitmix_tests {
    use super::*;

    #[test]
    fn zero_seed() {
        let mut zero_seed = SplitMix64::seed_from_u64(0);
        assert_eq!(zero_seed.next_u64(), 0xE220A8397B1DCDAF);
        assert_eq!(zero_seed.next_u64(), 0x6E789E6AA1B965F4);
        assert_eq!(zero_seed.next_u64(), 0x06C45D188009454F);
    }

    #[test]
    fn seeds_agree() {
        let mut from_bytes = SplitMix64::from_seed(73_u64.to_le_bytes());
        let mut from_u64 = SplitMix64::seed_from_u64(73);
        for _ in 0..16 {
            assert_eq!(from_bytes.next_u64(), from_u64.next_u64());
        }
    }
}
