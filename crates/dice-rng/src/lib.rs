//! A small, dependency-free PRNG whose seed is derived deterministically
//! from `(base_seed, roll_index)`, so a given room replays byte-identical
//! die faces when fed the same seed and roll sequence — the property the
//! smoke tests in S1/S2 depend on.
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// xorshift-style 64-bit generator, splitmix-seeded. Not cryptographic;
/// only required to be fast, deterministic, and well-distributed enough
/// for uniform die faces.
#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // avoid an all-zero state, which is a fixed point for xorshift.
        Self {
            state: seed ^ 0x9E3779B97F4A7C15,
        }
    }

    /// Derive a fresh generator scoped to one roll within a room's match,
    /// by hashing `"{base_seed}-{roll_index}"`.
    pub fn for_roll(base_seed: &str, roll_index: u32) -> Self {
        let mut hasher = DefaultHasher::new();
        base_seed.hash(&mut hasher);
        hasher.write_u8(b'-');
        roll_index.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform die face in 1..=sides.
    pub fn roll_die(&mut self, sides: u8) -> u8 {
        debug_assert!(sides > 0);
        1 + (self.next_u64() % sides as u64) as u8
    }

    /// Roll `count` dice of the same side count, in a fixed left-to-right
    /// order so the sequence is reproducible independent of how the caller
    /// later sorts or groups the results.
    pub fn roll_dice(&mut self, count: usize, sides: u8) -> Vec<u8> {
        (0..count).map(|_| self.roll_die(sides)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_and_roll_index_reproduce_the_same_faces() {
        let mut a = Prng::for_roll("match-seed-1", 3);
        let mut b = Prng::for_roll("match-seed-1", 3);
        assert_eq!(a.roll_dice(6, 6), b.roll_dice(6, 6));
    }

    #[test]
    fn different_roll_index_reproduces_different_faces() {
        let mut a = Prng::for_roll("match-seed-1", 3);
        let mut b = Prng::for_roll("match-seed-1", 4);
        assert_ne!(a.roll_dice(6, 6), b.roll_dice(6, 6));
    }

    #[test]
    fn faces_stay_within_bounds() {
        let mut gen = Prng::for_roll("seed", 0);
        for face in gen.roll_dice(1000, 6) {
            assert!((1..=6).contains(&face));
        }
    }
}
