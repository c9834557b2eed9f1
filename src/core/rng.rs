//! Deterministic random number generation for local decks.
//!
//! The local deck service shuffles with a seeded ChaCha8 stream so a whole
//! session can be replayed from one number. Each deck gets its own stream
//! derived from the seed and the deck's sequence number, so shuffling a
//! throwaway warm-up deck never changes the order of the next game deck.
//!
//! ```
//! use higher_lower::core::GameRng;
//!
//! let mut a = GameRng::new(42).for_deck(1);
//! let mut b = GameRng::new(42).for_deck(1);
//!
//! let mut left = vec![1, 2, 3, 4, 5];
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Characters used for generated deck ids, matching the public API's
/// lowercase alphanumeric tokens.
const DECK_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated deck ids.
const DECK_ID_LEN: usize = 12;

/// Seeded RNG.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Independent stream for the `n`th deck dealt from this seed.
    #[must_use]
    pub fn for_deck(&self, n: u64) -> Self {
        let deck_seed = self.seed ^ n.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Self::new(deck_seed)
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.inner);
    }

    /// Random lowercase alphanumeric token shaped like an API deck id.
    #[must_use]
    pub fn deck_token(&mut self) -> String {
        (0..DECK_ID_LEN)
            .map(|_| {
                let idx = self.inner.gen_range(0..DECK_ID_ALPHABET.len());
                char::from(DECK_ID_ALPHABET[idx])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        assert_eq!(rng1.deck_token(), rng2.deck_token());
    }

    #[test]
    fn test_different_seeds() {
        let mut rng1 = GameRng::new(1);
        let mut rng2 = GameRng::new(2);

        assert_ne!(rng1.deck_token(), rng2.deck_token());
    }

    #[test]
    fn test_deck_streams_are_independent() {
        let root = GameRng::new(42);
        let mut first: Vec<u32> = (0..52).collect();
        let mut second = first.clone();

        root.for_deck(1).shuffle(&mut first);
        root.for_deck(2).shuffle(&mut second);

        assert_ne!(first, second);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data: Vec<u32> = (1..=10).collect();
        let original = data.clone();

        rng.shuffle(&mut data);

        data.sort_unstable();
        assert_eq!(data, original);
    }

    #[test]
    fn test_deck_token_shape() {
        let mut rng = GameRng::new(7);
        let token = rng.deck_token();

        assert_eq!(token.len(), DECK_ID_LEN);
        assert!(token
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()));
    }
}
