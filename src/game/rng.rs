//! Seeded randomness for a single match.
//!
//! Every random draw a match makes (dice, chance/chest cards, bankruptcy
//! auction seeding) comes from one [`GameRng`], so a seed plus a fixed
//! sequence of decisions replays the whole game.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type Dice = (u8, u8);

#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
    loaded: VecDeque<Dice>,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
            loaded: VecDeque::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Queue dice to be returned by the next rolls before the generator is
    /// consulted again. Values are clamped to 1..=6.
    pub fn load_dice(&mut self, dice: impl IntoIterator<Item = Dice>) {
        self.loaded
            .extend(dice.into_iter().map(|(a, b)| (a.clamp(1, 6), b.clamp(1, 6))));
    }

    pub fn roll_dice(&mut self) -> Dice {
        if let Some(dice) = self.loaded.pop_front() {
            return dice;
        }
        (self.inner.gen_range(1..=6), self.inner.gen_range(1..=6))
    }

    /// Uniform integer in `low..=high`.
    pub fn amount(&mut self, low: i64, high: i64) -> i64 {
        self.inner.gen_range(low..=high)
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.inner.gen_range(0..len)
    }
}
