//! Production roll source: a seeded ChaCha stream, one per battle.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use medarot_core::rng::RollSource;

/// The battle's random stream. Same seed, same sequence of rolls.
#[derive(Debug, Clone)]
pub struct BattleRng(ChaCha8Rng);

impl BattleRng {
    pub fn seed_from_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RollSource for BattleRng {
    fn roll_percent(&mut self) -> f64 {
        self.0.gen_range(0.0..100.0)
    }

    fn variance(&mut self) -> f64 {
        self.0.gen_range(-1.0..1.0)
    }

    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.0.gen_range(0..len)
    }
}
