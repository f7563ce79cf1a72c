use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Seeded random source for one match. Injected wherever the engine makes
/// a random choice so a fixed seed replays the same match.
#[derive(Debug, Clone)]
pub struct SessionRng {
    rng: StdRng,
    seed: u64,
}

impl SessionRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_random() -> Self {
        let seed: u64 = rand::rng().random();
        Self::new(seed)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derives an independent generator, e.g. for a search running on a
    /// blocking thread.
    pub fn fork(&mut self) -> SessionRng {
        SessionRng::new(self.rng.random())
    }

    pub fn random_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distr::uniform::SampleUniform,
        R: rand::distr::uniform::SampleRange<T>,
    {
        self.rng.random_range(range)
    }
}
