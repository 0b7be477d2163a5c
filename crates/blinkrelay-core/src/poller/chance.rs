use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Decides, once per cycle, whether to ask every device for a fresh capture.
pub trait CaptureChance: Send {
    fn should_capture(&mut self) -> bool;
}

/// Bernoulli draw with a fixed probability.
pub struct RandomChance {
    rng: StdRng,
    probability: f64,
}

impl RandomChance {
    pub fn new(probability: f64) -> Self {
        Self::with_rng(StdRng::from_entropy(), probability)
    }

    /// Deterministic sequence for tests and reproducible runs
    pub fn seeded(probability: f64, seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), probability)
    }

    fn with_rng(rng: StdRng, probability: f64) -> Self {
        let probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
        Self { rng, probability }
    }
}

impl CaptureChance for RandomChance {
    fn should_capture(&mut self) -> bool {
        self.rng.gen_bool(self.probability)
    }
}
