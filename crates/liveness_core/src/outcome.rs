use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::domain::Outcome;

pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.8;

/// Source of uniform draws in `[0, 1)` used to settle a run.
pub trait OutcomeSource: Send {
    fn draw(&mut self) -> f64;
}

pub struct RandomOutcomeSource {
    rng: StdRng,
}

impl RandomOutcomeSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl OutcomeSource for RandomOutcomeSource {
    fn draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// A draw strictly above `1 - success_probability` succeeds.
pub fn decide_outcome(draw: f64, success_probability: f64) -> Outcome {
    let threshold = 1.0 - success_probability.clamp(0.0, 1.0);
    if draw > threshold {
        Outcome::Success
    } else {
        Outcome::Failure
    }
}
