use glam::DVec2;
use rand::{
    distributions::{Distribution, Uniform},
    Rng,
};

use crate::options::JitterRange;

/// Source of the per-axis multipliers applied to a boid's positional advance.
///
/// Sampled once per boid per step, so the noise changes the magnitude of
/// the displacement on each axis but never flips its direction.
pub trait JitterSource {
    fn sample(&mut self) -> DVec2;
}

impl<J: JitterSource + ?Sized> JitterSource for &mut J {
    fn sample(&mut self) -> DVec2 {
        (**self).sample()
    }
}

/// Draws both axes independently and uniformly from a [`JitterRange`]
pub struct UniformJitter<R: Rng> {
    rng: R,
    distribution: Uniform<f64>,
}

impl<R: Rng> UniformJitter<R> {
    /// Panics when `range.low > range.high`, see [`crate::options::RunOptions::validate`]
    pub fn new(rng: R, range: &JitterRange) -> Self {
        UniformJitter {
            rng,
            distribution: Uniform::new_inclusive(range.low, range.high),
        }
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }
}

impl<R: Rng> JitterSource for UniformJitter<R> {
    fn sample(&mut self) -> DVec2 {
        DVec2::new(
            self.distribution.sample(&mut self.rng),
            self.distribution.sample(&mut self.rng),
        )
    }
}

/// Disabled jitter, boids advance by exactly their velocity
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl JitterSource for NoJitter {
    fn sample(&mut self) -> DVec2 {
        DVec2::new(1., 1.)
    }
}
