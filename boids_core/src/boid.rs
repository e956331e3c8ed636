use glam::DVec2;
use rand::Rng;

use crate::{
    math_helpers::{mean, wrap_position},
    options::{FieldSize, RunOptions, ALIGNMENT_WEIGHT, CENTERING_WEIGHT, PERSISTENCE_WEIGHT},
};

/// Which part of the centering band a boid ended up in during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Band {
    /// neighbourhood too spread out, steer towards its centre
    Pull,
    /// neighbourhood too clustered, steer away from its centre
    Push,
    /// no correction
    #[default]
    DeadZone,
}

#[derive(Debug, Clone, Default)]
pub struct BoidMetadata {
    /// size of the neighbourhood in the last step, the boid itself included
    pub n_neighbours: usize,
    pub band: Band,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boid {
    pub position: DVec2,
    pub velocity: DVec2,
}

impl Boid {
    /// Creates a new [`Boid`].
    pub fn new(x: f64, y: f64, velocity: DVec2) -> Self {
        Boid {
            position: DVec2::new(x, y),
            velocity,
        }
    }

    /// Draws a boid anywhere in the field, each velocity component in
    /// [-max_init_speed, max_init_speed]
    pub fn random<R: Rng + ?Sized>(run_options: &RunOptions, rng: &mut R) -> Self {
        let x = rng.gen_range(0.0..run_options.field.width);
        let y = rng.gen_range(0.0..run_options.field.height);

        let max = run_options.max_init_speed;
        let x_vel = rng.gen_range(-max..=max);
        let y_vel = rng.gen_range(-max..=max);

        Boid::new(x, y, DVec2::new(x_vel, y_vel))
    }

    /// Advances the position by the current velocity scaled per axis by `jitter`,
    /// then wraps it around the field
    pub fn update_location(&mut self, jitter: DVec2, field: &FieldSize) {
        self.position = wrap_position(self.position + self.velocity * jitter, field);
    }

    /// Computes the velocity for the next step from a neighbourhood that
    /// includes the boid itself. Does not mutate, so all boids of a flock
    /// can be evaluated against the same snapshot.
    pub fn run_rules(&self, neighbours: &[&Boid], run_options: &RunOptions) -> (DVec2, Band) {
        let avg_velocity = self.alignment(neighbours);
        let (correction, band) = centering_correction(
            self.cohesion(neighbours),
            run_options.pull_threshold(),
            run_options.push_threshold(),
        );

        let velocity = self.velocity * PERSISTENCE_WEIGHT
            + avg_velocity * ALIGNMENT_WEIGHT
            + correction * CENTERING_WEIGHT;

        (velocity, band)
    }

    /// Average velocity of the neighbourhood
    pub fn alignment(&self, neighbours: &[&Boid]) -> DVec2 {
        mean(neighbours.iter().map(|b| b.velocity)).unwrap_or(self.velocity)
    }

    /// Offset from the boid to the centre of its neighbourhood
    pub fn cohesion(&self, neighbours: &[&Boid]) -> DVec2 {
        mean(neighbours.iter().map(|b| b.position))
            .map(|centre| centre - self.position)
            .unwrap_or(DVec2::ZERO)
    }
}

/// Three-way centering band over the offset to the neighbourhood centre.
///
/// Beyond `pull` (R/2) the boid is pulled along the offset, strictly inside
/// (0, `push`) with `push` = R/4 it is pushed against it. Both thresholds
/// themselves fall in the dead zone.
pub fn centering_correction(offset: DVec2, pull: f64, push: f64) -> (DVec2, Band) {
    let dist = offset.length();

    if dist > pull {
        (offset, Band::Pull)
    } else if push > dist && dist > 0. {
        (-offset, Band::Push)
    } else {
        (DVec2::ZERO, Band::DeadZone)
    }
}
