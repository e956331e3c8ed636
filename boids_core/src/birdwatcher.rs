use std::mem;

use serde::Serialize;

use crate::{
    boid::Band,
    flock::Flock,
    math_helpers::{mean, variance},
};

/// Aggregate state of the flock at one sampled tick
#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct FlockStats {
    pub tick: u64,
    pub n_boids: usize,
    pub mean_vx: f64,
    pub mean_vy: f64,
    /// mean squared deviation of the velocities from their mean
    pub velocity_variance: f64,
    pub mean_speed: f64,
    pub mean_neighbours: f64,
    pub pulled: usize,
    pub pushed: usize,
}

impl FlockStats {
    pub fn measure(flock: &Flock, tick: u64) -> Self {
        let mean_velocity = mean(flock.velocities()).unwrap_or_default();
        let n = flock.len().max(1) as f64;

        let count_band = |band: Band| flock.metadata().iter().filter(|m| m.band == band).count();

        FlockStats {
            tick,
            n_boids: flock.len(),
            mean_vx: mean_velocity.x,
            mean_vy: mean_velocity.y,
            velocity_variance: variance(flock.velocities()).unwrap_or(0.),
            mean_speed: flock.velocities().map(|v| v.length()).sum::<f64>() / n,
            mean_neighbours: flock
                .metadata()
                .iter()
                .map(|m| m.n_neighbours as f64)
                .sum::<f64>()
                / n,
            pulled: count_band(Band::Pull),
            pushed: count_band(Band::Push),
        }
    }
}

/// Samples flock statistics every `sample_rate` ticks and keeps them until popped
pub struct Birdwatcher {
    samples: Vec<FlockStats>,
    render_ticker: u64,
    sample_rate: u64,
}

impl Birdwatcher {
    pub fn new(sample_rate: u64) -> Self {
        Birdwatcher {
            samples: Vec::new(),
            render_ticker: 0,
            sample_rate: sample_rate.max(1),
        }
    }

    /// Counts one tick, measuring the flock when a sample is due
    pub fn watch(&mut self, flock: &Flock) -> Option<FlockStats> {
        if !self.should_sample() {
            return None;
        }

        let stats = FlockStats::measure(flock, self.render_ticker);
        log::debug!(
            "tick {}: mean speed {:.3}, velocity variance {:.4}, mean neighbours {:.2}, pulled {}, pushed {}",
            stats.tick,
            stats.mean_speed,
            stats.velocity_variance,
            stats.mean_neighbours,
            stats.pulled,
            stats.pushed
        );
        self.samples.push(stats);

        Some(stats)
    }

    pub fn latest(&self) -> Option<&FlockStats> {
        self.samples.last()
    }

    pub fn ticks(&self) -> u64 {
        self.render_ticker
    }

    pub fn restart(&mut self) {
        self.samples.clear();
        self.render_ticker = 0;
    }

    pub fn pop_data(&mut self) -> Vec<FlockStats> {
        mem::take(&mut self.samples)
    }

    fn should_sample(&mut self) -> bool {
        self.render_ticker += 1;

        self.render_ticker % self.sample_rate == 0
    }
}
