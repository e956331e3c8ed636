use birdwatcher::{Birdwatcher, FlockStats};
use flock::Flock;
use jitter::UniformJitter;
use options::{OptionsError, RunOptions};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

pub mod boid;
pub mod flock;
pub mod jitter;

pub mod birdwatcher;
pub mod math_helpers;
pub mod options;

/// Runs the simulation for `no_iter` steps without any rendering and returns
/// the statistics sampled along the way. The same seed always yields the
/// same samples.
pub fn run_headless(
    no_iter: u64,
    run_options: &RunOptions,
    seed: u64,
) -> Result<Vec<FlockStats>, OptionsError> {
    run_options.validate()?;
    let mut jitter =
        UniformJitter::new(Xoshiro256PlusPlus::seed_from_u64(seed), &run_options.jitter);

    let mut flock = Flock::new(run_options, jitter.rng_mut())?;
    let mut bird_watcher = Birdwatcher::new(run_options.sample_rate);

    (0..no_iter).for_each(|_| {
        flock.update(run_options, &mut jitter);
        bird_watcher.watch(&flock);
    });

    log::info!("headless run finished after {} ticks", no_iter);

    Ok(bird_watcher.pop_data())
}

#[cfg(test)]
mod tests {
    use super::run_headless;
    use crate::options::{JitterRange, OptionsError, RunOptions};

    #[test]
    fn headless_run_is_reproducible() {
        let run_options = RunOptions {
            init_boids: 50,
            sample_rate: 10,
            ..Default::default()
        };

        let a = run_headless(40, &run_options, 99).unwrap();
        let b = run_headless(40, &run_options, 99).unwrap();

        assert_eq!(a.len(), 4);
        assert_eq!(a, b);
    }

    #[test]
    fn headless_run_validates_first() {
        let run_options = RunOptions {
            jitter: JitterRange { low: 2., high: 1. },
            ..Default::default()
        };

        assert_eq!(
            run_headless(10, &run_options, 1),
            Err(OptionsError::InvalidJitter { low: 2., high: 1. })
        );
    }
}
