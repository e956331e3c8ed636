use glam::DVec2;
use rand::Rng;

use crate::{
    boid::{Boid, BoidMetadata},
    jitter::JitterSource,
    options::{OptionsError, RunOptions},
};

pub mod pairwise;

use pairwise::PairwiseState;

/// A fixed size population of boids together with the bookkeeping of the
/// last step. Boid order carries no meaning.
#[derive(Debug, Clone)]
pub struct Flock {
    boids: Vec<Boid>,
    metadata: Vec<BoidMetadata>,
}

impl Flock {
    pub fn new<R: Rng + ?Sized>(
        run_options: &RunOptions,
        rng: &mut R,
    ) -> Result<Self, OptionsError> {
        let boids = get_boids(run_options, rng)?;

        log::info!(
            "initialised flock of {} boids in a {} x {} field",
            boids.len(),
            run_options.field.width,
            run_options.field.height
        );

        Ok(Flock::from_boids(boids))
    }

    pub fn from_boids(boids: Vec<Boid>) -> Self {
        Flock {
            metadata: vec![Default::default(); boids.len()],
            boids,
        }
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = DVec2> + Clone + '_ {
        self.boids.iter().map(|b| b.position)
    }

    pub fn velocities(&self) -> impl ExactSizeIterator<Item = DVec2> + Clone + '_ {
        self.boids.iter().map(|b| b.velocity)
    }

    pub fn view(&self) -> &[Boid] {
        &self.boids
    }

    pub fn metadata(&self) -> &[BoidMetadata] {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Advances the flock by exactly one step.
    ///
    /// Positions move first using last step's velocities, then the pairwise
    /// distances are rebuilt from the new positions and every boid's next
    /// velocity is computed against that same snapshot. New velocities are
    /// only written back once all of them are known.
    pub fn update<J: JitterSource + ?Sized>(&mut self, run_options: &RunOptions, jitter: &mut J) {
        // position advance
        for boid in self.boids.iter_mut() {
            boid.update_location(jitter.sample(), &run_options.field);
        }

        let positions: Vec<DVec2> = self.positions().collect();
        let pairwise = PairwiseState::compute(&positions);

        let mut velocities: Vec<DVec2> = Vec::with_capacity(self.boids.len());
        let mut metadata: Vec<BoidMetadata> = Vec::with_capacity(self.boids.len());
        let mut neighbours: Vec<&Boid> = Vec::new();

        // calculation loop
        for (i_cur, b_current) in self.boids.iter().enumerate() {
            neighbours.clear();
            neighbours.extend(
                pairwise
                    .neighbours(i_cur, run_options.neighbourhood_radius)
                    .map(|j| &self.boids[j]),
            );

            let (velocity, band) = b_current.run_rules(&neighbours, run_options);
            velocities.push(velocity);
            metadata.push(BoidMetadata {
                n_neighbours: neighbours.len(),
                band,
            });
        }

        // commit
        for (boid, velocity) in self.boids.iter_mut().zip(velocities) {
            boid.velocity = velocity;
        }
        self.metadata = metadata;

        log::trace!("stepped flock of {} boids", self.boids.len());
    }

    /// Redraws every boid, the population size stays the same
    pub fn restart<R: Rng + ?Sized>(
        &mut self,
        run_options: &RunOptions,
        rng: &mut R,
    ) -> Result<(), OptionsError> {
        let run_options = RunOptions {
            init_boids: self.boids.len(),
            ..run_options.clone()
        };
        *self = Flock::from_boids(get_boids(&run_options, rng)?);

        Ok(())
    }
}

fn get_boids<R: Rng + ?Sized>(
    run_options: &RunOptions,
    rng: &mut R,
) -> Result<Vec<Boid>, OptionsError> {
    run_options.validate()?;

    Ok((0..run_options.init_boids)
        .map(|_| Boid::random(run_options, rng))
        .collect())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    use super::Flock;
    use crate::{
        boid::{Band, Boid},
        jitter::{NoJitter, UniformJitter},
        options::{FieldSize, OptionsError, RunOptions, CENTERING_WEIGHT},
    };

    fn seeded_flock(run_options: &RunOptions, seed: u64) -> Flock {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        Flock::new(run_options, &mut rng).unwrap()
    }

    #[test]
    fn initialises_requested_population() {
        let run_options = RunOptions::default();
        let flock = seeded_flock(&run_options, 1);

        assert_eq!(flock.len(), 200);
        assert_eq!(flock.positions().len(), 200);
        assert_eq!(flock.velocities().len(), 200);
        assert_eq!(flock.metadata().len(), 200);
    }

    #[test]
    fn rejects_invalid_options() {
        let run_options = RunOptions {
            field: FieldSize::new(0., 1080.),
            ..Default::default()
        };
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);

        assert!(matches!(
            Flock::new(&run_options, &mut rng),
            Err(OptionsError::InvalidField { .. })
        ));
    }

    #[test]
    fn positions_stay_in_field() {
        let run_options = RunOptions {
            field: FieldSize::new(300., 200.),
            init_boids: 120,
            ..Default::default()
        };
        let mut flock = seeded_flock(&run_options, 2);
        let mut jitter =
            UniformJitter::new(Xoshiro256PlusPlus::seed_from_u64(3), &run_options.jitter);

        for _ in 0..200 {
            flock.update(&run_options, &mut jitter);

            for p in flock.positions() {
                assert!(p.x >= 0. && p.x < run_options.field.width);
                assert!(p.y >= 0. && p.y < run_options.field.height);
            }
        }
    }

    #[test]
    fn step_without_jitter_is_deterministic() {
        let run_options = RunOptions::default();
        let flock = seeded_flock(&run_options, 4);

        let mut a = flock.clone();
        let mut b = flock.clone();
        a.update(&run_options, &mut NoJitter);
        b.update(&run_options, &mut NoJitter);

        assert_eq!(a.view(), b.view());
    }

    #[test]
    fn step_is_invariant_under_permutation() {
        let run_options = RunOptions::default();
        let flock = seeded_flock(&run_options, 5);

        let mut forward = flock.clone();
        let mut reversed = Flock::from_boids(flock.view().iter().rev().copied().collect());
        forward.update(&run_options, &mut NoJitter);
        reversed.update(&run_options, &mut NoJitter);

        for (a, b) in forward.view().iter().zip(reversed.view().iter().rev()) {
            assert_eq!(a.position, b.position);
            assert_relative_eq!(a.velocity.x, b.velocity.x, epsilon = 1e-9);
            assert_relative_eq!(a.velocity.y, b.velocity.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn velocities_use_a_consistent_snapshot() {
        // two boids closing to 10 apart, both see the other's old velocity,
        // so the outcome is mirrored
        let run_options = RunOptions::default();
        let mut flock = Flock::from_boids(vec![
            Boid::new(500., 500., DVec2::new(1., 0.)),
            Boid::new(512., 500., DVec2::new(-1., 0.)),
        ]);

        flock.update(&run_options, &mut NoJitter);

        let v = flock.view();
        assert_eq!(v[0].position, DVec2::new(501., 500.));
        assert_eq!(v[1].position, DVec2::new(511., 500.));
        assert_relative_eq!(v[0].velocity.x, -v[1].velocity.x, epsilon = 1e-12);
        assert_relative_eq!(v[0].velocity.y, 0., epsilon = 1e-12);
    }

    #[test]
    fn pair_in_dead_zone_gets_no_correction() {
        let run_options = RunOptions::default();
        // 30 apart: each offset to the centre is 15, in [R/4, R/2]
        let mut flock = Flock::from_boids(vec![
            Boid::new(500., 500., DVec2::ZERO),
            Boid::new(530., 500., DVec2::ZERO),
        ]);

        flock.update(&run_options, &mut NoJitter);

        assert!(flock.velocities().all(|v| v == DVec2::ZERO));
        assert!(flock.metadata().iter().all(|m| m.band == Band::DeadZone));
        assert!(flock.metadata().iter().all(|m| m.n_neighbours == 2));
    }

    #[test]
    fn close_pair_is_pushed_apart() {
        let run_options = RunOptions::default();
        // 10 apart: each offset to the centre is 5, below R/4
        let mut flock = Flock::from_boids(vec![
            Boid::new(500., 500., DVec2::ZERO),
            Boid::new(510., 500., DVec2::ZERO),
        ]);

        flock.update(&run_options, &mut NoJitter);

        let v = flock.view();
        assert_relative_eq!(v[0].velocity.x, -5. * CENTERING_WEIGHT, epsilon = 1e-12);
        assert_relative_eq!(v[1].velocity.x, 5. * CENTERING_WEIGHT, epsilon = 1e-12);
        assert!(flock.metadata().iter().all(|m| m.band == Band::Push));
    }

    #[test]
    fn spread_neighbourhood_pulls_towards_centre() {
        let run_options = RunOptions::default();
        let mut flock = Flock::from_boids(vec![
            Boid::new(500., 500., DVec2::ZERO),
            Boid::new(535., 500., DVec2::ZERO),
            Boid::new(535., 500., DVec2::ZERO),
        ]);

        flock.update(&run_options, &mut NoJitter);

        // centre of the first boid's neighbourhood is 70/3 away, beyond R/2
        let first = flock.view()[0];
        assert_relative_eq!(first.velocity.x, 70. / 3. * CENTERING_WEIGHT, epsilon = 1e-9);
        assert_eq!(flock.metadata()[0].band, Band::Pull);
    }

    #[test]
    fn distant_boids_ignore_each_other() {
        let run_options = RunOptions::default();
        let mut flock = Flock::from_boids(vec![
            Boid::new(100., 100., DVec2::new(1., 0.)),
            Boid::new(300., 300., DVec2::new(0., 1.)),
        ]);

        flock.update(&run_options, &mut NoJitter);

        let v = flock.view();
        assert_relative_eq!(v[0].velocity.x, 1., epsilon = 1e-12);
        assert_relative_eq!(v[1].velocity.y, 1., epsilon = 1e-12);
        assert!(flock.metadata().iter().all(|m| m.n_neighbours == 1));
    }

    #[test]
    fn restart_keeps_population_size() {
        let run_options = RunOptions {
            init_boids: 17,
            ..Default::default()
        };
        let mut flock = seeded_flock(&run_options, 6);
        let before = flock.view().to_vec();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);

        flock
            .restart(&RunOptions { init_boids: 3, ..run_options.clone() }, &mut rng)
            .unwrap();

        assert_eq!(flock.len(), 17);
        assert_ne!(flock.view(), &before[..]);
    }

    #[test]
    fn empty_flock_steps_without_effect() {
        let mut flock = Flock::from_boids(Vec::new());

        flock.update(&RunOptions::default(), &mut NoJitter);

        assert!(flock.is_empty());
    }
}
