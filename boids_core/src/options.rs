use thiserror::Error;

/// Weight of a boid's own previous velocity in the velocity blend
pub const PERSISTENCE_WEIGHT: f64 = 0.6;
/// Weight of the neighbourhood's average velocity (alignment)
pub const ALIGNMENT_WEIGHT: f64 = 0.4;
/// Weight of the centering correction (cohesion / mild repulsion)
pub const CENTERING_WEIGHT: f64 = 0.02;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub init_boids: usize,
    pub field: FieldSize,
    /// bound of each initial velocity component, drawn from [-max, max]
    pub max_init_speed: f64,
    /// neighbour inclusion threshold, also drives the centering band (R/4, R/2)
    pub neighbourhood_radius: f64,
    pub jitter: JitterRange,
    /// ticks in between two birdwatcher samples
    pub sample_rate: u64,
}

impl RunOptions {
    /// Checks everything the flock initialisation and the step rely on
    pub fn validate(&self) -> Result<(), OptionsError> {
        let FieldSize { width, height } = self.field;
        if !(width.is_finite() && height.is_finite() && width > 0. && height > 0.) {
            return Err(OptionsError::InvalidField { width, height });
        }

        if !(self.max_init_speed.is_finite() && self.max_init_speed >= 0.) {
            return Err(OptionsError::InvalidSpeed(self.max_init_speed));
        }

        if !(self.neighbourhood_radius.is_finite() && self.neighbourhood_radius >= 0.) {
            return Err(OptionsError::InvalidRadius(self.neighbourhood_radius));
        }

        let JitterRange { low, high } = self.jitter;
        if !(low.is_finite() && high.is_finite() && low <= high) {
            return Err(OptionsError::InvalidJitter { low, high });
        }

        if self.sample_rate == 0 {
            return Err(OptionsError::InvalidSampleRate);
        }

        Ok(())
    }

    /// half of the neighbourhood radius, beyond it boids get pulled to the centre
    pub fn pull_threshold(&self) -> f64 {
        self.neighbourhood_radius / 2.
    }

    /// quarter of the neighbourhood radius, below it boids get pushed away
    pub fn push_threshold(&self) -> f64 {
        self.neighbourhood_radius / 4.
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            init_boids: 200,
            field: FieldSize::new(1080., 1080.),
            max_init_speed: 5.,
            neighbourhood_radius: 40.,
            jitter: JitterRange {
                low: 0.7,
                high: 1.3,
            },
            sample_rate: 60,
        }
    }
}

/// Dimensions of the toroidal field, positions live in [0, width) x [0, height)
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct FieldSize {
    pub width: f64,
    pub height: f64,
}

impl FieldSize {
    pub fn new(width: f64, height: f64) -> FieldSize {
        FieldSize { width, height }
    }
}

/// Inclusive range of the per-axis multiplier applied to positional advance
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct JitterRange {
    pub low: f64,
    pub high: f64,
}

impl JitterRange {
    pub const NONE: JitterRange = JitterRange { low: 1., high: 1. };
}

#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    #[error("field must have positive finite dimensions, got {width} x {height}")]
    InvalidField { width: f64, height: f64 },
    #[error("max initial speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),
    #[error("neighbourhood radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),
    #[error("jitter range must be finite with low <= high, got [{low}, {high}]")]
    InvalidJitter { low: f64, high: f64 },
    #[error("sample rate must be at least 1")]
    InvalidSampleRate,
}
