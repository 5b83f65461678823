use chrono::{DateTime, TimeDelta, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SeriesError};
use crate::state::measurement::Measurement;
use crate::state::series::Series;

/// Parameters for a synthetic series: Gaussian values sampled at a base
/// period whose every step is perturbed by Gaussian clock jitter.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub name: String,
    pub from: DateTime<Utc>,
    pub period: TimeDelta,
    pub samples: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub jitter: TimeDelta,
    pub seed: u64,
}

impl Simulation {
    pub fn new(
        name: impl Into<String>,
        from: DateTime<Utc>,
        period: TimeDelta,
        samples: usize,
    ) -> Self {
        Self {
            name: name.into(),
            from,
            period,
            samples,
            mean: 100.0,
            std_dev: 20.0,
            jitter: TimeDelta::zero(),
            seed: 0,
        }
    }

    pub fn values(mut self, mean: f64, std_dev: f64) -> Self {
        self.mean = mean;
        self.std_dev = std_dev;
        self
    }

    pub fn jitter(mut self, jitter: TimeDelta) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate the series. The first record sits one (jittered) period
    /// after `from`; the same seed always yields the same series.
    pub fn bulk(&self) -> Result<Series> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let jitter_ns = self.jitter.num_nanoseconds().unwrap_or(0) as f64;

        let mut series = Series::new(self.name.clone());
        let mut t = self.from;
        for _ in 0..self.samples {
            let offset = (sample_normal(&mut rng) * jitter_ns) as i64;
            let step = self.period + TimeDelta::nanoseconds(offset);
            t = t.checked_add_signed(step).ok_or_else(|| {
                SeriesError::Timestamp(format!("{t} + {step} overflows"))
            })?;
            let value = self.mean + self.std_dev * sample_normal(&mut rng);
            series.push(Measurement::new(t, value));
        }
        tracing::debug!(
            series = %series.name,
            samples = self.samples,
            seed = self.seed,
            "simulated series"
        );
        Ok(series)
    }
}

/// Standard normal sample via the Box-Muller transform.
fn sample_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-12);
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
