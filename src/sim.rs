//! Conditional Bernoulli generator
//!
//! Generates synthetic downtime/delay pairs where the delay distribution of a
//! row depends on the downtime outcome of the same row.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Bernoulli, Distribution};

use crate::params::SimulationParameters;
use crate::SimError;

/// Seed used when none is given
pub const DEFAULT_SEED: u64 = 42;

/// One generated row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Observation {
    pub downtime: bool,
    pub delay: bool,
}

impl Observation {
    pub fn new(downtime: bool, delay: bool) -> Self {
        Self { downtime, delay }
    }

    pub fn downtime_flag(&self) -> u8 {
        u8::from(self.downtime)
    }

    pub fn delay_flag(&self) -> u8 {
        u8::from(self.delay)
    }
}

/// Ordered, immutable sequence of observations from one run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObservationSet {
    rows: Vec<Observation>,
}

impl ObservationSet {
    pub fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.rows
    }

    pub fn downtime_flags(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().map(Observation::downtime_flag)
    }

    pub fn delay_flags(&self) -> impl Iterator<Item = u8> + '_ {
        self.rows.iter().map(Observation::delay_flag)
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Joint distribution of one row
#[derive(Debug, Clone, Copy)]
pub struct ConditionalBernoulli {
    downtime: Bernoulli,
    base_delay: Bernoulli,
    elevated_delay: Bernoulli,
}

impl ConditionalBernoulli {
    pub fn new(params: &SimulationParameters) -> Result<Self, SimError> {
        let bernoulli = |name: &str, p: f64| {
            Bernoulli::new(p).map_err(|err| {
                SimError::InvalidParameters(format!("{name} = {p} rejected: {err}"))
            })
        };

        Ok(Self {
            downtime: bernoulli("downtime_probability", params.downtime_probability)?,
            base_delay: bernoulli("base_delay_probability", params.base_delay_probability)?,
            elevated_delay: bernoulli(
                "elevated_delay_probability",
                params.elevated_delay_probability,
            )?,
        })
    }
}

impl Distribution<Observation> for ConditionalBernoulli {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Observation {
        let downtime = self.downtime.sample(rng);
        let delay = if downtime {
            self.elevated_delay.sample(rng)
        } else {
            self.base_delay.sample(rng)
        };
        Observation { downtime, delay }
    }
}

/// Generate `params.sample_count` rows from a PRNG seeded with `seed`.
///
/// Draws are interleaved per row (downtime, then delay), so the same
/// parameters and seed always give the same set.
pub fn generate(params: &SimulationParameters, seed: u64) -> Result<ObservationSet, SimError> {
    params.validate()?;
    let dist = ConditionalBernoulli::new(params)?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let rows: Vec<Observation> = (0..params.sample_count)
        .map(|_| dist.sample(&mut rng))
        .collect();

    log::debug!(
        "generated {} rows (seed {seed}, p_down {}, p_base {}, p_elevated {})",
        rows.len(),
        params.downtime_probability,
        params.base_delay_probability,
        params.elevated_delay_probability
    );

    Ok(ObservationSet { rows })
}
