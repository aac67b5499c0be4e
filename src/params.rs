//! Simulation parameters
//!
//! The four inputs of a downtime/delay run: how many rows to draw, how often
//! Plant A goes down, and the delay probability in Region B with and without
//! a downtime on the same row.

use serde::{Deserialize, Serialize};

use crate::SimError;

/// Parameters for the conditional Bernoulli generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Number of observations to draw
    pub sample_count: usize,
    /// P(downtime = 1)
    pub downtime_probability: f64,
    /// P(delay = 1 | downtime = 0)
    pub base_delay_probability: f64,
    /// P(delay = 1 | downtime = 1)
    pub elevated_delay_probability: f64,
}

impl SimulationParameters {
    /// Create validated parameters
    pub fn new(
        sample_count: usize,
        downtime_probability: f64,
        base_delay_probability: f64,
        elevated_delay_probability: f64,
    ) -> Result<Self, SimError> {
        let params = Self {
            sample_count,
            downtime_probability,
            base_delay_probability,
            elevated_delay_probability,
        };
        params.validate()?;
        Ok(params)
    }

    /// Slider defaults of the downtime dashboard
    pub fn default_params() -> Self {
        Self {
            sample_count: 1000,
            downtime_probability: 0.10,
            base_delay_probability: 0.05,
            elevated_delay_probability: 0.30,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.sample_count == 0 {
            return Err(SimError::InvalidParameters(
                "sample_count must be greater than zero".to_string(),
            ));
        }

        for (name, p) in self.probabilities() {
            if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                return Err(SimError::InvalidParameters(format!(
                    "{name} must be in [0, 1], got {p}"
                )));
            }
        }

        Ok(())
    }

    /// Delay probability that applies to a row with the given downtime flag
    pub fn delay_probability(&self, downtime: bool) -> f64 {
        if downtime {
            self.elevated_delay_probability
        } else {
            self.base_delay_probability
        }
    }

    pub(crate) fn probabilities(&self) -> [(&'static str, f64); 3] {
        [
            ("downtime_probability", self.downtime_probability),
            ("base_delay_probability", self.base_delay_probability),
            ("elevated_delay_probability", self.elevated_delay_probability),
        ]
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::default_params()
    }
}
