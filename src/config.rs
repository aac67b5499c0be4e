use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::OUTPUT_SCHEMA_VERSION;
use crate::params::SimulationParameters;
use crate::sim::DEFAULT_SEED;
use crate::SimError;

/// Bounds of the observation-count control
pub const SAMPLE_COUNT_RANGE: RangeInclusive<usize> = 100..=5000;
/// Bounds of every probability control
pub const PROBABILITY_RANGE: RangeInclusive<f64> = 0.0..=1.0;

pub const DEFAULT_CONFIG_FILE: &str = "default.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub schema_version: String,
    pub seed: u64,
    pub sample_count: usize,
    pub downtime_probability: f64,
    pub base_delay_probability: f64,
    pub elevated_delay_probability: f64,
    pub render_chart: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let params = SimulationParameters::default_params();
        Self {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            seed: DEFAULT_SEED,
            sample_count: params.sample_count,
            downtime_probability: params.downtime_probability,
            base_delay_probability: params.base_delay_probability,
            elevated_delay_probability: params.elevated_delay_probability,
            render_chart: true,
        }
    }
}

impl DashboardConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, SimError> {
        let cfg: DashboardConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, SimError> {
        let raw = fs::read_to_string(path)?;
        let cfg = Self::from_toml_str(&raw).map_err(|err| match err {
            SimError::InvalidConfig(msg) => {
                SimError::InvalidConfig(format!("{}: {msg}", path.display()))
            }
            other => other,
        })?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.schema_version != OUTPUT_SCHEMA_VERSION {
            return Err(SimError::InvalidConfig(format!(
                "schema_version {} does not match {OUTPUT_SCHEMA_VERSION}",
                self.schema_version
            )));
        }

        if !SAMPLE_COUNT_RANGE.contains(&self.sample_count) {
            return Err(SimError::InvalidConfig(format!(
                "sample_count must be in [{}, {}], got {}",
                SAMPLE_COUNT_RANGE.start(),
                SAMPLE_COUNT_RANGE.end(),
                self.sample_count
            )));
        }

        for (name, p) in self.parameters().probabilities() {
            if !PROBABILITY_RANGE.contains(&p) {
                return Err(SimError::InvalidConfig(format!(
                    "{name} must be in [{:.1}, {:.1}], got {p}",
                    PROBABILITY_RANGE.start(),
                    PROBABILITY_RANGE.end()
                )));
            }
        }

        Ok(())
    }

    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            sample_count: self.sample_count,
            downtime_probability: self.downtime_probability,
            base_delay_probability: self.base_delay_probability,
            elevated_delay_probability: self.elevated_delay_probability,
        }
    }
}

/// `configs/default.toml` from the working directory, then from the crate
/// directory. `None` when neither exists.
pub fn resolve_default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("configs").join(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("configs")
        .join(DEFAULT_CONFIG_FILE);
    bundled.exists().then_some(bundled)
}
