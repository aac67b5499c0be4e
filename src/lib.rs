//! Downtime impact simulator
//!
//! Generates synthetic Plant A downtime flags and Region B delivery-delay
//! flags, where the delay probability of a row is elevated whenever the plant
//! was down. Each run is summarised by a conditional-frequency table and the
//! Pearson correlation between the two columns, and can be exported as CSV.

pub mod chart;
pub mod config;
pub mod io;
pub mod params;
pub mod report;
pub mod run;
pub mod sim;
pub mod stats;

use thiserror::Error;

// Re-export main types
pub use config::DashboardConfig;
pub use params::SimulationParameters;
pub use run::{ChartOutcome, ConditionalRate, OutputFiles, SimulationRun, SummaryReport};
pub use sim::{generate, Observation, ObservationSet, DEFAULT_SEED};
pub use stats::{pearson, summarize, ConditionalGroup, ConditionalTable, Correlation, SummaryStatistics};

#[derive(Debug, Error)]
pub enum SimError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed observation file at line {line}: {reason}")]
    MalformedCsv { line: u64, reason: String },
    #[error("chart rendering failed: {0}")]
    Chart(String),
}
