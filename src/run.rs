//! One simulation run
//!
//! Every parameter change produces a fresh `SimulationRun`: generation,
//! summary and artifacts are recomputed from scratch and nothing is carried
//! over from earlier runs.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::chart::render_conditional_chart;
use crate::io::{
    create_timestamped_output_dir, encode_observations, write_conditional_table_csv, write_json,
    write_manifest_json, write_observations_csv, Manifest, CHART_FILE, OBSERVATIONS_FILE,
    OUTPUT_SCHEMA_VERSION, SUMMARY_FILE, TABLE_FILE,
};
use crate::params::SimulationParameters;
use crate::sim::{generate, ObservationSet};
use crate::stats::{summarize, ConditionalTable, Correlation, SummaryStatistics};
use crate::SimError;

/// Per-group rates as exported; `None` (JSON `null`) for an empty group
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConditionalRate {
    pub downtime: u8,
    pub on_time_rate: Option<f64>,
    pub delay_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub schema_version: String,
    pub seed: u64,
    pub parameters: SimulationParameters,
    pub table: ConditionalTable,
    pub rates: Vec<ConditionalRate>,
    pub correlation: Correlation,
    pub correlation_display: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputFiles {
    pub output_dir: PathBuf,
    pub observations_path: PathBuf,
    pub table_path: PathBuf,
    pub summary_path: PathBuf,
    pub manifest_path: PathBuf,
    pub chart: ChartOutcome,
}

impl OutputFiles {
    pub fn chart_path(&self) -> Option<&Path> {
        match &self.chart {
            ChartOutcome::Rendered(path) => Some(path),
            _ => None,
        }
    }
}

/// What happened to the bar chart of a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum ChartOutcome {
    Rendered(PathBuf),
    Disabled,
    /// Rendering failed; the data files were still written
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SimulationRun {
    pub params: SimulationParameters,
    pub seed: u64,
    pub observations: ObservationSet,
    pub summary: SummaryStatistics,
}

impl SimulationRun {
    pub fn execute(params: SimulationParameters, seed: u64) -> Result<Self, SimError> {
        let observations = generate(&params, seed)?;
        let summary = summarize(&observations);
        Ok(Self {
            params,
            seed,
            observations,
            summary,
        })
    }

    /// The download payload for this run
    pub fn csv_bytes(&self) -> Result<Vec<u8>, SimError> {
        encode_observations(&self.observations)
    }

    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
            seed: self.seed,
            parameters: self.params,
            table: self.summary.table,
            rates: self
                .summary
                .table
                .groups()
                .into_iter()
                .map(|(downtime, group)| ConditionalRate {
                    downtime: u8::from(downtime),
                    on_time_rate: group.on_time_rate(),
                    delay_rate: group.delay_rate(),
                })
                .collect(),
            correlation: self.summary.correlation,
            correlation_display: self.summary.correlation.to_string(),
        }
    }

    /// Write all artifacts into `output_dir`.
    ///
    /// A chart failure does not abort the run: it is reported as
    /// `ChartOutcome::Failed` and the chart is left out of the manifest.
    pub fn write_outputs(
        &self,
        output_dir: &Path,
        render_chart: bool,
    ) -> Result<OutputFiles, SimError> {
        let observations_path = output_dir.join(OBSERVATIONS_FILE);
        let table_path = output_dir.join(TABLE_FILE);
        let summary_path = output_dir.join(SUMMARY_FILE);

        write_observations_csv(&observations_path, &self.observations)?;
        write_conditional_table_csv(&table_path, &self.summary.table)?;
        write_json(&summary_path, &self.report())?;

        let chart = if render_chart {
            let path = output_dir.join(CHART_FILE);
            match render_conditional_chart(&self.summary.table, &path) {
                Ok(()) => ChartOutcome::Rendered(path),
                Err(err) => {
                    log::warn!("chart not rendered: {err}");
                    ChartOutcome::Failed(err.to_string())
                }
            }
        } else {
            ChartOutcome::Disabled
        };

        let mut files = vec![
            OBSERVATIONS_FILE.to_string(),
            TABLE_FILE.to_string(),
            SUMMARY_FILE.to_string(),
        ];
        if matches!(chart, ChartOutcome::Rendered(_)) {
            files.push(CHART_FILE.to_string());
        }

        let manifest_path = write_manifest_json(
            output_dir,
            &Manifest {
                schema_version: OUTPUT_SCHEMA_VERSION.to_string(),
                seed: self.seed,
                files,
                note: "Synthetic downtime/delivery-delay observations".to_string(),
            },
        )?;

        Ok(OutputFiles {
            output_dir: output_dir.to_path_buf(),
            observations_path,
            table_path,
            summary_path,
            manifest_path,
            chart,
        })
    }

    /// Like `write_outputs`, into a fresh timestamped directory under `base`
    pub fn write_outputs_under(
        &self,
        base: &Path,
        render_chart: bool,
    ) -> Result<OutputFiles, SimError> {
        let output_dir = create_timestamped_output_dir(base)?;
        self.write_outputs(&output_dir, render_chart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{read_observations, MANIFEST_FILE};
    use crate::sim::DEFAULT_SEED;

    fn manifest_files(dir: &Path) -> Vec<String> {
        let raw = std::fs::read_to_string(dir.join(MANIFEST_FILE)).unwrap();
        let manifest: serde_json::Value = serde_json::from_str(&raw).unwrap();
        manifest["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn csv_payload_decodes_to_run_observations() {
        let run = SimulationRun::execute(SimulationParameters::default(), DEFAULT_SEED).unwrap();
        let bytes = run.csv_bytes().unwrap();
        let decoded = read_observations(bytes.as_slice()).unwrap();
        assert_eq!(decoded, run.observations);
        assert_eq!(summarize(&decoded), run.summary);
    }

    #[test]
    fn report_carries_formatted_metric() {
        let run = SimulationRun::execute(SimulationParameters::default(), DEFAULT_SEED).unwrap();
        let report = run.report();
        assert_eq!(report.correlation_display, "0.223");
        assert_eq!(report.seed, DEFAULT_SEED);
        assert_eq!(report.parameters, run.params);
    }

    #[test]
    fn runs_are_independent_recomputations() {
        let a = SimulationRun::execute(SimulationParameters::default(), 1).unwrap();
        let changed = SimulationParameters {
            downtime_probability: 0.5,
            ..SimulationParameters::default()
        };
        let b = SimulationRun::execute(changed, 1).unwrap();
        let again = SimulationRun::execute(SimulationParameters::default(), 1).unwrap();
        assert_ne!(a.observations, b.observations);
        assert_eq!(a.observations, again.observations);
    }

    #[test]
    fn chart_failure_is_reported_and_keeps_data_files() {
        let dir = tempfile::tempdir().unwrap();
        // a directory at the chart path makes the SVG write fail
        std::fs::create_dir(dir.path().join(CHART_FILE)).unwrap();

        let run = SimulationRun::execute(SimulationParameters::default(), DEFAULT_SEED).unwrap();
        let files = run.write_outputs(dir.path(), true).unwrap();

        assert!(matches!(files.chart, ChartOutcome::Failed(ref reason) if !reason.is_empty()));
        assert!(files.chart_path().is_none());
        assert!(files.observations_path.exists());
        assert!(files.summary_path.exists());
        assert!(!manifest_files(dir.path()).contains(&CHART_FILE.to_string()));
    }

    #[test]
    fn disabled_chart_is_not_attempted() {
        let dir = tempfile::tempdir().unwrap();
        let run = SimulationRun::execute(SimulationParameters::default(), DEFAULT_SEED).unwrap();
        let files = run.write_outputs(dir.path(), false).unwrap();

        assert!(matches!(files.chart, ChartOutcome::Disabled));
        assert!(!dir.path().join(CHART_FILE).exists());
        assert_eq!(manifest_files(dir.path()).len(), 3);
    }
}
