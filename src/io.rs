use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use serde::Serialize;

use crate::sim::{Observation, ObservationSet};
use crate::stats::ConditionalTable;
use crate::SimError;

pub const OUTPUT_SCHEMA_VERSION: &str = "1.0.0";

pub const DOWNTIME_COLUMN: &str = "Downtime_PlantA";
pub const DELAY_COLUMN: &str = "DeliveryDelay_RegionB";

pub const OBSERVATIONS_FILE: &str = "downtime_delay_simulation.csv";
pub const TABLE_FILE: &str = "conditional_delay.csv";
pub const CHART_FILE: &str = "conditional_delay.svg";
pub const SUMMARY_FILE: &str = "summary.json";
pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Serialize)]
struct ObservationRecord {
    downtime: u8,
    delay: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    pub schema_version: String,
    pub seed: u64,
    pub files: Vec<String>,
    pub note: String,
}

fn fmt_f64(v: f64) -> String {
    format!("{v:.10}")
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(fmt_f64).unwrap_or_default()
}

pub fn ensure_outdir(outdir: &Path) -> Result<(), SimError> {
    fs::create_dir_all(outdir)?;
    Ok(())
}

/// Fresh `<base>/<UTC timestamp>` directory; a numeric suffix avoids clashes.
///
/// Each candidate is claimed with a single `create_dir`, so concurrent runs
/// never share a directory.
pub fn create_timestamped_output_dir(base: &Path) -> Result<PathBuf, SimError> {
    ensure_outdir(base)?;

    let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let mut output_dir = base.join(&timestamp);
    let mut counter = 1_u32;

    loop {
        match fs::create_dir(&output_dir) {
            Ok(()) => return Ok(output_dir),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => {
                output_dir = base.join(format!("{timestamp}-{counter:02}"));
                counter += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Write the download format: header plus one `0`/`1` pair per row.
pub fn write_observations<W: Write>(writer: W, obs: &ObservationSet) -> Result<(), SimError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record([DOWNTIME_COLUMN, DELAY_COLUMN])?;
    for o in obs {
        wtr.serialize(ObservationRecord {
            downtime: o.downtime_flag(),
            delay: o.delay_flag(),
        })?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn encode_observations(obs: &ObservationSet) -> Result<Vec<u8>, SimError> {
    let mut buf = Vec::with_capacity(obs.len() * 4 + 40);
    write_observations(&mut buf, obs)?;
    Ok(buf)
}

pub fn write_observations_csv(path: &Path, obs: &ObservationSet) -> Result<(), SimError> {
    let file = File::create(path)?;
    write_observations(file, obs)?;
    log::info!("wrote {} observations to {}", obs.len(), path.display());
    Ok(())
}

/// Decode the download format.
///
/// The delay column of older exports was written as `0.0`/`1.0`; both
/// spellings are accepted.
pub fn read_observations<R: Read>(reader: R) -> Result<ObservationSet, SimError> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    let expected = StringRecord::from(vec![DOWNTIME_COLUMN, DELAY_COLUMN]);
    if headers != expected {
        return Err(SimError::MalformedCsv {
            line: 1,
            reason: format!(
                "expected header {DOWNTIME_COLUMN},{DELAY_COLUMN}, got {}",
                headers.iter().collect::<Vec<_>>().join(",")
            ),
        });
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let downtime = parse_flag(&record[0], DOWNTIME_COLUMN, line)?;
        let delay = parse_flag(&record[1], DELAY_COLUMN, line)?;
        rows.push(Observation::new(downtime, delay));
    }

    Ok(ObservationSet::from_rows(rows))
}

pub fn read_observations_csv(path: &Path) -> Result<ObservationSet, SimError> {
    let file = File::open(path)?;
    read_observations(file)
}

fn parse_flag(raw: &str, column: &str, line: u64) -> Result<bool, SimError> {
    match raw.trim() {
        "0" | "0.0" => Ok(false),
        "1" | "1.0" => Ok(true),
        other => Err(SimError::MalformedCsv {
            line,
            reason: format!("{column} must be 0 or 1, got '{other}'"),
        }),
    }
}

/// Crosstab behind the bar chart; empty groups leave blank rate cells.
pub fn write_conditional_table_csv(path: &Path, table: &ConditionalTable) -> Result<(), SimError> {
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_path(path)?;

    wtr.write_record([
        DOWNTIME_COLUMN,
        "rows",
        "delayed",
        "on_time_rate",
        "delay_rate",
    ])?;

    for (downtime, group) in table.groups() {
        wtr.write_record([
            u8::from(downtime).to_string(),
            group.rows.to_string(),
            group.delayed.to_string(),
            fmt_opt(group.on_time_rate()),
            fmt_opt(group.delay_rate()),
        ])?;
    }

    wtr.flush()?;
    log::info!("wrote conditional table to {}", path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SimError> {
    let payload = serde_json::to_string_pretty(value)?;
    fs::write(path, payload)?;
    log::info!("wrote {}", path.display());
    Ok(())
}

pub fn write_manifest_json(outdir: &Path, manifest: &Manifest) -> Result<PathBuf, SimError> {
    let path = outdir.join(MANIFEST_FILE);
    write_json(&path, manifest)?;
    Ok(path)
}
