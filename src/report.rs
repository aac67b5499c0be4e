//! Terminal rendering of the dashboard panels
//!
//! The conditional table, the correlation metric and the optional raw-data
//! listing, as plain text.

use crate::io::{DELAY_COLUMN, DOWNTIME_COLUMN};
use crate::params::SimulationParameters;
use crate::sim::ObservationSet;
use crate::stats::{ConditionalTable, Correlation, SummaryStatistics};

pub const CORRELATION_LABEL: &str = "Correlation between Downtime and Delivery Delay";

fn fmt_rate(v: Option<f64>) -> String {
    match v {
        Some(x) => format!("{x:.3}"),
        None => "n/a".to_string(),
    }
}

pub fn render_parameters(params: &SimulationParameters, seed: u64) -> String {
    [
        "Simulation settings:".to_string(),
        format!("  Number of observations:          {}", params.sample_count),
        format!("  Downtime probability:            {:.2}", params.downtime_probability),
        format!("  Delay probability (no downtime): {:.2}", params.base_delay_probability),
        format!("  Delay probability (downtime):    {:.2}", params.elevated_delay_probability),
        format!("  Seed:                            {seed}"),
    ]
    .iter()
    .map(|line| format!("{line}\n"))
    .collect()
}

pub fn render_table(table: &ConditionalTable) -> String {
    let mut out = String::from("Conditional delivery delays:\n");
    out.push_str(&format!(
        "  {:<16} {:>6} {:>8} {:>8}\n",
        DOWNTIME_COLUMN, "rows", "delay=0", "delay=1"
    ));
    for (downtime, group) in table.groups() {
        out.push_str(&format!(
            "  {:<16} {:>6} {:>8} {:>8}\n",
            u8::from(downtime),
            group.rows,
            fmt_rate(group.on_time_rate()),
            fmt_rate(group.delay_rate())
        ));
    }
    out
}

pub fn render_metric(correlation: &Correlation) -> String {
    format!("{CORRELATION_LABEL}: {correlation}")
}

pub fn render_raw(obs: &ObservationSet) -> String {
    let mut out = format!("{:>6}  {}  {}\n", "", DOWNTIME_COLUMN, DELAY_COLUMN);
    for (idx, o) in obs.iter().enumerate() {
        out.push_str(&format!(
            "{idx:>6}  {:>width_d$}  {:>width_y$}\n",
            o.downtime_flag(),
            o.delay_flag(),
            width_d = DOWNTIME_COLUMN.len(),
            width_y = DELAY_COLUMN.len()
        ));
    }
    out
}

pub fn render_summary(summary: &SummaryStatistics) -> String {
    let mut out = render_table(&summary.table);
    out.push('\n');
    out.push_str(&render_metric(&summary.correlation));
    out.push('\n');
    out
}
