//! Summary statistics over an observation set
//!
//! Conditional delay frequencies per downtime group and the Pearson
//! correlation between the two flag columns.

use std::fmt;

use serde::Serialize;

use crate::sim::ObservationSet;

/// Rows sharing one downtime value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConditionalGroup {
    pub rows: usize,
    pub delayed: usize,
}

impl ConditionalGroup {
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// P(delay = 1 | group), `None` for an empty group
    pub fn delay_rate(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.delayed as f64 / self.rows as f64)
        }
    }

    /// P(delay = 0 | group), `None` for an empty group
    pub fn on_time_rate(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some((self.rows - self.delayed) as f64 / self.rows as f64)
        }
    }
}

/// 2x2 conditional-frequency table indexed by downtime flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConditionalTable {
    pub no_downtime: ConditionalGroup,
    pub downtime: ConditionalGroup,
}

impl ConditionalTable {
    pub fn from_observations(obs: &ObservationSet) -> Self {
        let mut table = Self::default();
        for o in obs {
            let group = if o.downtime {
                &mut table.downtime
            } else {
                &mut table.no_downtime
            };
            group.rows += 1;
            if o.delay {
                group.delayed += 1;
            }
        }
        table
    }

    pub fn group(&self, downtime: bool) -> &ConditionalGroup {
        if downtime {
            &self.downtime
        } else {
            &self.no_downtime
        }
    }

    /// Groups in downtime order (0 first)
    pub fn groups(&self) -> [(bool, &ConditionalGroup); 2] {
        [(false, &self.no_downtime), (true, &self.downtime)]
    }

    pub fn total_rows(&self) -> usize {
        self.no_downtime.rows + self.downtime.rows
    }
}

/// Pearson coefficient, or the distinct undefined state for constant input
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Correlation {
    Coefficient(f64),
    Undefined,
}

impl Correlation {
    pub fn value(&self) -> Option<f64> {
        match self {
            Correlation::Coefficient(r) => Some(*r),
            Correlation::Undefined => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Correlation::Coefficient(_))
    }
}

impl fmt::Display for Correlation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Correlation::Coefficient(r) => write!(f, "{r:.3}"),
            Correlation::Undefined => f.write_str("undefined"),
        }
    }
}

/// Sample Pearson correlation of two equally long sequences.
///
/// Undefined when the lengths differ, when fewer than two points are given,
/// or when either sequence has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Correlation {
    if x.len() != y.len() || x.len() < 2 {
        return Correlation::Undefined;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    // the (n - 1) normalisation of covariance and both deviations cancels
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Correlation::Undefined;
    }

    Correlation::Coefficient((sxy / denom).clamp(-1.0, 1.0))
}

/// Read-only summary of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub sample_count: usize,
    pub table: ConditionalTable,
    pub correlation: Correlation,
}

pub fn summarize(obs: &ObservationSet) -> SummaryStatistics {
    let table = ConditionalTable::from_observations(obs);

    let downtime: Vec<f64> = obs.downtime_flags().map(f64::from).collect();
    let delay: Vec<f64> = obs.delay_flags().map(f64::from).collect();
    let correlation = pearson(&downtime, &delay);

    for (flag, group) in table.groups() {
        if group.is_empty() {
            log::warn!(
                "no rows with downtime = {}, conditional delay rate is undefined",
                u8::from(flag)
            );
        }
    }
    if !correlation.is_defined() {
        log::warn!("correlation is undefined: a flag column is constant");
    }

    SummaryStatistics {
        sample_count: obs.len(),
        table,
        correlation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimulationParameters;
    use crate::sim::{generate, Observation, DEFAULT_SEED};

    fn set(pairs: &[(u8, u8)]) -> ObservationSet {
        ObservationSet::from_rows(
            pairs
                .iter()
                .map(|&(d, y)| Observation::new(d == 1, y == 1))
                .collect(),
        )
    }

    #[test]
    fn table_counts_rows_per_group() {
        let obs = set(&[(0, 0), (0, 1), (0, 0), (0, 0), (1, 1), (1, 0)]);
        let table = ConditionalTable::from_observations(&obs);
        assert_eq!(table.no_downtime, ConditionalGroup { rows: 4, delayed: 1 });
        assert_eq!(table.downtime, ConditionalGroup { rows: 2, delayed: 1 });
        assert_eq!(table.group(false).delay_rate(), Some(0.25));
        assert_eq!(table.group(true).delay_rate(), Some(0.5));
        assert_eq!(table.total_rows(), 6);
    }

    #[test]
    fn group_rates_sum_to_one() {
        let p = SimulationParameters::new(2000, 0.35, 0.15, 0.55).unwrap();
        let summary = summarize(&generate(&p, 5).unwrap());
        for (_, group) in summary.table.groups() {
            let total = group.delay_rate().unwrap() + group.on_time_rate().unwrap();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_group_has_undefined_rate() {
        let obs = set(&[(1, 1), (1, 0), (1, 1)]);
        let table = ConditionalTable::from_observations(&obs);
        assert!(table.no_downtime.is_empty());
        assert_eq!(table.no_downtime.delay_rate(), None);
        assert_eq!(table.no_downtime.on_time_rate(), None);
        assert!((table.downtime.delay_rate().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn constant_column_gives_undefined_correlation() {
        let obs = set(&[(0, 0), (0, 1), (0, 1), (0, 0)]);
        let summary = summarize(&obs);
        assert_eq!(summary.correlation, Correlation::Undefined);
        assert_eq!(summary.correlation.to_string(), "undefined");
        assert_eq!(summary.correlation.value(), None);
    }

    #[test]
    fn perfectly_aligned_flags_correlate_fully() {
        assert_eq!(
            summarize(&set(&[(0, 0), (1, 1), (0, 0), (1, 1)])).correlation,
            Correlation::Coefficient(1.0)
        );
        assert_eq!(
            summarize(&set(&[(0, 1), (1, 0), (0, 1), (1, 0)])).correlation,
            Correlation::Coefficient(-1.0)
        );
    }

    #[test]
    fn pearson_matches_hand_computation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        // cov = 1.5, sd_x = 1.5811, sd_y = 1.2247 => r = 0.7746
        let r = pearson(&x, &y).value().unwrap();
        assert!((r - 0.774_596_669).abs() < 1e-6);
    }

    #[test]
    fn pearson_rejects_short_or_mismatched_input() {
        assert_eq!(pearson(&[1.0], &[1.0]), Correlation::Undefined);
        assert_eq!(pearson(&[1.0, 2.0], &[1.0]), Correlation::Undefined);
        assert_eq!(pearson(&[], &[]), Correlation::Undefined);
    }

    #[test]
    fn correlation_stays_within_unit_interval() {
        for seed in 0..20 {
            let p = SimulationParameters::new(300, 0.2, 0.1, 0.9).unwrap();
            let r = summarize(&generate(&p, seed).unwrap()).correlation;
            let v = r.value().unwrap();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn golden_default_summary() {
        let obs = generate(&SimulationParameters::default(), DEFAULT_SEED).unwrap();
        let summary = summarize(&obs);
        assert_eq!(summary.sample_count, 1000);
        assert_eq!(summary.table.downtime, ConditionalGroup { rows: 94, delayed: 24 });
        assert_eq!(summary.table.no_downtime, ConditionalGroup { rows: 906, delayed: 50 });
        assert_eq!(summary.correlation.to_string(), "0.223");
    }

    #[test]
    fn correlation_serializes_with_explicit_state() {
        let json = serde_json::to_string(&Correlation::Undefined).unwrap();
        assert_eq!(json, r#"{"state":"undefined"}"#);
        let json = serde_json::to_string(&Correlation::Coefficient(0.5)).unwrap();
        assert_eq!(json, r#"{"state":"coefficient","value":0.5}"#);
    }
}
