//! Conditional-frequency bar chart
//!
//! One stacked bar per downtime group: the share of on-time rows at the
//! bottom and the share of delayed rows on top. Empty groups get no bar.

use std::fmt::Display;
use std::path::Path;

use plotters::prelude::*;

use crate::stats::ConditionalTable;
use crate::SimError;

const BAR_HALF_WIDTH: f64 = 0.3;

/// One filled rectangle of the chart, in data coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSegment {
    pub downtime: bool,
    pub delayed: bool,
    pub bottom: f64,
    pub top: f64,
}

impl BarSegment {
    pub fn center(&self) -> f64 {
        if self.downtime {
            1.0
        } else {
            0.0
        }
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

pub fn bar_segments(table: &ConditionalTable) -> Vec<BarSegment> {
    let mut segments = Vec::with_capacity(4);
    for (downtime, group) in table.groups() {
        let (Some(on_time), Some(_)) = (group.on_time_rate(), group.delay_rate()) else {
            continue;
        };
        segments.push(BarSegment {
            downtime,
            delayed: false,
            bottom: 0.0,
            top: on_time,
        });
        segments.push(BarSegment {
            downtime,
            delayed: true,
            bottom: on_time,
            top: 1.0,
        });
    }
    segments
}

fn axis_label(x: &f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() < 1e-9 && (rounded == 0.0 || rounded == 1.0) {
        format!("downtime = {rounded:.0}")
    } else {
        String::new()
    }
}

fn chart_err<E: Display>(err: E) -> SimError {
    SimError::Chart(err.to_string())
}

pub fn render_conditional_chart(table: &ConditionalTable, path: &Path) -> Result<(), SimError> {
    let segments = bar_segments(table);

    let root = SVGBackend::new(path, (960, 540)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Conditional Delivery Delays by Plant Downtime",
            ("sans-serif", 28).into_font(),
        )
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5_f64..1.5_f64, 0.0_f64..1.0_f64)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(5)
        .x_label_formatter(&axis_label)
        .x_desc("Downtime_PlantA")
        .y_desc("Share of rows")
        .draw()
        .map_err(chart_err)?;

    let on_time_style = BLUE.mix(0.75).filled();
    let delayed_style = RED.mix(0.75).filled();

    for (delayed, style, label) in [
        (false, on_time_style, "DeliveryDelay_RegionB = 0"),
        (true, delayed_style, "DeliveryDelay_RegionB = 1"),
    ] {
        chart
            .draw_series(segments.iter().filter(|s| s.delayed == delayed).map(|s| {
                Rectangle::new(
                    [
                        (s.center() - BAR_HALF_WIDTH, s.bottom),
                        (s.center() + BAR_HALF_WIDTH, s.top),
                    ],
                    style,
                )
            }))
            .map_err(chart_err)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 16, y + 6)], style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK)
        .background_style(WHITE.mix(0.8))
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    log::info!("wrote conditional chart to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ConditionalGroup;

    #[test]
    fn segments_stack_to_full_height() {
        let table = ConditionalTable {
            no_downtime: ConditionalGroup { rows: 8, delayed: 2 },
            downtime: ConditionalGroup { rows: 4, delayed: 3 },
        };
        let segments = bar_segments(&table);
        assert_eq!(segments.len(), 4);

        let delayed_at_downtime = segments
            .iter()
            .find(|s| s.downtime && s.delayed)
            .unwrap();
        assert!((delayed_at_downtime.height() - 0.75).abs() < 1e-12);
        assert_eq!(delayed_at_downtime.center(), 1.0);

        for downtime in [false, true] {
            let total: f64 = segments
                .iter()
                .filter(|s| s.downtime == downtime)
                .map(BarSegment::height)
                .sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_group_has_no_bar() {
        let table = ConditionalTable {
            no_downtime: ConditionalGroup { rows: 5, delayed: 0 },
            downtime: ConditionalGroup::default(),
        };
        let segments = bar_segments(&table);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| !s.downtime));
    }

    #[test]
    fn only_group_positions_are_labelled() {
        assert_eq!(axis_label(&0.0), "downtime = 0");
        assert_eq!(axis_label(&1.0), "downtime = 1");
        assert_eq!(axis_label(&0.5), "");
        assert_eq!(axis_label(&-0.5), "");
    }

    #[test]
    fn renders_svg_with_one_empty_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        let table = ConditionalTable {
            no_downtime: ConditionalGroup { rows: 10, delayed: 4 },
            downtime: ConditionalGroup::default(),
        };

        match render_conditional_chart(&table, &path) {
            Ok(()) => {
                let svg = std::fs::read_to_string(&path).unwrap();
                assert!(svg.trim_start().starts_with("<svg"));
                assert!(svg.contains("<rect"));
            }
            // only text layout may fail, on hosts without fonts
            Err(err) => assert!(matches!(err, SimError::Chart(_)), "{err}"),
        }
    }
}
