//! Downtime Sweep Example
//!
//! Sweeps the downtime probability with fixed delay probabilities and prints
//! how the conditional delay rates and the correlation respond.

use downtime_impact::report::CORRELATION_LABEL;
use downtime_impact::{generate, summarize, SimulationParameters, SimError, DEFAULT_SEED};

fn fmt_rate(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.3}")).unwrap_or_else(|| "n/a".to_string())
}

fn main() -> Result<(), SimError> {
    println!("Running downtime probability sweep...\n");

    let base = SimulationParameters::default();
    println!("Configuration:");
    println!("  Observations: {}", base.sample_count);
    println!("  Delay probability (no downtime): {}", base.base_delay_probability);
    println!("  Delay probability (downtime):    {}", base.elevated_delay_probability);
    println!("  Seed: {DEFAULT_SEED}");
    println!();

    println!(
        "{:>10} {:>10} {:>14} {:>14} {:>12}",
        "p_down", "downtimes", "delay|down=0", "delay|down=1", "correlation"
    );

    for step in 0..=10 {
        let params = SimulationParameters {
            downtime_probability: step as f64 / 10.0,
            ..base
        };
        let obs = generate(&params, DEFAULT_SEED)?;
        let summary = summarize(&obs);

        println!(
            "{:>10.1} {:>10} {:>14} {:>14} {:>12}",
            params.downtime_probability,
            summary.table.downtime.rows,
            fmt_rate(summary.table.no_downtime.delay_rate()),
            fmt_rate(summary.table.downtime.delay_rate()),
            summary.correlation.to_string()
        );
    }

    println!();
    println!("{CORRELATION_LABEL} is undefined at p_down = 0 and 1 (constant column).");
    Ok(())
}
