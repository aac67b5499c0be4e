use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use downtime_impact::config::resolve_default_config_path;
use downtime_impact::io::read_observations_csv;
use downtime_impact::report::{render_parameters, render_raw, render_summary};
use downtime_impact::{summarize, ChartOutcome, DashboardConfig, SimulationRun};

#[derive(Debug, Parser)]
#[command(name = "downtime-impact")]
#[command(version, about = "Downtime impact on delivery performance: conditional Bernoulli simulation")]
struct Cli {
    /// Debug-level logging
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a fresh observation set and write its artifacts
    Simulate(SimulateArgs),
    /// Summarise a previously downloaded observation CSV
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct SimulateArgs {
    /// TOML configuration (defaults to configs/default.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base directory; each run gets its own timestamped subdirectory
    #[arg(long, default_value = "output-downtime-impact")]
    outdir: PathBuf,

    #[arg(long)]
    seed: Option<u64>,

    /// Number of observations
    #[arg(long)]
    samples: Option<usize>,

    /// Probability of a Plant A downtime
    #[arg(long)]
    downtime_prob: Option<f64>,

    /// Delay probability without downtime
    #[arg(long)]
    base_delay_prob: Option<f64>,

    /// Delay probability with downtime
    #[arg(long)]
    elevated_delay_prob: Option<f64>,

    /// Print every generated row
    #[arg(long, default_value_t = false)]
    show_raw: bool,

    /// Skip the SVG bar chart
    #[arg(long, default_value_t = false)]
    no_chart: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// CSV with Downtime_PlantA,DeliveryDelay_RegionB columns
    path: PathBuf,

    /// Print every row
    #[arg(long, default_value_t = false)]
    show_raw: bool,
}

fn load_config(args: &SimulateArgs) -> Result<DashboardConfig> {
    let mut cfg = match args.config.clone().or_else(resolve_default_config_path) {
        Some(path) => DashboardConfig::from_toml_file(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    if let Some(v) = args.seed {
        cfg.seed = v;
    }
    if let Some(v) = args.samples {
        cfg.sample_count = v;
    }
    if let Some(v) = args.downtime_prob {
        cfg.downtime_probability = v;
    }
    if let Some(v) = args.base_delay_prob {
        cfg.base_delay_probability = v;
    }
    if let Some(v) = args.elevated_delay_prob {
        cfg.elevated_delay_probability = v;
    }
    if args.no_chart {
        cfg.render_chart = false;
    }

    cfg.validate().context("invalid simulation settings")?;
    Ok(cfg)
}

fn simulate(args: &SimulateArgs) -> Result<()> {
    let cfg = load_config(args)?;
    let run = SimulationRun::execute(cfg.parameters(), cfg.seed)?;
    let files = run
        .write_outputs_under(&args.outdir, cfg.render_chart)
        .with_context(|| format!("failed to write outputs under {}", args.outdir.display()))?;

    println!("{}", render_parameters(&run.params, run.seed));
    print!("{}", render_summary(&run.summary));
    if args.show_raw {
        println!();
        print!("{}", render_raw(&run.observations));
    }

    println!();
    println!("Run directory: {}", files.output_dir.display());
    println!("Download CSV: {}", files.observations_path.display());
    println!("Conditional table: {}", files.table_path.display());
    println!("Summary: {}", files.summary_path.display());
    match &files.chart {
        ChartOutcome::Rendered(path) => println!("Chart: {}", path.display()),
        ChartOutcome::Disabled => println!("Chart: disabled"),
        ChartOutcome::Failed(reason) => println!("Chart: not rendered ({reason})"),
    }
    Ok(())
}

fn inspect(path: &Path, show_raw: bool) -> Result<()> {
    let observations = read_observations_csv(path)
        .with_context(|| format!("failed to read observations from {}", path.display()))?;
    let summary = summarize(&observations);

    println!("{} observations from {}", observations.len(), path.display());
    println!();
    print!("{}", render_summary(&summary));
    if show_raw {
        println!();
        print!("{}", render_raw(&observations));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    SimpleLogger::new()
        .with_level(level)
        .env()
        .init()
        .context("failed to initialise logger")?;

    match &cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Inspect(args) => inspect(&args.path, args.show_raw),
    }
}
