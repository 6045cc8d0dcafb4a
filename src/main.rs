/*!
 * Scheduling Simulator - Main Entry Point
 *
 * Loads a configuration, runs it to completion and prints:
 * - one line per tick
 * - the context switch log
 * - the end-of-run report
 */

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use sched_sim::{init_tracing, Clock, ConfigError, Controller, SchedulerConfig};

/// Tick-driven CPU scheduling simulator
#[derive(Debug, Parser)]
#[command(name = "sched-sim", version, about, long_about = None)]
struct Cli {
    /// Configuration file (text `ALG;QUANTUM` format or JSON)
    config: PathBuf,

    /// Override the configured algorithm (FIFO, PRIORITY, SRTF)
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Override the configured quantum
    #[arg(short, long)]
    quantum: Option<u64>,

    /// Drive the clock from its background thread instead of stepping manually
    #[arg(long)]
    auto: bool,

    /// Milliseconds between automatic ticks
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,

    /// Give up after this many ticks
    #[arg(long, default_value_t = 10_000)]
    max_ticks: u64,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the timeline as JSON to this file
    #[arg(long)]
    timeline_out: Option<PathBuf>,

    /// Write the report as JSON to this file
    #[arg(long)]
    report_out: Option<PathBuf>,
}

/// Load the file, apply command-line overrides, then validate
fn load_config(cli: &Cli) -> Result<SchedulerConfig, ConfigError> {
    let mut config = SchedulerConfig::from_file(&cli.config)?;
    if let Some(algorithm) = &cli.algorithm {
        config.algorithm_name = algorithm.clone();
    }
    if let Some(quantum) = cli.quantum {
        config.quantum = quantum;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // Config errors carry diagnostic codes and help text; render them with miette
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            let report = miette::Report::new(err)
                .wrap_err(format!("Failed to load {}", cli.config.display()));
            eprintln!("{:?}", report);
            std::process::exit(2);
        }
    };

    let clock = Clock::with_interval(Duration::from_millis(cli.interval_ms));
    let controller = Controller::new(clock, config);

    if !cli.json {
        controller.subscribe(|record| println!("{}", record));
    }

    if cli.auto {
        let budget = Duration::from_millis(cli.interval_ms.saturating_mul(cli.max_ticks));
        controller.start();
        let finished = controller.wait_finished(budget + Duration::from_secs(1));
        controller.stop();
        if !finished {
            bail!("Simulation did not finish within {} ticks", cli.max_ticks);
        }
    } else {
        controller.run_to_completion(cli.max_ticks);
    }

    info!(
        time = controller.current_time(),
        finished = controller.is_finished(),
        "Simulation done"
    );

    let report = controller.report();

    if let Some(path) = &cli.timeline_out {
        let json = serde_json::to_string_pretty(&controller.timeline())
            .context("Failed to serialize timeline")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if let Some(path) = &cli.report_out {
        let json = report.to_json_pretty().context("Failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if cli.json {
        println!("{}", report.to_json_pretty().context("Failed to serialize report")?);
    } else {
        println!();
        for switch in controller.context_switches() {
            println!("{}", switch);
        }
        println!();
        println!("{}", report);
    }

    if !controller.is_finished() {
        bail!("Tick limit of {} reached before all processes completed", cli.max_ticks);
    }
    Ok(())
}
