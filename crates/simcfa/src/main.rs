use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{WrapErr, bail};
use simcfa::{ConfigFormat, Report, Sampling, init_logging, load_config, render_config};
use simcfa_core::config::SimulationConfig;
use simcfa_core::events::EventKind;
use simcfa_core::strategies::recorder::{CashReport, StateRecorder, format_minor_units};

#[derive(Parser, Debug)]
#[command(name = "simcfa")]
#[command(about = "A day-by-day personal cash-flow simulator")]
struct Args {
    /// Scenario file (.json, .yaml or .yml)
    config: Option<PathBuf>,

    /// Run the built-in twenty-year household scenario
    #[arg(long, conflicts_with = "config")]
    example: bool,

    /// Export the full daily history as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Rows shown in the printed table
    #[arg(long, value_enum, default_value_t = Sampling::Month)]
    every: Sampling,

    /// Print the resolved scenario instead of running it
    #[arg(long, value_enum)]
    print_config: Option<ConfigFormat>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_file.as_deref(), &args.log_level)?;

    let config = match (&args.config, args.example) {
        (Some(path), _) => load_config(path)?,
        (None, true) => SimulationConfig::example(),
        (None, false) => bail!("no scenario given; pass a config file or --example"),
    };

    if let Some(format) = args.print_config {
        println!("{}", render_config(&config, format)?);
        return Ok(());
    }

    let mut sim = config.build().wrap_err("invalid scenario")?;
    let recorder = StateRecorder::new();
    let cash = CashReport::new();
    sim.subscribe(EventKind::DayEnded, recorder.handler());
    sim.subscribe(EventKind::SimulationEnded, cash.handler());
    sim.run().wrap_err("simulation failed")?;

    let report = Report::from_history(&recorder.take());
    print!("{}", report.render_table(args.every));

    let export = match &args.csv {
        Some(path) => report.write_csv(path),
        None => Ok(()),
    };
    if let Err(err) = &export {
        tracing::error!("CSV export failed: {err:#}");
    }

    if let Some(total) = cash.total() {
        println!("Total amount of cash: {}", format_minor_units(total));
    }

    export
}
