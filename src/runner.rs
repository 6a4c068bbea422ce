use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::error::ContagionError;
use crate::log::{info, set_log_level, LevelFilter};
use crate::parameters::Parameters;
use crate::report::{CsvReport, JsonLinesReport, ReportSink};
use crate::simulation::Simulation;

/// Command line arguments for a headless run
#[derive(Parser, Debug)]
#[command(name = "contagion", about = "Simulate infection spread among mobile subjects")]
pub struct BaseArgs {
    /// Random seed; overrides the seed in the config file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON parameters file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Optional directory for the CSV report
    #[arg(short, long, default_value = "")]
    pub output_dir: String,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    pub file_prefix: String,

    /// Number of ticks to run
    #[arg(short, long, default_value = "480")]
    pub ticks: u64,

    /// Simulated time per tick, e.g. "1h" or "30m"
    #[arg(long, default_value = "1h", value_parser = humantime::parse_duration)]
    pub tick: Duration,

    /// Report every this many ticks
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u64).range(1..))]
    pub report_period: u64,

    /// Log level: off, error, warn, info, debug or trace
    #[arg(long)]
    pub log_level: Option<LevelFilter>,

    /// Don't write JSON reports to stdout
    #[arg(short, long)]
    pub quiet: bool,
}

/// Parses the process arguments and runs the simulation. Exits the process on `--help` or
/// malformed arguments.
///
/// # Errors
/// Returns an error if configuration or report output fails
pub fn run_with_args() -> Result<Simulation, Box<dyn Error>> {
    let args = BaseArgs::parse();
    run(&args)
}

/// Runs a simulation as described by `args`, sending a report to every sink each
/// `report_period` ticks, and returns the finished simulation.
///
/// # Errors
/// Returns an error if the parameters are invalid or a report cannot be written
pub fn run(args: &BaseArgs) -> Result<Simulation, Box<dyn Error>> {
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let mut parameters = if args.config.is_empty() {
        Parameters::default()
    } else {
        info!("Loading parameters from: {}", args.config);
        Parameters::from_json_file(Path::new(&args.config))?
    };
    if let Some(seed) = args.random_seed {
        parameters.seed = seed;
    }

    let mut sinks = report_sinks(args)?;
    let mut simulation = Simulation::new(parameters)?;

    for tick in 1..=args.ticks {
        simulation.update(args.tick);
        if tick % args.report_period == 0 {
            let report = simulation.status_report();
            info!(
                "tick {tick}: {} hours elapsed, {:?}",
                report.hours_elapsed,
                simulation.infection_state_histogram()
            );
            for sink in &mut sinks {
                sink.send_report(tick, &report)?;
            }
        }
    }

    Ok(simulation)
}

fn report_sinks(args: &BaseArgs) -> Result<Vec<Box<dyn ReportSink>>, ContagionError> {
    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    if !args.output_dir.is_empty() {
        let path = PathBuf::from(&args.output_dir)
            .join(format!("{}infection_states.csv", args.file_prefix));
        sinks.push(Box::new(CsvReport::create(&path)?));
    }
    if !args.quiet {
        sinks.push(Box::new(JsonLinesReport::new(io::stdout())));
    }
    Ok(sinks)
}
