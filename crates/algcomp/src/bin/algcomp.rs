//! CLI for comparing structure-learning algorithms on simulated data.
//!
//! # Usage
//!
//! ```bash
//! # List plugins and their default parameters
//! cargo run --bin algcomp -- --list
//!
//! # Compare both reference algorithms over two sample sizes
//! cargo run --bin algcomp -- --param sampleSize=100,1000 --param numRuns=5
//!
//! # Parallel, with a per-unit timeout and ranked output
//! cargo run --bin algcomp -- \
//!   --workers 8 --timeout 30 \
//!   --weights AP=1,AR=1,SHD=0.5 --utilities --sort \
//!   --output ./results/
//! ```

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

use algcomp::checkpoint::CsvUnitSink;
use algcomp::comparison::{apply_parameter_args, load_parameters};
use algcomp::output::{to_markdown, write_report, write_report_file, write_summary_csv};
use algcomp::{Comparison, ComparisonConfig, ComparisonGraph, Mode, Parameters, Registry, SetupError, Statistics};

/// Algorithm comparison over simulated data
#[derive(Parser, Debug)]
#[command(name = "algcomp")]
#[command(about = "Compare structure-learning algorithms over swept simulation parameters")]
#[command(version)]
struct Args {
    /// JSON file of base parameters ({"name": value | [values...]})
    #[arg(long)]
    params: Option<PathBuf>,

    /// Parameter values, applied after --params (repeatable): name=v1,v2,...
    #[arg(short = 'p', long = "param")]
    param: Vec<String>,

    /// Algorithms to compare (comma-separated registry names)
    #[arg(short, long, default_value = "correlation,empty")]
    algorithms: String,

    /// Simulations to run (comma-separated registry names)
    #[arg(short, long, default_value = "linear-gaussian")]
    simulations: String,

    /// Statistics to tabulate (comma-separated; param:<name> shows a parameter)
    #[arg(long, default_value = "AP,AR,AHP,AHR,SHD,E")]
    statistics: String,

    /// Utility weights (comma-separated abbr=weight)
    #[arg(long)]
    weights: Option<String>,

    /// Number of units evaluated concurrently
    #[arg(short = 'j', long, default_value = "1")]
    workers: usize,

    /// Per-unit time limit in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Seconds an overdue unit gets before it is abandoned
    #[arg(long, default_value = "1")]
    grace: f64,

    /// Reference graph: true-dag, cpdag or pag
    #[arg(long, default_value = "true-dag")]
    comparison_graph: String,

    /// Aggregation modes (comma-separated: average,std-dev,min,max,median)
    #[arg(long, default_value = "average,std-dev")]
    modes: String,

    /// Sort rows by descending utility
    #[arg(long)]
    sort: bool,

    /// Show the utility column
    #[arg(long)]
    utilities: bool,

    /// Show algorithm index column
    #[arg(long)]
    alg_indices: bool,

    /// Show simulation index column
    #[arg(long)]
    sim_indices: bool,

    /// Tab-delimited tables
    #[arg(long)]
    tab: bool,

    /// Decimal places for numeric cells
    #[arg(long, default_value = "2")]
    precision: usize,

    /// Drop pairings whose data types do not match
    #[arg(long)]
    skip_mismatches: bool,

    /// Output directory for results
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Skip writing CSV output files
    #[arg(long)]
    no_csv: bool,

    /// Print available plugins and exit
    #[arg(long)]
    list: bool,

    /// No progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,algcomp=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let registry = Registry::with_builtins();

    if let Err(e) = run(&args, &registry) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, registry: &Registry) -> Result<(), SetupError> {
    let mut parameters = Parameters::with_defaults();
    if let Some(path) = &args.params {
        parameters.extend_from(&load_parameters(path)?);
    }
    apply_parameter_args(&mut parameters, &args.param)?;

    if args.list {
        print!("{}", registry.configuration(&parameters));
        return Ok(());
    }

    let config = build_config(args)?;
    let statistics = build_statistics(args, registry)?;

    let mut comparison = Comparison::new(parameters).config(config);
    for name in split_list(&args.algorithms) {
        comparison = comparison.add_algorithm(registry.algorithm(name)?);
    }
    for name in split_list(&args.simulations) {
        comparison = comparison.add_simulation(registry.simulation(name)?);
    }

    if !args.output.exists() {
        fs::create_dir_all(&args.output).map_err(|e| {
            SetupError::InvalidConfig(format!("cannot create {}: {}", args.output.display(), e))
        })?;
    }

    if !args.no_csv {
        let path = args.output.join("units.csv");
        let sink = CsvUnitSink::create(&path, &statistics)
            .map_err(|e| SetupError::InvalidConfig(format!("cannot create {}: {}", path.display(), e)))?;
        comparison = comparison.with_sink(Arc::new(sink));
    }
    comparison = comparison.statistics(statistics);

    let progress_bar = if args.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(1000);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% | {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    };

    let results = comparison.run(|fraction, unit| {
        progress_bar.set_position((fraction * 1000.0) as u64);
        progress_bar.set_message(unit.to_string());
    })?;
    progress_bar.finish_with_message("Complete!");

    println!(
        "\nCompleted {} units ({} failed) in {:.1}s\n",
        results.statuses.len(),
        results.failed(),
        results.total_time.as_secs_f64()
    );

    let report_path = args.output.join("comparison.txt");
    match write_report_file(&results, &report_path) {
        Ok(()) => println!("Wrote report to: {}", report_path.display()),
        Err(e) => eprintln!("Failed to write report: {}", e),
    }

    let md_path = args.output.join("comparison.md");
    match fs::write(&md_path, to_markdown(&results)) {
        Ok(()) => println!("Wrote markdown to: {}", md_path.display()),
        Err(e) => eprintln!("Failed to write markdown report: {}", e),
    }

    if !args.no_csv {
        let summary_path = args.output.join("summary.csv");
        match write_summary_csv(&results, &summary_path) {
            Ok(()) => println!("Wrote summary to: {}", summary_path.display()),
            Err(e) => eprintln!("Failed to write summary CSV: {}", e),
        }
    }

    println!();
    if let Err(e) = write_report(&results, &mut std::io::stdout()) {
        eprintln!("Failed to print report: {}", e);
    }
    Ok(())
}

fn split_list(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn build_config(args: &Args) -> Result<ComparisonConfig, SetupError> {
    let modes = split_list(&args.modes)
        .map(|m| m.parse::<Mode>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(SetupError::InvalidConfig)?;
    let comparison_graph: ComparisonGraph = args
        .comparison_graph
        .parse()
        .map_err(SetupError::InvalidConfig)?;

    let unit_timeout = match args.timeout {
        Some(t) if t > 0.0 => Some(
            Duration::try_from_secs_f64(t)
                .map_err(|e| SetupError::InvalidConfig(format!("invalid timeout {}: {}", t, e)))?,
        ),
        Some(t) => return Err(SetupError::InvalidConfig(format!("invalid timeout {}", t))),
        None => None,
    };
    let abandon_grace = Duration::try_from_secs_f64(args.grace)
        .map_err(|e| SetupError::InvalidConfig(format!("invalid grace {}: {}", args.grace, e)))?;

    let config = ComparisonConfig {
        workers: args.workers,
        unit_timeout,
        abandon_grace,
        comparison_graph,
        skip_type_mismatches: args.skip_mismatches,
        modes,
        sort_by_utility: args.sort,
        show_utilities: args.utilities,
        show_algorithm_indices: args.alg_indices,
        show_simulation_indices: args.sim_indices,
        tab_delimited: args.tab,
        precision: args.precision,
    };
    config.validate()?;
    Ok(config)
}

fn build_statistics(args: &Args, registry: &Registry) -> Result<Statistics, SetupError> {
    let mut weights: Vec<(String, f64)> = Vec::new();
    if let Some(list) = &args.weights {
        for entry in split_list(list) {
            let parsed = entry
                .split_once('=')
                .and_then(|(name, w)| Some((name.trim().to_string(), w.trim().parse::<f64>().ok()?)))
                .filter(|(_, w)| w.is_finite() && *w >= 0.0);
            match parsed {
                Some(pair) => weights.push(pair),
                None => return Err(SetupError::InvalidConfig(format!("invalid weight '{}'", entry))),
            }
        }
    }

    let mut statistics = Statistics::new();
    for name in split_list(&args.statistics) {
        let statistic = registry.statistic(name)?;
        let weight = weights
            .iter()
            .find(|(n, _)| *n == statistic.abbreviation() || n == name)
            .map_or(0.0, |(_, w)| *w);
        statistics.push(statistic, weight);
    }
    Ok(statistics)
}
