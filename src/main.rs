//! Prime sieve benchmark CLI.
//!
//! Usage: cargo run --release -- [run|count|list|compare]

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use primer::compare::{self, DEFAULT_ITERATIONS, DEFAULT_LIMITS};
use primer::config::DEFAULT_LIMIT;
use primer::report::{self, Summary};
use primer::{bench, RunConfig, SieveError};

#[derive(Parser, Debug)]
#[command(name = "primer", version, about = "Odd-only rotating-mask prime sieve")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sieve repeatedly for a fixed time and print the drag-race summary
    Run(RunArgs),
    /// Sieve once and print the prime count
    Count(LimitArg),
    /// Sieve once and print every prime up to the limit
    List(LimitArg),
    /// Time the sieve against the primal and primes crates
    Compare {
        /// Limits to time (defaults to a 10K..50M ladder)
        #[arg(long, value_delimiter = ',')]
        limits: Vec<u64>,
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: usize,
    },
}

/// Unset flags fall back to [`RunConfig::default`].
#[derive(Args, Debug, Default)]
struct RunArgs {
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,
    /// Seconds to keep starting new passes
    #[arg(long, value_parser = parse_seconds, allow_negative_numbers = true)]
    seconds: Option<Duration>,
    /// Print every prime before the summary
    #[arg(long)]
    show_results: bool,
    #[arg(long)]
    label: Option<String>,
}

/// Non-negative, finite seconds.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{s:?} is not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{s:?} is not a valid duration: {e}"))
}

impl From<RunArgs> for RunConfig {
    fn from(args: RunArgs) -> Self {
        let defaults = RunConfig::default();
        Self {
            limit: args.limit.unwrap_or(defaults.limit),
            duration: args.seconds.unwrap_or(defaults.duration),
            show_results: args.show_results,
            label: args.label.unwrap_or(defaults.label),
        }
    }
}

#[derive(Args, Debug)]
struct LimitArg {
    #[arg(long, default_value_t = DEFAULT_LIMIT, allow_negative_numbers = true)]
    limit: i64,
}

#[derive(Debug)]
enum CliError {
    Sieve(SieveError),
    Io(io::Error),
    Mismatch,
}

impl From<SieveError> for CliError {
    fn from(e: SieveError) -> Self {
        CliError::Sieve(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

fn execute(command: Command) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Run(args) => {
            let config = RunConfig::from(args);
            let run = bench::run_for(config.limit, config.duration)?;
            let summary = Summary::new(&run, config.show_results)?;
            report::write_results(&mut out, &summary, &config)?;
        }
        Command::Count(LimitArg { limit }) => {
            let sieve = bench::run_once(limit)?;
            writeln!(out, "{}", sieve.count_primes()?)?;
        }
        Command::List(LimitArg { limit }) => {
            let sieve = bench::run_once(limit)?;
            for p in sieve.primes_inclusive()? {
                writeln!(out, "{}", p)?;
            }
        }
        Command::Compare { limits, iterations } => {
            let limits = if limits.is_empty() { DEFAULT_LIMITS.to_vec() } else { limits };
            let comparison = compare::run(&limits, iterations)?;
            write!(out, "{}", comparison)?;
            if !comparison.all_agree() {
                return Err(CliError::Mismatch);
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or_else(|| Command::Run(RunArgs::default()));

    match execute(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Sieve(e)) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
        Err(CliError::Io(e)) => {
            error!("failed to write output: {}", e);
            ExitCode::FAILURE
        }
        Err(CliError::Mismatch) => {
            error!("implementations disagree on prime counts");
            ExitCode::FAILURE
        }
    }
}
