//! Result printing for benchmark runs.
//!
//! Output is three parts: an optional prime listing, the summary line, and the
//! drag-race line `label;passes;seconds;threads;tags`.

use std::fmt;
use std::io::{self, Write};

use crate::bench::BenchReport;
use crate::config::RunConfig;
use crate::error::Result;

/// Everything printed about one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub passes: u64,
    pub seconds: f64,
    pub average: f64,
    pub limit: u64,
    /// Primes up to and including the limit.
    pub inclusive_count: usize,
    /// [`PrimeSieve::count_primes`](crate::PrimeSieve::count_primes).
    pub count: usize,
    pub valid: bool,
    /// Populated only when the listing was requested.
    pub primes: Option<Vec<u64>>,
}

impl Summary {
    pub fn new(report: &BenchReport, show_results: bool) -> Result<Self> {
        let sieve = &report.sieve;
        let primes = if show_results {
            Some(sieve.primes_inclusive()?.collect())
        } else {
            None
        };
        Ok(Self {
            passes: report.passes,
            seconds: report.elapsed.as_secs_f64(),
            average: report.average().as_secs_f64(),
            limit: sieve.limit(),
            inclusive_count: sieve.count_primes_inclusive()?,
            count: sieve.count_primes()?,
            valid: sieve.validate()?.is_valid(),
            primes,
        })
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Passes: {}, Time: {:.6}, Avg: {:.6}, Limit: {}, Count1: {}, Count2: {}, Valid: {}",
            self.passes,
            self.seconds,
            self.average,
            self.limit,
            self.inclusive_count,
            self.count,
            u8::from(self.valid),
        )
    }
}

/// `label;passes;seconds;1;algorithm=base,faithful=yes,bits=1`
pub fn drag_race_line(label: &str, summary: &Summary) -> String {
    format!(
        "{};{};{:.6};1;algorithm=base,faithful=yes,bits=1",
        label, summary.passes, summary.seconds
    )
}

/// Write the listing (when the summary carries one), the summary and the drag-race line.
///
/// Whether primes are listed is decided when the [`Summary`] is built.
pub fn write_results<W: Write>(out: &mut W, summary: &Summary, config: &RunConfig) -> io::Result<()> {
    if let Some(primes) = &summary.primes {
        for p in primes {
            write!(out, "{}, ", p)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", summary)?;
    writeln!(out)?;
    writeln!(out, "{}", drag_race_line(&config.label, summary))?;
    Ok(())
}
