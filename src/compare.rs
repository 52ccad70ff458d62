//! Timing harness: the rotating-mask sieve against the `primal` and `primes` crates.
//!
//! Every implementation collects the primes below each limit, so the counts agree with
//! [`PrimeSieve::primes`] whenever all of them are correct.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::bits::words_for;
use crate::error::{Result, SieveError};
use crate::sieve::PrimeSieve;

/// Above this the `primes` crate is too slow to be worth timing.
pub const PRIMES_CRATE_MAX: u64 = 1_000_000;

/// Limits timed by default.
pub const DEFAULT_LIMITS: [u64; 6] = [10_000, 100_000, 500_000, 1_000_000, 10_000_000, 50_000_000];

pub const DEFAULT_ITERATIONS: usize = 25;

// ─── Implementations ───────────────────────────────────────────────────────

fn primer_sieve(n: u64) -> Result<Vec<u64>> {
    let limit = i64::try_from(n)
        .map_err(|_| SieveError::OutOfRange { value: n, limit: i64::MAX as u64 })?;
    let mut sieve = PrimeSieve::new(limit)?;
    sieve.run_sieve()?;
    Ok(sieve.primes()?.collect())
}

fn primes_crate_sieve(n: u64) -> Result<Vec<u64>> {
    use primes::{PrimeSet, Sieve};
    let mut sieve = Sieve::new();
    Ok(sieve.iter().take_while(|&p| p < n).collect())
}

fn primal_crate_sieve(n: u64) -> Result<Vec<u64>> {
    Ok(primal::Primes::all()
        .take_while(|&p| (p as u64) < n)
        .map(|p| p as u64)
        .collect())
}

fn primal_crate_sieve_direct(n: u64) -> Result<Vec<u64>> {
    let sieve = primal::Sieve::new(n as usize);
    Ok(sieve
        .primes_from(0)
        .take_while(|&p| (p as u64) < n)
        .map(|p| p as u64)
        .collect())
}

// ─── Benchmarking machinery ────────────────────────────────────────────────

/// Timings of one implementation at one limit.
#[derive(Debug, Clone)]
pub struct BenchResult {
    pub name: &'static str,
    pub prime_count: usize,
    pub times: Vec<Duration>,
    /// Memory held by the sieve structure.
    pub sieve_bytes: usize,
    /// Memory held by the collected primes.
    pub result_bytes: usize,
}

impl BenchResult {
    pub fn median(&self) -> Duration {
        let mut sorted = self.times.clone();
        sorted.sort();
        sorted.get(sorted.len() / 2).copied().unwrap_or_default()
    }

    pub fn min(&self) -> Duration {
        self.times.iter().min().copied().unwrap_or_default()
    }

    pub fn max(&self) -> Duration {
        self.times.iter().max().copied().unwrap_or_default()
    }

    pub fn mean(&self) -> Duration {
        if self.times.is_empty() { return Duration::ZERO; }
        let total: Duration = self.times.iter().sum();
        total / self.times.len() as u32
    }

    pub fn stddev_us(&self) -> f64 {
        if self.times.is_empty() { return 0.0; }
        let mean = self.mean().as_nanos() as f64;
        let variance = self.times.iter()
            .map(|t| {
                let diff = t.as_nanos() as f64 - mean;
                diff * diff
            })
            .sum::<f64>() / self.times.len() as f64;
        variance.sqrt() / 1000.0
    }

    /// Table cells, in [`HEADER`] order.
    pub fn cells(&self) -> [String; 8] {
        [
            self.name.to_string(),
            format_duration(self.min()),
            format_duration(self.median()),
            format_duration(self.mean()),
            format_duration(self.max()),
            format!("{:.1}", self.stddev_us()),
            format_bytes(self.sieve_bytes),
            format_bytes(self.result_bytes),
        ]
    }
}

impl fmt::Display for BenchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&table_row(&self.cells()))
    }
}

// ─── Table formatting ──────────────────────────────────────────────────────

pub const HEADER: [&str; 8] = ["Implementation", "Min", "Median", "Mean", "Max", "σ (µs)", "Sieve", "Result"];

/// Name left-aligned, four timing columns of 10, three of 8, all right-aligned.
pub fn table_row<S: AsRef<str>>(cells: &[S; 8]) -> String {
    let [name, rest @ ..] = cells;
    let mut line = format!("{:<24}", name.as_ref());
    for (i, cell) in rest.iter().enumerate() {
        let width = if i < 4 { 10 } else { 8 };
        line.push_str(&format!(" │ {:>width$}", cell.as_ref()));
    }
    line
}

/// Scale `value` by the first `(divisor, unit, precision)` it reaches, else print it raw.
fn scaled(value: u128, units: &[(u128, &str, usize)], base_unit: &str) -> String {
    units
        .iter()
        .find(|&&(divisor, _, _)| value >= divisor)
        .map(|&(divisor, unit, precision)| {
            format!("{:.*} {}", precision, value as f64 / divisor as f64, unit)
        })
        .unwrap_or_else(|| format!("{} {}", value, base_unit))
}

pub fn format_duration(d: Duration) -> String {
    const UNITS: [(u128, &str, usize); 3] =
        [(1_000_000_000, "s", 2), (1_000_000, "ms", 2), (1_000, "µs", 1)];
    scaled(d.as_nanos(), &UNITS, "ns")
}

pub fn format_bytes(b: usize) -> String {
    const UNITS: [(u128, &str, usize); 2] = [(1 << 20, "MB", 1), (1 << 10, "KB", 1)];
    scaled(b as u128, &UNITS, "B")
}

/// Decimal digits grouped in threes from the right.
pub fn format_with_commas(n: u64) -> String {
    let digits = n.to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn bench<F>(name: &'static str, n: u64, iterations: usize, sieve_bytes: usize, f: F) -> Result<BenchResult>
where
    F: Fn(u64) -> Result<Vec<u64>>,
{
    // Warmup
    f(n)?;
    f(n)?;

    let mut times = Vec::with_capacity(iterations);
    let mut prime_count = 0;
    let mut result_bytes = 0;

    for _ in 0..iterations {
        let start = Instant::now();
        let result = f(n)?;
        let elapsed = start.elapsed();
        prime_count = result.len();
        result_bytes = result.capacity() * std::mem::size_of::<u64>();
        times.push(elapsed);
        std::hint::black_box(&result);
    }

    Ok(BenchResult { name, prime_count, times, sieve_bytes, result_bytes })
}

// ─── Comparison ────────────────────────────────────────────────────────────

/// All implementations timed at one limit.
#[derive(Debug, Clone)]
pub struct LimitComparison {
    pub limit: u64,
    pub iterations: usize,
    pub results: Vec<BenchResult>,
    /// Implementations not timed at this limit.
    pub skipped: Vec<&'static str>,
}

impl LimitComparison {
    /// Prime count of the rotating-mask sieve, the first result.
    pub fn reference_count(&self) -> Option<usize> {
        self.results.first().map(|r| r.prime_count)
    }

    pub fn mismatches(&self) -> Vec<&BenchResult> {
        match self.reference_count() {
            Some(expected) => self.results.iter().filter(|r| r.prime_count != expected).collect(),
            None => Vec::new(),
        }
    }

    pub fn agrees(&self) -> bool {
        self.mismatches().is_empty()
    }

    pub fn fastest(&self) -> Option<Duration> {
        self.results.iter().map(BenchResult::median).min()
    }
}

impl fmt::Display for LimitComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "┌─ n = {} ({} iterations) ─────────────────────────────────────────────────────",
            format_with_commas(self.limit), self.iterations)?;
        writeln!(f, "│")?;
        writeln!(f, "{}", table_row(&HEADER))?;
        writeln!(f, "{}", "─".repeat(115))?;
        for result in &self.results {
            writeln!(f, "{}", result)?;
        }
        for name in &self.skipped {
            writeln!(f, "{}", table_row(&[*name, "—", "skipped", "(too slow", "at this n)", "—", "—", "—"]))?;
        }

        writeln!(f, "│")?;
        let count = self.reference_count().unwrap_or(0) as u64;
        if self.agrees() {
            writeln!(f, "│  π(<{}) = {}   │  All implementations agree ✓",
                format_with_commas(self.limit), format_with_commas(count))?;
        } else {
            for r in self.mismatches() {
                writeln!(f, "│  MISMATCH: {} found {} primes, expected {}",
                    r.name, format_with_commas(r.prime_count as u64), format_with_commas(count))?;
            }
        }

        if let Some(fastest) = self.fastest() {
            for r in &self.results {
                let ratio = r.median().as_nanos() as f64 / fastest.as_nanos().max(1) as f64;
                if ratio <= 1.01 {
                    writeln!(f, "│  {:24} : fastest 🏆", r.name)?;
                } else {
                    writeln!(f, "│  {:24} : {:.2}x slower", r.name, ratio)?;
                }
            }
        }
        writeln!(f, "│")?;
        write!(f, "└──────────────────────────────────────────────────────────────────────────────────")
    }
}

/// Time every implementation at `limit`.
pub fn compare_at(limit: u64, iterations: usize) -> Result<LimitComparison> {
    let iterations = iterations.max(1);
    let flag_bytes = words_for((limit / 2) as usize) * std::mem::size_of::<u32>();

    let mut results = vec![
        bench("primer (rotating mask)", limit, iterations, flag_bytes, primer_sieve)?,
        bench("primal (Sieve::new)", limit, iterations, limit as usize / 8, primal_crate_sieve_direct)?,
        bench("primal (iterator)", limit, iterations, 0, primal_crate_sieve)?,
    ];
    let mut skipped = Vec::new();
    if limit <= PRIMES_CRATE_MAX {
        results.push(bench("primes crate (iter)", limit, iterations, 0, primes_crate_sieve)?);
    } else {
        skipped.push("primes crate (iter)");
    }

    let comparison = LimitComparison { limit, iterations, results, skipped };
    for r in comparison.mismatches() {
        warn!(limit, implementation = r.name, count = r.prime_count, "prime count mismatch");
    }
    info!(limit, agree = comparison.agrees(), "comparison finished");
    Ok(comparison)
}

/// Comparison across several limits.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    pub limits: Vec<LimitComparison>,
}

impl Comparison {
    pub fn all_agree(&self) -> bool {
        self.limits.iter().all(LimitComparison::agrees)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for limit in &self.limits {
            writeln!(f, "{}", limit)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

pub fn run(limits: &[u64], iterations: usize) -> Result<Comparison> {
    let limits = limits
        .iter()
        .map(|&n| compare_at(n, iterations))
        .collect::<Result<Vec<_>>>()?;
    Ok(Comparison { limits })
}
