//! Fixed-duration benchmark driver.
//!
//! Builds a fresh sieve per pass and keeps going until a pass finishes past the deadline.
//! A pass in progress is never cut short.

use std::time::{Duration, Instant};

use tracing::info;

use crate::error::Result;
use crate::sieve::PrimeSieve;

/// Result of a timed run: pass count, total wall time and the last sieve built.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub passes: u64,
    pub elapsed: Duration,
    pub sieve: PrimeSieve,
}

impl BenchReport {
    /// Mean wall time per pass.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.passes) {
            Ok(0) => Duration::ZERO,
            Ok(p) => self.elapsed / p,
            Err(_) => Duration::from_secs_f64(self.elapsed.as_secs_f64() / self.passes as f64),
        }
    }
}

/// One pass: construct and sieve.
pub fn run_once(limit: i64) -> Result<PrimeSieve> {
    let mut sieve = PrimeSieve::new(limit)?;
    sieve.run_sieve()?;
    Ok(sieve)
}

/// Run passes at `limit` until at least `duration` has elapsed.
///
/// Always completes at least one pass.
pub fn run_for(limit: i64, duration: Duration) -> Result<BenchReport> {
    let start = Instant::now();
    let mut passes = 0u64;
    loop {
        let sieve = run_once(limit)?;
        passes += 1;
        let elapsed = start.elapsed();
        if elapsed >= duration {
            info!(limit, passes, elapsed_ms = elapsed.as_millis() as u64, "benchmark finished");
            return Ok(BenchReport { passes, elapsed, sieve });
        }
        std::hint::black_box(&sieve);
    }
}
