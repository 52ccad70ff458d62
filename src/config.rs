//! Runtime settings for a benchmark run.

use std::time::Duration;

/// Sieve limit of the standard workload.
pub const DEFAULT_LIMIT: i64 = 1_000_000;
/// How long the driver keeps starting new passes.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(5);
/// Implementation tag in the drag-race output line.
pub const DEFAULT_LABEL: &str = "primer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub limit: i64,
    pub duration: Duration,
    /// Print every prime before the summary.
    pub show_results: bool,
    pub label: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            duration: DEFAULT_DURATION,
            show_results: false,
            label: DEFAULT_LABEL.to_string(),
        }
    }
}
