//! Known prime counts used to sanity-check sieve output.

/// Number of primes below each power of ten from 10 to 10^10, sorted by limit.
pub const KNOWN_COUNTS: [(u64, usize); 10] = [
    (10, 4),
    (100, 25),
    (1_000, 168),
    (10_000, 1_229),
    (100_000, 9_592),
    (1_000_000, 78_498),
    (10_000_000, 664_579),
    (100_000_000, 5_761_455),
    (1_000_000_000, 50_847_534),
    (10_000_000_000, 455_052_511),
];

/// Known prime count for `limit`, if it is a table key.
pub fn known_count(limit: u64) -> Option<usize> {
    KNOWN_COUNTS
        .binary_search_by_key(&limit, |&(n, _)| n)
        .ok()
        .map(|i| KNOWN_COUNTS[i].1)
}

/// Outcome of checking a count against the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Match,
    Mismatch { expected: usize, actual: usize },
    /// The limit has no table entry.
    Unknown,
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Match)
    }
}

pub fn check(limit: u64, count: usize) -> Validation {
    match known_count(limit) {
        Some(expected) if expected == count => Validation::Match,
        Some(expected) => Validation::Mismatch { expected, actual: count },
        None => Validation::Unknown,
    }
}
