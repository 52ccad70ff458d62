//! Odd-only Sieve of Eratosthenes over a [`BitArray`].
//!
//! Optimisations:
//! - 1 bit per odd number, 2 is hardcoded
//! - flag `i` stands for the odd number `2*i + 3`
//! - striking starts at `factor²`, indexed directly as `2f² + 6f + 3`
//! - composites are cleared with a rotating mask ([`BitArray::clear_rotating`])
//! - integer square root (no f64 precision ceiling)

use std::iter::FusedIterator;

use tracing::{debug, trace, warn};

use crate::bits::{BitArray, Ones};
use crate::error::{Result, SieveError};
use crate::reference::{self, Validation};

/// Integer square root, safe for all u64 values.
/// Newton-corrected from an f64 seed.
#[inline]
pub fn isqrt(n: u64) -> u64 {
    if n == 0 { return 0; }
    let mut x = (n as f64).sqrt() as u64;
    while x > 0 && x.checked_mul(x).map_or(true, |sq| sq > n) { x -= 1; }
    while (x + 1).checked_mul(x + 1).map_or(false, |sq| sq <= n) { x += 1; }
    x
}

/// Lifecycle of a [`PrimeSieve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SieveState {
    Unsieved,
    Sieved,
}

/// Sieve engine for all primes up to `limit`.
#[derive(Debug, Clone)]
pub struct PrimeSieve {
    limit: u64,
    bits: BitArray,
    state: SieveState,
}

impl PrimeSieve {
    /// Allocate a sieve with `limit / 2` flags, all provisionally prime.
    pub fn new(limit: i64) -> Result<Self> {
        let limit = u64::try_from(limit).map_err(|_| SieveError::InvalidLimit(limit))?;
        let size = usize::try_from(limit / 2)
            .map_err(|_| SieveError::AllocationFailure { words: usize::MAX })?;
        let bits = BitArray::new(size)?;
        debug!(limit, flags = size, "allocated sieve");
        Ok(Self { limit, bits, state: SieveState::Unsieved })
    }

    #[inline]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    #[inline]
    pub fn state(&self) -> SieveState {
        self.state
    }

    /// The flag storage, one bit per odd number from 3.
    #[inline]
    pub fn bits(&self) -> &BitArray {
        &self.bits
    }

    /// Strike every odd composite. Running an already sieved instance does nothing.
    pub fn run_sieve(&mut self) -> Result<()> {
        if self.state == SieveState::Sieved {
            warn!(limit = self.limit, "sieve already run, ignoring");
            return Ok(());
        }

        let root = isqrt(self.limit);
        let mut factors = 0usize;
        if root >= 3 {
            // factor <= root iff factorp <= (root - 3) / 2
            let last = ((root - 3) / 2) as usize;
            let mut factorp = 0usize;
            while factorp <= last {
                while !self.bits.get(factorp)? {
                    factorp += 1;
                }
                // factor² = 2*(2f² + 6f + 3) + 3
                let start = 2 * factorp * factorp + 6 * factorp + 3;
                let factor = 2 * factorp + 3;
                trace!(factor, start, "striking");
                self.bits.clear_rotating(start, factor)?;
                factors += 1;
                factorp += 1;
            }
        }

        self.state = SieveState::Sieved;
        debug!(limit = self.limit, factors, "sieve complete");
        Ok(())
    }

    #[inline]
    fn ensure_sieved(&self) -> Result<()> {
        match self.state {
            SieveState::Sieved => Ok(()),
            found => Err(SieveError::InvalidState { expected: SieveState::Sieved, found }),
        }
    }

    /// Primality of `k`.
    ///
    /// 2 is always prime and other even numbers never are; odd `k` must not exceed the
    /// limit.
    pub fn is_prime(&self, k: u64) -> Result<bool> {
        self.ensure_sieved()?;
        match k {
            0 | 1 => Ok(false),
            2 => Ok(true),
            k if k % 2 == 0 => Ok(false),
            k if k > self.limit => Err(SieveError::OutOfRange { value: k, limit: self.limit }),
            k => self.bits.get((k / 2 - 1) as usize),
        }
    }

    /// Flags covering odd numbers in `[3, N)`.
    #[inline]
    fn flags_below_limit(&self) -> usize {
        if self.limit > 3 { ((self.limit - 2) / 2) as usize } else { 0 }
    }

    /// Flags covering odd numbers in `[3, N]`.
    #[inline]
    fn flags_through_limit(&self) -> usize {
        if self.limit >= 3 { ((self.limit - 1) / 2) as usize } else { 0 }
    }

    #[inline]
    fn two(&self) -> usize {
        usize::from(self.limit >= 2)
    }

    /// Number of primes, counting 2 plus the odd primes strictly below the limit.
    ///
    /// A prime limit is itself not counted. The reference table was produced under this
    /// convention.
    pub fn count_primes(&self) -> Result<usize> {
        self.ensure_sieved()?;
        Ok(self.two() + self.bits.count_ones_prefix(self.flags_below_limit())?)
    }

    /// Number of primes up to and including the limit.
    pub fn count_primes_inclusive(&self) -> Result<usize> {
        self.ensure_sieved()?;
        Ok(self.two() + self.bits.count_ones_prefix(self.flags_through_limit())?)
    }

    /// Primes in ascending order, under the same bound as [`count_primes`](Self::count_primes).
    ///
    /// Each call starts a fresh scan.
    pub fn primes(&self) -> Result<Primes<'_>> {
        self.ensure_sieved()?;
        Ok(Primes {
            two: self.limit >= 2,
            odd: self.bits.iter_ones_prefix(self.flags_below_limit())?,
        })
    }

    /// Primes up to and including the limit.
    pub fn primes_inclusive(&self) -> Result<Primes<'_>> {
        self.ensure_sieved()?;
        Ok(Primes {
            two: self.limit >= 2,
            odd: self.bits.iter_ones_prefix(self.flags_through_limit())?,
        })
    }

    /// Compare [`count_primes`](Self::count_primes) with the known count for this limit.
    pub fn validate(&self) -> Result<Validation> {
        Ok(reference::check(self.limit, self.count_primes()?))
    }
}

/// Lazy ascending prime sequence over a sieved [`PrimeSieve`].
#[derive(Debug, Clone)]
pub struct Primes<'a> {
    two: bool,
    odd: Ones<'a>,
}

impl Iterator for Primes<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.two {
            self.two = false;
            return Some(2);
        }
        self.odd.next().map(|i| 2 * i as u64 + 3)
    }
}

impl FusedIterator for Primes<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sieved(limit: i64) -> PrimeSieve {
        let mut sieve = PrimeSieve::new(limit).unwrap();
        sieve.run_sieve().unwrap();
        sieve
    }

    #[test]
    fn test_isqrt_safety() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(8), 2);
        assert_eq!(isqrt(9), 3);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
        assert_eq!(isqrt(1 << 52), 1 << 26);
    }

    #[test]
    fn test_small_primes() {
        let sieve = sieved(30);
        let primes: Vec<u64> = sieve.primes().unwrap().collect();
        assert_eq!(primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    }

    #[test]
    fn test_flag_layout() {
        // flag i <-> 2i + 3: 3 5 7 9 11 13 15
        let sieve = sieved(16);
        let flags: Vec<bool> = (0..7).map(|i| sieve.bits().get(i).unwrap()).collect();
        assert_eq!(flags, vec![true, true, true, false, true, true, false]);
    }

    #[test]
    fn test_edge_cases() {
        assert_eq!(sieved(0).count_primes().unwrap(), 0);
        assert_eq!(sieved(1).count_primes().unwrap(), 0);
        assert_eq!(sieved(2).count_primes().unwrap(), 1);
        assert_eq!(sieved(3).count_primes_inclusive().unwrap(), 2);
        assert_eq!(sieved(2).primes().unwrap().collect::<Vec<_>>(), vec![2]);
        assert_eq!(sieved(1).primes().unwrap().count(), 0);
    }

    #[test]
    fn test_exclusive_bound_quirk() {
        // 13 is prime: counted inclusively, dropped by the exclusive count
        let sieve = sieved(13);
        assert!(sieve.is_prime(13).unwrap());
        assert_eq!(sieve.count_primes().unwrap(), 5);
        assert_eq!(sieve.count_primes_inclusive().unwrap(), 6);
        assert_eq!(sieve.primes().unwrap().last(), Some(11));
        assert_eq!(sieve.primes_inclusive().unwrap().last(), Some(13));
        assert_eq!(sieved(3).count_primes().unwrap(), 1);
    }

    #[test]
    fn test_known_counts() {
        assert_eq!(sieved(10).count_primes().unwrap(), 4);
        assert_eq!(sieved(100).count_primes().unwrap(), 25);
        assert_eq!(sieved(1_000).count_primes().unwrap(), 168);
        assert_eq!(sieved(10_000).count_primes().unwrap(), 1_229);
        assert_eq!(sieved(500_000).count_primes().unwrap(), 41_538);
    }

    #[test]
    fn test_is_prime() {
        let sieve = sieved(30);
        assert!(!sieve.is_prime(0).unwrap());
        assert!(!sieve.is_prime(1).unwrap());
        assert!(sieve.is_prime(2).unwrap());
        assert!(!sieve.is_prime(4).unwrap());
        assert!(!sieve.is_prime(25).unwrap());
        assert!(sieve.is_prime(29).unwrap());
        assert_eq!(sieve.is_prime(31), Err(SieveError::OutOfRange { value: 31, limit: 30 }));
    }

    #[test]
    fn test_queries_require_sieving() {
        let sieve = PrimeSieve::new(100).unwrap();
        let err = SieveError::InvalidState {
            expected: SieveState::Sieved,
            found: SieveState::Unsieved,
        };
        assert_eq!(sieve.state(), SieveState::Unsieved);
        assert_eq!(sieve.count_primes(), Err(err.clone()));
        assert_eq!(sieve.is_prime(7), Err(err.clone()));
        assert!(sieve.primes().is_err());
        assert_eq!(sieve.validate(), Err(err));
    }

    #[test]
    fn test_run_sieve_twice_is_noop() {
        let mut sieve = sieved(1_000);
        let before = sieve.bits().clone();
        sieve.run_sieve().unwrap();
        assert_eq!(sieve.state(), SieveState::Sieved);
        assert_eq!(sieve.bits(), &before);
        assert_eq!(sieve.count_primes().unwrap(), 168);
    }

    #[test]
    fn test_negative_limit() {
        assert_eq!(PrimeSieve::new(-1).unwrap_err(), SieveError::InvalidLimit(-1));
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_traces_each_factor() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            sieved(100);
        });

        let text = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        // 3, 5, 7, then 11 found by skipping past 9; its start lies past the end
        assert_eq!(text.matches("striking").count(), 4);
        assert!(text.contains("factor=3 start=3"));
        assert!(text.contains("factor=7 start=23"));
        assert!(text.contains("factor=11 start=59"));
        assert!(text.contains("sieve complete"));
    }

    #[test]
    fn test_allocation_failure() {
        assert!(matches!(
            PrimeSieve::new(i64::MAX),
            Err(SieveError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_validate() {
        assert_eq!(sieved(1_000).validate().unwrap(), Validation::Match);
        assert_eq!(sieved(50).validate().unwrap(), Validation::Unknown);
        assert!(!sieved(50).validate().unwrap().is_valid());
    }
}
