//! Bit-packed Sieve of Eratosthenes over odd numbers.
//!
//! ```
//! use primer::PrimeSieve;
//!
//! let mut sieve = PrimeSieve::new(30)?;
//! sieve.run_sieve()?;
//! assert_eq!(sieve.count_primes()?, 10);
//! assert!(sieve.is_prime(29)?);
//! # Ok::<(), primer::SieveError>(())
//! ```

// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod bench;
pub mod bits;
pub mod compare;
pub mod config;
pub mod error;
pub mod reference;
pub mod report;
pub mod sieve;

pub use bits::BitArray;
pub use config::RunConfig;
pub use error::{Result, SieveError};
pub use reference::{KNOWN_COUNTS, Validation};
pub use sieve::{PrimeSieve, Primes, SieveState};
