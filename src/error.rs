//! Error taxonomy for the sieve kernel.

use thiserror::Error;

use crate::sieve::SieveState;

/// Everything that can go wrong while building or querying a sieve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SieveError {
    /// Backing storage for the flags could not be reserved.
    #[error("failed to allocate {words} words of flag storage")]
    AllocationFailure { words: usize },

    /// A flag index past the end of the container. Only reachable through a logic bug.
    #[error("flag index {index} out of range for container of {len} flags")]
    IndexError { index: usize, len: usize },

    /// `clear_rotating` with a stride of zero would never advance.
    #[error("clear stride must be non-zero")]
    ZeroStride,

    /// Negative sieve limits are meaningless.
    #[error("invalid sieve limit {0}: must be non-negative")]
    InvalidLimit(i64),

    /// Operation issued in the wrong lifecycle state.
    #[error("sieve is {found:?}, operation requires {expected:?}")]
    InvalidState {
        expected: SieveState,
        found: SieveState,
    },

    /// Primality query above the sieve limit.
    #[error("{value} is above the sieve limit {limit}")]
    OutOfRange { value: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, SieveError>;
