//! Bit-packed flag storage for the odd-only sieve.
//!
//! - 1 bit per flag, packed into `u32` words (bit 0 = least significant)
//! - flag `n` lives in word `n >> 5`, bit `n % 32`
//! - strided clears walk a single rotating mask instead of rebuilding one per bit

use crate::error::{Result, SieveError};

const WORD_BITS: usize = u32::BITS as usize;

// ─── Storage ───────────────────────────────────────────────────────────────

/// Fixed-length sequence of boolean flags, all `true` on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    words: Vec<u32>,
    len: usize,
}

/// Number of words needed to hold `size` flags.
#[inline]
pub fn words_for(size: usize) -> usize {
    (size >> 5) + usize::from(size & 31 > 0)
}

/// Initial value of word `i` when the first `covered_bytes` bytes are all-ones.
#[inline]
fn initial_word(i: usize, covered_bytes: usize) -> u32 {
    match covered_bytes.saturating_sub(i * 4) {
        0 => 0,
        b if b >= 4 => u32::MAX,
        b => (1u32 << (b * 8)) - 1,
    }
}

impl BitArray {
    /// Allocate `size` flags, all set.
    ///
    /// Every byte touching one of the `size` bits is filled with `0xFF`, so padding bits
    /// up to the next byte boundary are set as well. They are never read back.
    pub fn new(size: usize) -> Result<Self> {
        let n_words = words_for(size);
        let mut words = Vec::new();
        words
            .try_reserve_exact(n_words)
            .map_err(|_| SieveError::AllocationFailure { words: n_words })?;

        let covered_bytes = (size >> 3) + usize::from(size & 7 > 0);
        words.extend((0..n_words).map(|i| initial_word(i, covered_bytes)));

        Ok(Self { words, len: size })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw backing words, padding included.
    #[inline]
    pub fn as_words(&self) -> &[u32] {
        &self.words
    }

    #[inline]
    fn check(&self, index: usize) -> Result<()> {
        if index >= self.len {
            return Err(SieveError::IndexError { index, len: self.len });
        }
        Ok(())
    }

    /// Flag at `n`.
    #[inline]
    pub fn get(&self, n: usize) -> Result<bool> {
        self.check(n)?;
        Ok(self.words[n >> 5] & (1u32 << (n % WORD_BITS)) != 0)
    }

    /// Clear the flags at `start`, `start + stride`, `start + 2*stride`, ... below `len`.
    ///
    /// The word-local bit position advances by `stride % 32` per step, so the clear mask
    /// is rotated left by that amount instead of recomputed. A `start` at or past the end
    /// clears nothing.
    pub fn clear_rotating(&mut self, start: usize, stride: usize) -> Result<()> {
        if stride == 0 {
            return Err(SieveError::ZeroStride);
        }

        let roll = (stride % WORD_BITS) as u32;
        let mut mask = !(1u32 << (start % WORD_BITS));
        let mut n = start;
        while n < self.len {
            self.words[n >> 5] &= mask;
            mask = mask.rotate_left(roll);
            n = match n.checked_add(stride) {
                Some(next) => next,
                None => break,
            };
        }
        Ok(())
    }

    /// Number of set flags among the first `len`.
    pub fn count_ones_prefix(&self, len: usize) -> Result<usize> {
        if len > self.len {
            return Err(SieveError::IndexError { index: len - 1, len: self.len });
        }

        let full = len >> 5;
        let mut count: usize = self.words[..full]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();

        let tail = len & 31;
        if tail > 0 {
            count += (self.words[full] & ((1u32 << tail) - 1)).count_ones() as usize;
        }
        Ok(count)
    }

    /// Ascending indices of the set flags among the first `len`.
    pub fn iter_ones_prefix(&self, len: usize) -> Result<Ones<'_>> {
        if len > self.len {
            return Err(SieveError::IndexError { index: len - 1, len: self.len });
        }
        Ok(Ones::new(&self.words, len))
    }
}

// ─── Set-bit iteration ─────────────────────────────────────────────────────

/// Iterator over set flag indices, one word at a time.
///
/// Only set bits are visited: the lowest one is located with `trailing_zeros` and then
/// dropped with `w &= w - 1`.
#[derive(Debug, Clone)]
pub struct Ones<'a> {
    words: &'a [u32],
    len: usize,
    word_index: usize,
    current: u32,
}

impl<'a> Ones<'a> {
    fn new(words: &'a [u32], len: usize) -> Self {
        let current = Self::masked(words, 0, len);
        Self { words, len, word_index: 0, current }
    }

    /// Word `i` with bits at or past `len` cleared.
    #[inline]
    fn masked(words: &[u32], i: usize, len: usize) -> u32 {
        let base = i * WORD_BITS;
        if base >= len {
            return 0;
        }
        let w = words[i];
        match len - base {
            r if r >= WORD_BITS => w,
            r => w & ((1u32 << r) - 1),
        }
    }
}

impl Iterator for Ones<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        loop {
            if self.current != 0 {
                let tz = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                return Some(self.word_index * WORD_BITS + tz);
            }
            self.word_index += 1;
            if self.word_index * WORD_BITS >= self.len {
                return None;
            }
            self.current = Self::masked(self.words, self.word_index, self.len);
        }
    }
}
