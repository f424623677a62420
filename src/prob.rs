//! Adaptive bit probability model.
//!
//! A [`Prob`] estimates `P(bit = 0)` as a count out of [`PROB_TOTAL`]. After
//! every coded bit the estimate moves toward the observed outcome by
//! `1 / 2^MOVE_BITS` of the remaining distance, an exponential moving average
//! in integer arithmetic.
//!
//! Encoder and decoder both go through [`Prob::bound`] and [`Prob::update`],
//! so the two sides cannot drift apart.

use std::io::{Read, Write};

use crate::error::Result;
use crate::range::{RangeDecoder, RangeEncoder};

/// Precision of a probability in bits.
pub const PROB_BITS: u32 = 11;

/// Fixed-point total; a probability is a count out of this value.
pub const PROB_TOTAL: u32 = 1 << PROB_BITS;

/// Initial, unbiased probability.
pub const PROB_INIT: u16 = (PROB_TOTAL / 2) as u16;

/// Adaptation shift of the moving average.
pub const MOVE_BITS: u32 = 5;

/// Adaptive estimate of the probability that the next bit is 0.
///
/// The value stays strictly inside `(0, PROB_TOTAL)`: with a shift of 5 it
/// settles in `[31, 2017]` no matter how skewed the input is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prob(u16);

impl Prob {
    /// Create an unbiased probability.
    pub const fn new() -> Self {
        Self(PROB_INIT)
    }

    /// Current estimate, out of [`PROB_TOTAL`].
    pub fn value(self) -> u16 {
        self.0
    }

    /// Split point of `range` for a 0 bit.
    #[inline(always)]
    pub(crate) fn bound(self, range: u32) -> u32 {
        (range >> PROB_BITS) * u32::from(self.0)
    }

    /// Move the estimate toward the observed `bit`.
    #[inline(always)]
    pub(crate) fn update(&mut self, bit: u32) {
        if bit == 0 {
            self.0 += ((PROB_TOTAL - u32::from(self.0)) >> MOVE_BITS) as u16;
        } else {
            self.0 -= self.0 >> MOVE_BITS;
        }
    }

    /// Encode `bit` (0 or 1) with this probability and adapt.
    pub fn encode<W: Write>(&mut self, bit: u32, enc: &mut RangeEncoder<W>) -> Result<()> {
        enc.encode_bit(self, bit)
    }

    /// Decode one bit with this probability and adapt.
    pub fn decode<R: Read>(&mut self, dec: &mut RangeDecoder<R>) -> Result<u32> {
        dec.decode_bit(self)
    }
}

impl Default for Prob {
    fn default() -> Self {
        Self::new()
    }
}
