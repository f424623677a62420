//! Match length codec.
//!
//! Length offsets `l = len - MIN_MATCH_LEN` fall into three bands:
//!
//! ```text
//! band  choice0  choice1  l          coded as
//! low   0        -        [0, 7]     l      in low[pos_state]  (3 bits)
//! mid   1        0        [8, 15]    l - 8  in mid[pos_state]  (3 bits)
//! high  1        1        [16, 271]  l - 16 in high            (8 bits)
//! ```
//!
//! Short lengths are the common case, so they get the shortest codes and their
//! own statistics per position state.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::prob::Prob;
use crate::range::{RangeDecoder, RangeEncoder};
use crate::tree::BitTree;

/// Bits of the low band trees.
pub const LOW_BITS: u32 = 3;
/// Bits of the mid band trees.
pub const MID_BITS: u32 = 3;
/// Bits of the high band tree.
pub const HIGH_BITS: u32 = 8;

const LOW_SYMBOLS: u32 = 1 << LOW_BITS;
const MID_SYMBOLS: u32 = 1 << MID_BITS;
const HIGH_SYMBOLS: u32 = 1 << HIGH_BITS;

/// Shortest representable match length.
pub const MIN_MATCH_LEN: u32 = 2;
/// Longest representable match length.
pub const MAX_MATCH_LEN: u32 = MIN_MATCH_LEN + LOW_SYMBOLS + MID_SYMBOLS + HIGH_SYMBOLS - 1;
/// Largest length offset accepted by [`LengthCodec::encode`].
pub const MAX_LEN_OFFSET: u32 = MAX_MATCH_LEN - MIN_MATCH_LEN;

/// Maximum number of position bits selecting a position state.
pub const MAX_POS_BITS: u32 = 4;
/// Number of position states the codec keeps statistics for.
pub const POS_STATES_MAX: usize = 1 << MAX_POS_BITS;

type LowTree = BitTree<{ (1 << LOW_BITS) - 1 }>;
type MidTree = BitTree<{ (1 << MID_BITS) - 1 }>;
type HighTree = BitTree<{ (1 << HIGH_BITS) - 1 }>;

/// Number of low position bits that form the position state (LZMA `pb`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PosBits(u32);

impl PosBits {
    /// The LZMA default, `pb = 2`.
    pub const DEFAULT: PosBits = PosBits(2);

    /// Create a position bit count.
    ///
    /// # Errors
    /// Returns `Error::InvalidPosBits` if `bits > MAX_POS_BITS`.
    pub fn new(bits: u32) -> Result<Self> {
        if bits > MAX_POS_BITS {
            return Err(Error::InvalidPosBits(bits));
        }
        Ok(Self(bits))
    }

    /// Number of bits.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of distinct position states.
    pub fn pos_states(self) -> usize {
        1 << self.0
    }

    /// Position state for an uncompressed stream position.
    pub fn pos_state(self, position: u64) -> u32 {
        (position & ((1 << self.0) - 1)) as u32
    }
}

impl Default for PosBits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Adaptive codec for match length offsets in `[0, MAX_LEN_OFFSET]`.
#[derive(Clone, Debug)]
pub struct LengthCodec {
    choice: [Prob; 2],
    low: [LowTree; POS_STATES_MAX],
    mid: [MidTree; POS_STATES_MAX],
    high: HighTree,
}

impl LengthCodec {
    /// Create a codec with all probabilities unbiased.
    pub fn new() -> Self {
        Self {
            choice: [Prob::new(); 2],
            low: [LowTree::new(); POS_STATES_MAX],
            mid: [MidTree::new(); POS_STATES_MAX],
            high: HighTree::new(),
        }
    }

    /// Encode the length offset `l` in the context of `pos_state`.
    ///
    /// # Errors
    /// Returns `Error::LengthOutOfRange` if `l > MAX_LEN_OFFSET` and
    /// `Error::PosStateOutOfRange` if `pos_state >= POS_STATES_MAX`. Nothing is
    /// written in either case.
    pub fn encode<W: Write>(
        &mut self,
        l: u32,
        pos_state: u32,
        enc: &mut RangeEncoder<W>,
    ) -> Result<()> {
        if l > MAX_LEN_OFFSET {
            return Err(Error::LengthOutOfRange(l));
        }
        let ps = check_pos_state(pos_state)?;

        if l < LOW_SYMBOLS {
            self.choice[0].encode(0, enc)?;
            return self.low[ps].encode(l, enc);
        }
        self.choice[0].encode(1, enc)?;
        if l < LOW_SYMBOLS + MID_SYMBOLS {
            self.choice[1].encode(0, enc)?;
            return self.mid[ps].encode(l - LOW_SYMBOLS, enc);
        }
        self.choice[1].encode(1, enc)?;
        self.high.encode(l - LOW_SYMBOLS - MID_SYMBOLS, enc)
    }

    /// Decode a length offset in the context of `pos_state`.
    ///
    /// # Errors
    /// Returns `Error::PosStateOutOfRange` for an invalid `pos_state`, and
    /// propagates stream errors from the range decoder.
    pub fn decode<R: Read>(&mut self, pos_state: u32, dec: &mut RangeDecoder<R>) -> Result<u32> {
        let ps = check_pos_state(pos_state)?;

        if self.choice[0].decode(dec)? == 0 {
            return self.low[ps].decode(dec);
        }
        if self.choice[1].decode(dec)? == 0 {
            return Ok(self.mid[ps].decode(dec)? + LOW_SYMBOLS);
        }
        Ok(self.high.decode(dec)? + LOW_SYMBOLS + MID_SYMBOLS)
    }

    /// Encode a raw match length in `[MIN_MATCH_LEN, MAX_MATCH_LEN]`.
    pub fn encode_match_len<W: Write>(
        &mut self,
        len: u32,
        pos_state: u32,
        enc: &mut RangeEncoder<W>,
    ) -> Result<()> {
        if !(MIN_MATCH_LEN..=MAX_MATCH_LEN).contains(&len) {
            return Err(Error::MatchLenOutOfRange(len));
        }
        self.encode(len - MIN_MATCH_LEN, pos_state, enc)
    }

    /// Decode a raw match length.
    pub fn decode_match_len<R: Read>(
        &mut self,
        pos_state: u32,
        dec: &mut RangeDecoder<R>,
    ) -> Result<u32> {
        Ok(self.decode(pos_state, dec)? + MIN_MATCH_LEN)
    }

    #[cfg(test)]
    fn all_probs(&self) -> impl Iterator<Item = &Prob> {
        self.choice
            .iter()
            .chain(self.low.iter().flat_map(|t| t.probs()))
            .chain(self.mid.iter().flat_map(|t| t.probs()))
            .chain(self.high.probs())
    }
}

impl Default for LengthCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[inline]
fn check_pos_state(pos_state: u32) -> Result<usize> {
    let ps = pos_state as usize;
    if ps >= POS_STATES_MAX {
        return Err(Error::PosStateOutOfRange(pos_state));
    }
    Ok(ps)
}
