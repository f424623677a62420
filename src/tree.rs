//! Bit-tree codec for fixed-width symbols.
//!
//! A symbol of `BITS` bits is coded most significant bit first. Each prefix of
//! the symbol selects its own [`Prob`], so the probabilities form a complete
//! binary trie with `2^BITS - 1` internal nodes. The trie is stored flat: the
//! node reached through prefix index `m` (starting at 1, child `2m + bit`)
//! lives at `probs[m - 1]`.

use std::io::{Read, Write};

use crate::error::Result;
use crate::prob::Prob;
use crate::range::{RangeDecoder, RangeEncoder};

/// Bit-tree codec with `NODES = 2^BITS - 1` probability nodes.
#[derive(Clone, Copy, Debug)]
pub struct BitTree<const NODES: usize> {
    probs: [Prob; NODES],
}

impl<const NODES: usize> BitTree<NODES> {
    /// Width in bits of the symbols this tree codes.
    pub const BITS: u32 = (NODES + 1).trailing_zeros();

    const VALID_SHAPE: () = assert!(
        NODES > 0 && (NODES + 1).is_power_of_two(),
        "bit tree node count must be 2^bits - 1"
    );

    /// Create a tree with every node unbiased.
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_SHAPE;
        Self {
            probs: [Prob::new(); NODES],
        }
    }

    /// Encode `symbol`, which must be below `2^BITS`.
    pub fn encode<W: Write>(&mut self, symbol: u32, enc: &mut RangeEncoder<W>) -> Result<()> {
        debug_assert!(symbol < (1 << Self::BITS));
        let mut m = 1usize;
        for i in (0..Self::BITS).rev() {
            let bit = (symbol >> i) & 1;
            self.probs[m - 1].encode(bit, enc)?;
            m = (m << 1) | bit as usize;
        }
        Ok(())
    }

    /// Decode a symbol in `[0, 2^BITS)`.
    pub fn decode<R: Read>(&mut self, dec: &mut RangeDecoder<R>) -> Result<u32> {
        let mut m = 1usize;
        for _ in 0..Self::BITS {
            let bit = self.probs[m - 1].decode(dec)?;
            m = (m << 1) | bit as usize;
        }
        Ok((m - (1 << Self::BITS)) as u32)
    }

    /// The node probabilities in trie order.
    pub fn probs(&self) -> &[Prob] {
        &self.probs
    }
}

impl<const NODES: usize> Default for BitTree<NODES> {
    fn default() -> Self {
        Self::new()
    }
}
