//! # LZMA Range Coding
//!
//! *Adaptive binary arithmetic coding with bit trees and a banded length code.*
//!
//! ## Intuition First
//!
//! Picture the interval `[0, 1)`. To code a bit, cut the interval in two: the
//! left part for a 0, the right part for a 1, each as wide as that bit is
//! likely. Keep the part that matches the bit and repeat. After many bits the
//! surviving interval is tiny, and any number inside it identifies the whole
//! sequence. Likely bits barely shrink the interval, so they cost almost
//! nothing to write down.
//!
//! A range coder does exactly this with 32-bit integers instead of reals,
//! shipping out the settled top byte whenever the interval gets too narrow.
//!
//! ## The Problem
//!
//! LZ77 compressors produce small integers (match lengths, distances) whose
//! distribution shifts with the input. Static codes waste bits when the
//! statistics move, and a multi-symbol adaptive arithmetic coder is costly to
//! update. LZMA's answer:
//! - Code every integer as a sequence of **binary** decisions.
//! - Give each decision its own tiny adaptive counter.
//! - Organize the decisions as a **bit tree**, so every prefix of a symbol has
//!   separate statistics.
//!
//! ## Historical Context
//!
//! ```text
//! 1976  Rissanen       Arithmetic coding
//! 1979  Martin         Range coding: arithmetic coding on bytes
//! 1998  Pavlov         LZMA in 7-Zip, binary adaptive range coder
//! 2009  xz / liblzma   LZMA2 container, same entropy coder
//! ```
//!
//! ## Mathematical Formulation
//!
//! With probability `p` (out of `2^11`) that the next bit is 0, the encoder
//! splits its range at
//!
//! ```text
//! bound = (range >> 11) * p
//! bit 0:  range = bound
//! bit 1:  low += bound, range -= bound
//! ```
//!
//! and then moves `p` toward the outcome:
//!
//! ```text
//! bit 0:  p += (2^11 - p) >> 5
//! bit 1:  p -= p >> 5
//! ```
//!
//! When `range < 2^24` both sides shift by one byte. The decoder follows the
//! same steps on `code = value - low`, so it never needs `low` at all.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(1)$ per bit; a length costs at most 10 coded bits.
//! - **Space**: a [`LengthCodec`] holds 481 probabilities of 2 bytes each.
//!
//! ## Failure Modes
//!
//! 1. **Divergence**: encoder and decoder must apply the same updates in the
//!    same order with the same position states. Any mismatch silently yields
//!    garbage.
//! 2. **Truncation**: a stream that ends early surfaces as
//!    [`Error::UnexpectedEof`]; the session cannot be resumed.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`Prob`]: the adaptive bit probability.
//! - [`RangeEncoder`] / [`RangeDecoder`]: the carry-propagating coder over any
//!   `Write` / `Read`, including raw 50/50 direct bits.
//! - [`BitTree`]: fixed-width symbols over a flat trie of probabilities.
//! - [`LengthCodec`]: the three-band LZMA match length code.
//!
//! The model constants are the LZMA ones, so streams are bit-compatible with
//! LZMA length coding.
//!
//! ## References
//!
//! - Martin, G. N. N. (1979). "Range encoding: an algorithm for removing redundancy from a digitised message."
//! - Pavlov, I. "LZMA SDK", `LzmaEnc.c` / `LzmaDec.c`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod length;
pub mod prob;
pub mod range;
pub mod tree;

pub use error::{Error, Result};
pub use length::{LengthCodec, PosBits, MAX_LEN_OFFSET, MAX_MATCH_LEN, MIN_MATCH_LEN};
pub use prob::Prob;
pub use range::{RangeDecoder, RangeEncoder};
pub use tree::BitTree;
