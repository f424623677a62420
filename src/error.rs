//! Error types for range coding and length coding.

use thiserror::Error;

use crate::length::{MAX_LEN_OFFSET, MAX_MATCH_LEN, MAX_POS_BITS, MIN_MATCH_LEN, POS_STATES_MAX};

/// Error variants for range coder operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Length offset passed to the encoder is larger than the codec can represent.
    #[error("length offset {0} out of range (max {max})", max = MAX_LEN_OFFSET)]
    LengthOutOfRange(u32),

    /// Raw match length is outside `[MIN_MATCH_LEN, MAX_MATCH_LEN]`.
    #[error("match length {0} out of range [{min}, {max}]", min = MIN_MATCH_LEN, max = MAX_MATCH_LEN)]
    MatchLenOutOfRange(u32),

    /// Position state does not select one of the per-position trees.
    #[error("position state {0} out of range (max {max})", max = POS_STATES_MAX - 1)]
    PosStateOutOfRange(u32),

    /// Requested number of position bits exceeds what the length codec supports.
    #[error("position bits {0} out of range (max {max})", max = MAX_POS_BITS)]
    InvalidPosBits(u32),

    /// The byte source ran dry while the decoder still needed input.
    #[error("unexpected end of range coded stream")]
    UnexpectedEof,

    /// The stream cannot have been produced by a range encoder.
    #[error("corrupted range coded stream: {0}")]
    Corrupted(&'static str),

    /// An I/O error occurred while writing or reading the byte stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for range coder operations.
pub type Result<T> = std::result::Result<T, Error>;
