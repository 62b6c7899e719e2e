//! Error types shared by the coding modules.

use thiserror::Error;

/// Errors raised by bit buffers and codecs.
///
/// Corrupted codewords are not errors: the bit-level decoder reports them per
/// block and keeps going. These variants cover caller mistakes and the
/// byte-level API, which has no other way to surface an uncorrectable block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("bit index {index} out of range for buffer of {len} bits")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("length {len} is not a multiple of the {block}-bit block size")]
    InvalidLength { len: usize, block: usize },

    #[error("uncorrectable double-bit error in block {block} (syndrome {syndrome})")]
    Uncorrectable { block: usize, syndrome: u8 },
}

pub type Result<T> = std::result::Result<T, Error>;
