//! Error correction code implementations.
//!
//! This module provides:
//! - A packed, bit-addressable buffer used as the working storage of the codecs
//! - The extended Hamming (8,4) code, correcting one and detecting two bit errors per block
//!
//! # Error Correction Algorithms
//!
//! Error correction codes are used to detect and correct errors in data
//! transmission and storage, making digital communications more reliable.
//!
//! # Examples
//!
//! ```rust
//! use hamming_secded::cs::ecc::{create_hamming_8_4, ErrorCorrection};
//!
//! let code = create_hamming_8_4();
//! let mut encoded = ErrorCorrection::encode(&code, b"Hi").unwrap();
//! encoded[0] ^= 0x10;
//! assert_eq!(ErrorCorrection::decode(&code, &encoded).unwrap(), b"Hi");
//! ```

use crate::cs::error::Error;

/// Result type for error correction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for error correction code implementations
pub trait ErrorCorrection {
    /// Encode data with error correction symbols
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode data and correct errors if possible
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>>;
}

pub mod bit_buffer;
pub mod hamming;

pub use bit_buffer::BitBuffer;
pub use hamming::{
    create_hamming_8_4, hamming84_decode, hamming84_encode, BlockReport, BlockStatus,
    DecodeReport, Decoded, HammingCode, HammingConfig, ParityBitPolicy,
};
