//! Packed, bit-addressable storage.
//!
//! Bits are stored in 32-bit words, most significant bit first, so logical
//! index `k` lives in word `k / 32` at offset `k % 32` counted from the top of
//! the word. Index 0 is the first bit of the stream.

use crate::cs::error::{Error, Result};
use bitvec::prelude::*;
use std::fmt;

/// Storage word used by [`BitBuffer`].
pub type Word = u32;

/// Width in bits of a storage word.
pub const WORD_BITS: usize = Word::BITS as usize;

/// A fixed-length sequence of bits with bounds-checked accessors.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitBuffer {
    bits: BitVec<Word, Msb0>,
}

impl BitBuffer {
    /// Creates a buffer of `len` bits, all cleared.
    pub fn zeroed(len: usize) -> Self {
        BitBuffer {
            bits: bitvec![Word, Msb0; 0; len],
        }
    }

    /// Parses a string of `0` and `1` characters.
    ///
    /// Whitespace and `_` separators are skipped so that grouped streams such
    /// as `"1101 0011"` can be written directly.
    pub fn from_bit_str(s: &str) -> Result<Self> {
        let mut bits = BitVec::<Word, Msb0>::with_capacity(s.len());
        for (i, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                c if c.is_whitespace() || c == '_' => {}
                c => {
                    return Err(Error::InvalidInput(format!(
                        "unexpected character {:?} at offset {} in bit string",
                        c, i
                    )))
                }
            }
        }
        bits.set_uninitialized(false);
        Ok(BitBuffer { bits })
    }

    /// Views `bytes` as a bit stream, most significant bit of each byte first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bits = BitVec::<Word, Msb0>::with_capacity(bytes.len() * 8);
        bits.extend_from_bitslice(bytes.view_bits::<Msb0>());
        bits.set_uninitialized(false);
        BitBuffer { bits }
    }

    /// Takes the first `len` bits of already packed storage words.
    pub fn from_words(words: &[Word], len: usize) -> Result<Self> {
        let available = words.len() * WORD_BITS;
        if len > available {
            return Err(Error::InvalidInput(format!(
                "{} words hold {} bits, cannot take {}",
                words.len(),
                available,
                len
            )));
        }
        let mut bits = BitVec::<Word, Msb0>::from_slice(words);
        bits.truncate(len);
        bits.set_uninitialized(false);
        Ok(BitBuffer { bits })
    }

    /// Logical length in bits.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Maps a logical index to its `(word, offset)` storage location.
    pub fn word_and_offset(index: usize) -> (usize, usize) {
        (index / WORD_BITS, index % WORD_BITS)
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.bits.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.bits.len(),
            });
        }
        Ok(())
    }

    /// Returns the bit at `index`.
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.bits[index])
    }

    /// Writes the bit at `index`, leaving every other bit untouched.
    pub fn set(&mut self, index: usize, bit: bool) -> Result<()> {
        self.check(index)?;
        self.bits.set(index, bit);
        Ok(())
    }

    /// Inverts the bit at `index`.
    pub fn flip(&mut self, index: usize) -> Result<()> {
        self.check(index)?;
        let bit = self.bits[index];
        self.bits.set(index, !bit);
        Ok(())
    }

    /// Underlying storage words. Bits past `len()` in the last word are zero.
    pub fn words(&self) -> &[Word] {
        self.bits.as_raw_slice()
    }

    /// Packs the stream into bytes, zero-padding the final byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = bitvec![u8, Msb0; 0; self.bits.len()];
        bytes.clone_from_bitslice(&self.bits);
        bytes.into_vec()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().by_vals()
    }

    pub(crate) fn as_bitslice(&self) -> &BitSlice<Word, Msb0> {
        &self.bits
    }

    pub(crate) fn as_mut_bitslice(&mut self) -> &mut BitSlice<Word, Msb0> {
        &mut self.bits
    }
}

impl fmt::Display for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.iter() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
