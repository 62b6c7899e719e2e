//! Extended Hamming (8,4) error correction code implementation.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming in 1950.
//! The (7,4) code protects 4 data bits with 3 parity bits and can correct any single-bit error.
//! Adding an overall parity bit gives the extended (8,4) code, which still corrects one error
//! per block and additionally detects (without correcting) any two-bit error.
//!
//! Codeword layout, positions numbered from the first bit of each 8-bit block:
//!
//! | position | 0  | 1  | 2  | 3              | 4  | 5              | 6              | 7       |
//! |----------|----|----|----|----------------|----|----------------|----------------|---------|
//! | content  | d0 | d1 | d2 | d0 ^ d1 ^ d2   | d3 | d0 ^ d1 ^ d3   | d0 ^ d2 ^ d3   | overall |
//!
//! Decoding computes the syndrome `s = 4*c3 + 2*c2 + c1` from the checks
//! `c1 = b6^b4^b2^b0`, `c2 = b5^b4^b1^b0` and `c3 = b3^b2^b1^b0`, and compares the
//! overall parity. A single error sits at position `7 - s`.
//!
//! # Applications
//!
//! - Computer memory (ECC RAM)
//! - Satellite communications
//! - Digital broadcasting
//! - Data storage systems
//!
//! # Examples
//!
//! ```
//! use hamming_secded::cs::ecc::bit_buffer::BitBuffer;
//! use hamming_secded::cs::ecc::hamming::{BlockStatus, HammingCode};
//!
//! let code = HammingCode::default();
//! let data = BitBuffer::from_bit_str("1101").unwrap();
//! let mut codeword = code.encode(&data).unwrap();
//! assert_eq!(codeword.to_string(), "11001100");
//!
//! codeword.flip(2).unwrap();
//! let decoded = code.decode(&mut codeword).unwrap();
//! assert_eq!(decoded.data, data);
//! assert_eq!(decoded.report.blocks()[0].status, BlockStatus::Corrected { position: 2 });
//! ```

use crate::cs::ecc::bit_buffer::{BitBuffer, Word};
use crate::cs::ecc::{ErrorCorrection, Result};
use crate::cs::error::Error;
use bitvec::prelude::*;
use log::{debug, trace, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Data bits per block.
pub const DATA_BITS: usize = 4;

/// Bits per encoded block.
pub const CODEWORD_BITS: usize = 8;

/// Codeword positions carrying d0, d1, d2 and d3.
pub const DATA_POSITIONS: [usize; DATA_BITS] = [0, 1, 2, 4];

/// Codeword positions carrying the Hamming parity bits.
pub const PARITY_POSITIONS: [usize; 3] = [3, 5, 6];

/// Codeword position of the overall parity bit.
pub const OVERALL_PARITY_POSITION: usize = 7;

/// What the decoder does when only the overall parity bit is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParityBitPolicy {
    /// Report the anomaly and leave the codeword as received.
    #[default]
    Report,
    /// Flip position 7 back, since it is identified unambiguously.
    Correct,
}

/// Configuration for the (8,4) codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingConfig {
    /// Handling of a lone overall-parity error
    pub parity_bit_policy: ParityBitPolicy,
    /// Minimum number of blocks before decoding fans out to the rayon pool.
    /// Only consulted with the `parallel` feature.
    pub parallel_threshold: usize,
}

impl Default for HammingConfig {
    fn default() -> Self {
        Self {
            parity_bit_policy: ParityBitPolicy::Report,
            parallel_threshold: 4096,
        }
    }
}

impl HammingConfig {
    pub fn with_parity_bit_policy(mut self, policy: ParityBitPolicy) -> Self {
        self.parity_bit_policy = policy;
        self
    }

    pub fn with_parallel_threshold(mut self, blocks: usize) -> Self {
        self.parallel_threshold = blocks;
        self
    }
}

/// Outcome of decoding one 8-bit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStatus {
    /// Syndrome zero and overall parity consistent.
    Clean,
    /// Single-bit error at `position` (0..=6 within the block), flipped back.
    Corrected { position: usize },
    /// Only the overall parity bit disagrees. `corrected` tells whether it was flipped back.
    ParityBitError { corrected: bool },
    /// Two bits flipped. The syndrome is the XOR of both error locations and
    /// cannot point at either, so the block is passed through as received.
    DoubleError { syndrome: u8 },
}

impl BlockStatus {
    /// Whether the block was received with any detected error.
    pub fn is_error(&self) -> bool {
        !matches!(self, BlockStatus::Clean)
    }

    /// Whether the block's data bits may be wrong.
    pub fn is_uncorrectable(&self) -> bool {
        matches!(self, BlockStatus::DoubleError { .. })
    }

    /// Position inside the block that the decoder flips, if any.
    pub fn flipped_position(&self) -> Option<usize> {
        match *self {
            BlockStatus::Corrected { position } => Some(position),
            BlockStatus::ParityBitError { corrected: true } => Some(OVERALL_PARITY_POSITION),
            _ => None,
        }
    }
}

/// Status of a block together with its index in the codeword stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockReport {
    pub block: usize,
    pub status: BlockStatus,
}

impl BlockReport {
    /// Index of the block's first bit in the codeword stream.
    pub fn base(&self) -> usize {
        self.block * CODEWORD_BITS
    }

    /// Stream index of the bit the decoder flipped, if any.
    pub fn corrected_position(&self) -> Option<usize> {
        self.status.flipped_position().map(|p| self.base() + p)
    }
}

/// Per-block findings of one decode pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodeReport {
    blocks: Vec<BlockReport>,
}

impl DecodeReport {
    pub fn blocks(&self) -> &[BlockReport] {
        &self.blocks
    }

    /// True when no block showed any error.
    pub fn is_clean(&self) -> bool {
        self.blocks.iter().all(|b| !b.status.is_error())
    }

    /// Number of blocks with a detected error, corrected or not.
    pub fn error_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.status.is_error()).count()
    }

    /// Stream indices of every bit flipped back during decoding.
    pub fn corrected_positions(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .filter_map(BlockReport::corrected_position)
            .collect()
    }

    /// Indices of blocks whose data could not be trusted.
    pub fn uncorrectable_blocks(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .filter(|b| b.status.is_uncorrectable())
            .map(|b| b.block)
            .collect()
    }
}

/// Result of decoding a codeword stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Four data bits per block, best effort for uncorrectable blocks
    pub data: BitBuffer,
    pub report: DecodeReport,
}

/// Extended Hamming (8,4) codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingCode {
    config: HammingConfig,
}

impl HammingCode {
    pub fn new(config: HammingConfig) -> Self {
        HammingCode { config }
    }

    pub fn config(&self) -> &HammingConfig {
        &self.config
    }

    /// Number of codeword bits produced for `data_bits` input bits.
    pub fn encoded_len(&self, data_bits: usize) -> usize {
        data_bits / DATA_BITS * CODEWORD_BITS
    }

    /// Encodes the whole of `data`.
    pub fn encode(&self, data: &BitBuffer) -> Result<BitBuffer> {
        self.encode_prefix(data, data.len())
    }

    /// Encodes the first `len` bits of `data`, which must be a multiple of 4.
    ///
    /// # Returns
    ///
    /// A new buffer of `2 * len` bits
    pub fn encode_prefix(&self, data: &BitBuffer, len: usize) -> Result<BitBuffer> {
        check_len(len, DATA_BITS, data.len())?;

        let input = &data.as_bitslice()[..len];
        let mut encoded = BitBuffer::zeroed(self.encoded_len(len));
        let output = encoded.as_mut_bitslice();

        for (block, out) in input
            .chunks_exact(DATA_BITS)
            .zip(output.chunks_exact_mut(CODEWORD_BITS))
        {
            encode_block(block, out);
        }

        Ok(encoded)
    }

    /// Decodes the whole of `codeword`, correcting it in place.
    pub fn decode(&self, codeword: &mut BitBuffer) -> Result<Decoded> {
        let len = codeword.len();
        self.decode_prefix(codeword, len)
    }

    /// Decodes the first `len` bits of `codeword`, which must be a multiple of 8.
    ///
    /// Single-bit errors are flipped back in `codeword`. Double errors and a
    /// lone overall-parity error are reported in the returned [`DecodeReport`];
    /// they never stop the pass.
    pub fn decode_prefix(&self, codeword: &mut BitBuffer, len: usize) -> Result<Decoded> {
        check_len(len, CODEWORD_BITS, codeword.len())?;

        let statuses = self.classify_blocks(&codeword.as_bitslice()[..len]);
        let mut data = BitBuffer::zeroed(statuses.len() * DATA_BITS);
        let mut blocks = Vec::with_capacity(statuses.len());

        for (block, status) in statuses.into_iter().enumerate() {
            let report = BlockReport { block, status };
            let base = report.base();

            match status {
                BlockStatus::Clean => trace!("block {}: clean", block),
                BlockStatus::Corrected { position } => debug!(
                    "block {}: single-bit error at position {} (stream bit {}), corrected",
                    block,
                    position,
                    base + position
                ),
                BlockStatus::ParityBitError { corrected } => warn!(
                    "block {}: overall parity bit (stream bit {}) is wrong{}",
                    block,
                    base + OVERALL_PARITY_POSITION,
                    if corrected { ", corrected" } else { "" }
                ),
                BlockStatus::DoubleError { syndrome } => warn!(
                    "block {}: double-bit error detected (syndrome {}), data passed through",
                    block, syndrome
                ),
            }

            if let Some(position) = report.corrected_position() {
                codeword.flip(position)?;
            }

            for (i, &position) in DATA_POSITIONS.iter().enumerate() {
                data.set(block * DATA_BITS + i, codeword.get(base + position)?)?;
            }
            blocks.push(report);
        }

        Ok(Decoded {
            data,
            report: DecodeReport { blocks },
        })
    }

    fn classify_blocks(&self, bits: &BitSlice<Word, Msb0>) -> Vec<BlockStatus> {
        let policy = self.config.parity_bit_policy;

        #[cfg(feature = "parallel")]
        {
            if bits.len() / CODEWORD_BITS >= self.config.parallel_threshold {
                let blocks: Vec<&BitSlice<Word, Msb0>> = bits.chunks_exact(CODEWORD_BITS).collect();
                return blocks
                    .par_iter()
                    .map(|block| classify(*block, policy))
                    .collect();
            }
        }

        bits.chunks_exact(CODEWORD_BITS)
            .map(|block| classify(block, policy))
            .collect()
    }
}

impl ErrorCorrection for HammingCode {
    /// Encodes each byte as two codewords, high nibble first.
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let encoded = HammingCode::encode(self, &BitBuffer::from_bytes(data))?;
        Ok(encoded.to_bytes())
    }

    /// Decodes codeword bytes, failing on the first block with a double error.
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut codeword = BitBuffer::from_bytes(data);
        let decoded = HammingCode::decode(self, &mut codeword)?;

        let uncorrectable = decoded.report.blocks().iter().find_map(|b| match b.status {
            BlockStatus::DoubleError { syndrome } => Some((b.block, syndrome)),
            _ => None,
        });
        if let Some((block, syndrome)) = uncorrectable {
            return Err(Error::Uncorrectable { block, syndrome });
        }

        Ok(decoded.data.to_bytes())
    }
}

fn check_len(len: usize, block: usize, available: usize) -> Result<()> {
    if len % block != 0 {
        return Err(Error::InvalidLength { len, block });
    }
    if len > available {
        return Err(Error::InvalidInput(format!(
            "requested {} bits from a buffer of {} bits",
            len, available
        )));
    }
    Ok(())
}

/// Writes the 8-bit codeword for the 4 data bits in `data` into `out`.
fn encode_block<T, U>(data: &BitSlice<T, Msb0>, out: &mut BitSlice<U, Msb0>)
where
    T: BitStore,
    U: BitStore,
{
    let (d0, d1, d2, d3) = (data[0], data[1], data[2], data[3]);

    for (&position, bit) in DATA_POSITIONS.iter().zip([d0, d1, d2, d3]) {
        out.set(position, bit);
    }

    // Even parity
    let [p3, p5, p6] = PARITY_POSITIONS;
    out.set(p3, d0 ^ d1 ^ d2);
    out.set(p5, d0 ^ d1 ^ d3);
    out.set(p6, d0 ^ d2 ^ d3);

    let overall = out[..OVERALL_PARITY_POSITION].count_ones() % 2 == 1;
    out.set(OVERALL_PARITY_POSITION, overall);
}

/// Syndrome `4*c3 + 2*c2 + c1` of an 8-bit block.
///
/// Zero for a valid codeword. For a single error at position `p` in 0..=6 it
/// equals `7 - p`; the overall parity bit does not take part.
pub fn syndrome<T: BitStore>(block: &BitSlice<T, Msb0>) -> u8 {
    let c1 = block[6] ^ block[4] ^ block[2] ^ block[0];
    let c2 = block[5] ^ block[4] ^ block[1] ^ block[0];
    let c3 = block[3] ^ block[2] ^ block[1] ^ block[0];
    (c3 as u8) << 2 | (c2 as u8) << 1 | c1 as u8
}

fn classify<T: BitStore>(block: &BitSlice<T, Msb0>, policy: ParityBitPolicy) -> BlockStatus {
    let s = syndrome(block);
    let observed = block[..OVERALL_PARITY_POSITION].count_ones() % 2 == 1;
    let parity_ok = observed == block[OVERALL_PARITY_POSITION];

    match (parity_ok, s) {
        (true, 0) => BlockStatus::Clean,
        (true, syndrome) => BlockStatus::DoubleError { syndrome },
        (false, 0) => BlockStatus::ParityBitError {
            corrected: policy == ParityBitPolicy::Correct,
        },
        (false, s) => BlockStatus::Corrected {
            position: OVERALL_PARITY_POSITION - s as usize,
        },
    }
}

/// Encodes the low nibble of `nibble` (d0 is bit 3) into a codeword byte
/// whose most significant bit is position 0.
pub fn encode_nibble(nibble: u8) -> u8 {
    let data = (nibble & 0x0F) << 4;
    let mut codeword = 0u8;
    encode_block(
        &data.view_bits::<Msb0>()[..DATA_BITS],
        codeword.view_bits_mut::<Msb0>(),
    );
    codeword
}

/// Creates an extended (8,4) Hamming code with default settings
pub fn create_hamming_8_4() -> HammingCode {
    HammingCode::default()
}

/// Encodes the first `len` bits of `bits` with the default (8,4) code
pub fn hamming84_encode(bits: &BitBuffer, len: usize) -> Result<BitBuffer> {
    create_hamming_8_4().encode_prefix(bits, len)
}

/// Decodes the first `len` bits of `bits` in place with the default (8,4) code
pub fn hamming84_decode(bits: &mut BitBuffer, len: usize) -> Result<Decoded> {
    create_hamming_8_4().decode_prefix(bits, len)
}
