//! Bit cursor primitives for the posocc feature codec.
//!
//! This crate provides the forward-only bit cursor shared by the symmetric encode
//! and decode paths of the feature codec: a [`BitWriter`] appending into a growable
//! vector of 64-bit words, and a [`BitReader`] consuming a bounded window of a
//! borrowed word slice.
//!
//! # Key Types
//!
//! - [`BitOrder`]: byte-order policy. Implemented for [`byteorder::BigEndian`]
//!   (bits fill a word from the most significant end) and
//!   [`byteorder::LittleEndian`] (bits fill a word from the least significant end).
//!   The same policy decides how words are serialized to bytes, so the first bit of
//!   the stream always lives in the first byte.
//! - [`BitWriter`]: append-only writer with alignment padding and Exponential-Golomb
//!   encoding.
//! - [`BitReader`]: bounds-checked reader with look-ahead, skipping and
//!   Exponential-Golomb decoding.
//!
//! # Usage Examples
//!
//! ```rust
//! use byteorder::BigEndian;
//! use posocc_bits::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::<BigEndian>::new();
//! writer.write_exp_golomb(17, 2);
//! writer.write_bits(0b101, 3);
//! let (words, bit_len) = writer.finish();
//!
//! let mut reader = BitReader::<BigEndian>::new(&words, 0, bit_len).unwrap();
//! assert_eq!(reader.read_exp_golomb(2).unwrap(), 17);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert!(reader.is_at_end());
//! ```

pub mod order;
pub mod reader;
pub mod writer;

pub use byteorder::{BigEndian, LittleEndian};
pub use order::{BitOrder, bytes_to_words, words_to_bytes};
pub use reader::BitReader;
pub use writer::BitWriter;

/// Number of bits in a storage word of the bit stream.
pub const WORD_BITS: u32 = 64;

/// Returns the number of bits taken by the Exponential-Golomb code of order `k`
/// for `value`.
#[inline]
pub fn exp_golomb_len(value: u64, k: u32) -> u32 {
    let x = value + (1u64 << k);
    let n = 63 - x.leading_zeros();
    2 * n + 1 - k
}

/// Maps a signed value onto the unsigned range, interleaving positive and
/// negative values (`0, -1, 1, -2, ...` become `0, 1, 2, 3, ...`).
#[inline]
pub fn zigzag_encode(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode`].
#[inline]
pub fn zigzag_decode(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}
