//! Byte-order policy of the bit stream.
//!
//! A bit stream is stored as a sequence of `u64` words. The policy decides two
//! things which always go together: the end of a word that receives the first bit,
//! and the byte order used when words are serialized. Big-endian streams fill words
//! from the most significant bit and store words as big-endian bytes; little-endian
//! streams fill from the least significant bit and store little-endian bytes. In
//! both cases the first bit of the stream is located in the first serialized byte.
//!
//! Values are always read back exactly as written: `get_bits` returns the value
//! previously passed to `put_bits` for the same position and length.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use posocc_common::{Result, verify_arg};

/// Byte-order policy value used to parametrize the writer, the reader and every
/// feature context built on top of them.
pub trait BitOrder: ByteOrder + Send + Sync + 'static {
    /// Human readable policy name, used in diagnostics.
    const NAME: &'static str;

    /// ORs the low `len` bits of `value` into `words` at bit offset `pos`.
    ///
    /// `len` must be in `1..=64`. The words touched by the write must be present
    /// in the slice and the affected bits must be zero.
    fn put_bits(words: &mut [u64], pos: u64, value: u64, len: u32);

    /// Extracts `len` bits (`1..=64`) starting at bit offset `pos`.
    fn get_bits(words: &[u64], pos: u64, len: u32) -> u64;

    /// Counts the zero bits preceding the first one bit of a `len`-bit value
    /// obtained from [`BitOrder::get_bits`], in stream order. Returns `len` for zero.
    fn leading_zero_bits(value: u64, len: u32) -> u32;
}

#[inline]
pub(crate) fn low_mask(len: u32) -> u64 {
    if len >= 64 {
        u64::MAX
    } else {
        (1u64 << len) - 1
    }
}

#[inline]
fn split_pos(pos: u64) -> (usize, u32) {
    ((pos / 64) as usize, (pos % 64) as u32)
}

impl BitOrder for BigEndian {
    const NAME: &'static str = "big-endian";

    #[inline]
    fn put_bits(words: &mut [u64], pos: u64, value: u64, len: u32) {
        debug_assert!((1..=64).contains(&len));
        let value = value & low_mask(len);
        let (idx, off) = split_pos(pos);
        if off + len <= 64 {
            words[idx] |= value << (64 - off - len);
        } else {
            let spill = off + len - 64;
            words[idx] |= value >> spill;
            words[idx + 1] |= value << (64 - spill);
        }
    }

    #[inline]
    fn get_bits(words: &[u64], pos: u64, len: u32) -> u64 {
        debug_assert!((1..=64).contains(&len));
        let (idx, off) = split_pos(pos);
        if off + len <= 64 {
            (words[idx] << off) >> (64 - len)
        } else {
            let spill = off + len - 64;
            let high = (words[idx] << off) >> off;
            (high << spill) | (words[idx + 1] >> (64 - spill))
        }
    }

    #[inline]
    fn leading_zero_bits(value: u64, len: u32) -> u32 {
        if value == 0 {
            len
        } else {
            value.leading_zeros() - (64 - len)
        }
    }
}

impl BitOrder for LittleEndian {
    const NAME: &'static str = "little-endian";

    #[inline]
    fn put_bits(words: &mut [u64], pos: u64, value: u64, len: u32) {
        debug_assert!((1..=64).contains(&len));
        let value = value & low_mask(len);
        let (idx, off) = split_pos(pos);
        words[idx] |= value << off;
        if off + len > 64 {
            words[idx + 1] |= value >> (64 - off);
        }
    }

    #[inline]
    fn get_bits(words: &[u64], pos: u64, len: u32) -> u64 {
        debug_assert!((1..=64).contains(&len));
        let (idx, off) = split_pos(pos);
        if off + len <= 64 {
            (words[idx] >> off) & low_mask(len)
        } else {
            let low = words[idx] >> off;
            let high = words[idx + 1] & low_mask(off + len - 64);
            low | (high << (64 - off))
        }
    }

    #[inline]
    fn leading_zero_bits(value: u64, len: u32) -> u32 {
        if value == 0 {
            len
        } else {
            value.trailing_zeros()
        }
    }
}

/// Serializes stream words into bytes using the byte order of the policy.
pub fn words_to_bytes<E: BitOrder>(words: &[u64]) -> Vec<u8> {
    let mut bytes = vec![0u8; words.len() * 8];
    E::write_u64_into(words, &mut bytes);
    bytes
}

/// Restores stream words from bytes produced by [`words_to_bytes`].
///
/// The byte count must be a multiple of the word size.
pub fn bytes_to_words<E: BitOrder>(bytes: &[u8]) -> Result<Vec<u64>> {
    verify_arg!(bytes, bytes.len() % 8 == 0);
    let mut words = vec![0u64; bytes.len() / 8];
    E::read_u64_into(bytes, &mut words);
    Ok(words)
}
