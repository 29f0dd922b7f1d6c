use std::marker::PhantomData;

use posocc_common::Result;

use crate::{BitOrder, BitReader, WORD_BITS};

/// Append-only bit writer over a growable vector of 64-bit words.
///
/// Bits past the current length are kept zeroed, so padding and zero runs only
/// move the cursor. The cursor never moves backwards.
#[derive(Debug, Clone)]
pub struct BitWriter<E: BitOrder> {
    words: Vec<u64>,
    bit_len: u64,
    _order: PhantomData<E>,
}

impl<E: BitOrder> BitWriter<E> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a writer with room for at least `bits` bits before reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        BitWriter {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS as usize)),
            bit_len: 0,
            _order: PhantomData,
        }
    }

    /// Number of bits written so far.
    #[inline]
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }

    /// Words written so far. The last word may be partially filled.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    #[inline]
    fn reserve_bits(&mut self, count: u64) {
        let needed = (self.bit_len + count).div_ceil(WORD_BITS as u64) as usize;
        if self.words.len() < needed {
            self.words.resize(needed, 0);
        }
    }

    /// Appends the low `len` bits of `value` (`len` in `0..=64`).
    #[inline]
    pub fn write_bits(&mut self, value: u64, len: u32) {
        debug_assert!(len <= WORD_BITS);
        if len == 0 {
            return;
        }
        self.reserve_bits(len as u64);
        E::put_bits(&mut self.words, self.bit_len, value, len);
        self.bit_len += len as u64;
    }

    /// Appends `count` zero bits.
    #[inline]
    pub fn write_zeros(&mut self, count: u64) {
        self.reserve_bits(count);
        self.bit_len += count;
    }

    /// Appends `value` as an Exponential-Golomb code of order `k`.
    ///
    /// With `x = value + 2^k` and `n = floor(log2(x))`, the code is `n - k` zero
    /// bits, a one bit, and the low `n` bits of `x`. `value` must stay below
    /// `2^63 - 2^k`.
    #[inline]
    pub fn write_exp_golomb(&mut self, value: u64, k: u32) {
        debug_assert!(k < WORD_BITS);
        let x = value + (1u64 << k);
        let n = 63 - x.leading_zeros();
        self.write_zeros((n - k) as u64);
        self.write_bits(1, 1);
        self.write_bits(x, n);
    }

    /// Pads with zero bits up to the next multiple of `alignment` bits and returns
    /// the number of padding bits.
    ///
    /// `alignment` must be a power of two not greater than 64; 8 gives a byte
    /// checkpoint and 64 a word checkpoint.
    pub fn align(&mut self, alignment: u32) -> u32 {
        assert!(
            alignment.is_power_of_two() && alignment <= WORD_BITS,
            "alignment must be a power of two <= 64"
        );
        let alignment = alignment as u64;
        let pad = (alignment - self.bit_len % alignment) % alignment;
        self.write_zeros(pad);
        pad as u32
    }

    /// Copies the next `count` bits of `reader` verbatim.
    pub fn copy_bits(&mut self, reader: &mut BitReader<'_, E>, count: u64) -> Result<()> {
        let mut remaining = count;
        self.reserve_bits(count);
        while remaining > 0 {
            let chunk = remaining.min(WORD_BITS as u64) as u32;
            let value = reader.read_bits(chunk)?;
            self.write_bits(value, chunk);
            remaining -= chunk as u64;
        }
        Ok(())
    }

    /// Consumes the writer, returning the words and the number of valid bits.
    pub fn finish(self) -> (Vec<u64>, u64) {
        (self.words, self.bit_len)
    }
}

impl<E: BitOrder> Default for BitWriter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{BigEndian, LittleEndian};

    use super::*;
    use crate::{exp_golomb_len, words_to_bytes};

    #[test]
    fn test_exp_golomb_big_endian_layout() {
        // k = 0, value 3: x = 4 = 0b100 -> "00" "1" "00"
        let mut writer = BitWriter::<BigEndian>::new();
        writer.write_exp_golomb(3, 0);
        assert_eq!(writer.bit_len(), 5);
        let bytes = words_to_bytes::<BigEndian>(writer.words());
        assert_eq!(bytes[0], 0b0010_0000);

        // k = 2, value 1: x = 5 = 0b101 -> "1" "01"
        let mut writer = BitWriter::<BigEndian>::new();
        writer.write_exp_golomb(1, 2);
        assert_eq!(writer.bit_len(), 3);
        let bytes = words_to_bytes::<BigEndian>(writer.words());
        assert_eq!(bytes[0], 0b1010_0000);
    }

    #[test]
    fn test_exp_golomb_lengths_match() {
        let mut writer = BitWriter::<LittleEndian>::new();
        let mut expected = 0u64;
        for k in 0..12 {
            for value in [0u64, 1, 2, 7, 100, 4095, u32::MAX as u64] {
                writer.write_exp_golomb(value, k);
                expected += exp_golomb_len(value, k) as u64;
                assert_eq!(writer.bit_len(), expected);
            }
        }
    }

    #[test]
    fn test_align() {
        let mut writer = BitWriter::<BigEndian>::new();
        writer.write_bits(1, 3);
        assert_eq!(writer.align(8), 5);
        assert_eq!(writer.bit_len(), 8);
        assert_eq!(writer.align(8), 0);
        assert_eq!(writer.align(64), 56);
        assert_eq!(writer.bit_len(), 64);
        assert_eq!(writer.words().len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_align_rejects_odd_alignment() {
        let mut writer = BitWriter::<BigEndian>::new();
        writer.align(12);
    }

    #[test]
    fn test_zero_runs_cross_words() {
        let mut writer = BitWriter::<LittleEndian>::new();
        writer.write_zeros(130);
        writer.write_bits(0b11, 2);
        let (words, bit_len) = writer.finish();
        assert_eq!(bit_len, 132);
        assert_eq!(words, vec![0, 0, 0b1100]);
    }
}
