use std::marker::PhantomData;

use posocc_common::{Result, error::Error, verify_arg};

use crate::{BitOrder, WORD_BITS};

/// Forward-only bit reader over a bounded window of a borrowed word slice.
///
/// The reader tracks the current and the end bit offset. Every read is checked
/// against the end offset before any bit is interpreted: a read that would cross it
/// fails with a `BoundsExceeded` error and leaves no partially decoded value behind.
/// These errors are fatal for the stream; the cursor position after a failed read
/// is unspecified.
#[derive(Debug, Clone)]
pub struct BitReader<'a, E: BitOrder> {
    words: &'a [u64],
    pos: u64,
    end: u64,
    _order: PhantomData<E>,
}

impl<'a, E: BitOrder> BitReader<'a, E> {
    /// Creates a reader for the `bit_len` bits starting at absolute bit offset
    /// `bit_offset` of `words`.
    pub fn new(words: &'a [u64], bit_offset: u64, bit_len: u64) -> Result<Self> {
        let end = bit_offset
            .checked_add(bit_len)
            .ok_or_else(|| Error::invalid_arg("bit_len", "bit window overflows"))?;
        verify_arg!(bit_len, end <= words.len() as u64 * WORD_BITS as u64);
        Ok(BitReader {
            words,
            pos: bit_offset,
            end,
            _order: PhantomData,
        })
    }

    /// Absolute bit offset of the cursor.
    #[inline]
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Absolute bit offset one past the last readable bit.
    #[inline]
    pub fn end(&self) -> u64 {
        self.end
    }

    #[inline]
    pub fn remaining(&self) -> u64 {
        self.end - self.pos
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.end
    }

    /// The underlying word slice.
    pub fn words(&self) -> &'a [u64] {
        self.words
    }

    #[inline]
    fn ensure(&self, count: u64) -> Result<()> {
        if count > self.end - self.pos {
            Err(Error::bounds_exceeded(self.pos, count, self.end))
        } else {
            Ok(())
        }
    }

    /// Returns the next `len` bits (`0..=64`) without moving the cursor.
    #[inline]
    pub fn peek_bits(&self, len: u32) -> Result<u64> {
        debug_assert!(len <= WORD_BITS);
        if len == 0 {
            return Ok(0);
        }
        self.ensure(len as u64)?;
        Ok(E::get_bits(self.words, self.pos, len))
    }

    /// Reads the next `len` bits (`0..=64`).
    #[inline]
    pub fn read_bits(&mut self, len: u32) -> Result<u64> {
        let value = self.peek_bits(len)?;
        self.pos += len as u64;
        Ok(value)
    }

    /// Moves the cursor `count` bits forward.
    #[inline]
    pub fn skip_bits(&mut self, count: u64) -> Result<()> {
        self.ensure(count)?;
        self.pos += count;
        Ok(())
    }

    /// Skips zero padding up to the next multiple of `alignment` bits of the
    /// absolute bit offset. Mirrors [`crate::BitWriter::align`].
    pub fn align(&mut self, alignment: u32) -> Result<u32> {
        verify_arg!(
            alignment,
            alignment.is_power_of_two() && alignment <= WORD_BITS
        );
        let alignment = alignment as u64;
        let pad = (alignment - self.pos % alignment) % alignment;
        self.skip_bits(pad)?;
        Ok(pad as u32)
    }

    /// Consumes the zero prefix of an Exponential-Golomb code together with its
    /// terminating one bit, and returns the number of zeros.
    #[inline]
    fn read_prefix(&mut self) -> Result<u32> {
        let mut zeros = 0u32;
        loop {
            let avail = self.remaining().min(WORD_BITS as u64) as u32;
            if avail == 0 {
                return Err(Error::bounds_exceeded(self.pos, 1, self.end));
            }
            let window = E::get_bits(self.words, self.pos, avail);
            let run = E::leading_zero_bits(window, avail);
            if run < avail {
                self.pos += run as u64 + 1;
                return Ok(zeros + run);
            }
            zeros += avail;
            self.pos += avail as u64;
            if zeros >= WORD_BITS {
                return Err(Error::invalid_format("exp-golomb", "zero prefix exceeds 63 bits"));
            }
        }
    }

    /// Consumes the prefix of an order `k` code and returns the number of bits
    /// that follow it.
    #[inline]
    fn read_suffix_len(&mut self, k: u32) -> Result<u32> {
        debug_assert!(k < WORD_BITS);
        let n = self.read_prefix()? + k;
        if n >= WORD_BITS {
            return Err(Error::invalid_format("exp-golomb", "code exceeds 64 bits"));
        }
        Ok(n)
    }

    /// Reads an Exponential-Golomb code of order `k` written by
    /// [`crate::BitWriter::write_exp_golomb`].
    #[inline]
    pub fn read_exp_golomb(&mut self, k: u32) -> Result<u64> {
        let n = self.read_suffix_len(k)?;
        let low = self.read_bits(n)?;
        Ok(((1u64 << n) | low) - (1u64 << k))
    }

    /// Reads an Exponential-Golomb code of order `k` and narrows it to `u32`.
    #[inline]
    pub fn read_exp_golomb_u32(&mut self, k: u32) -> Result<u32> {
        let value = self.read_exp_golomb(k)?;
        u32::try_from(value).map_err(|_| Error::invalid_format("exp-golomb", "value exceeds u32"))
    }

    /// Moves past an Exponential-Golomb code of order `k` without assembling its
    /// value.
    #[inline]
    pub fn skip_exp_golomb(&mut self, k: u32) -> Result<()> {
        let n = self.read_suffix_len(k)?;
        self.skip_bits(n as u64)
    }
}
