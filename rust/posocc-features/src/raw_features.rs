//! Verbatim extraction of encoded documents, used when streams are merged
//! without re-encoding.

use std::marker::PhantomData;

use posocc_bits::{BitOrder, BitReader, BitWriter};
use posocc_common::{Result, error::Error};

use crate::{decode::DecodeContext, features::DocumentFeatures};

/// The encoded bits of one document, copied out of a stream. Can be appended to
/// another stream of the same byte order and code parameters with
/// `EncodeContext::write_raw_features`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFeatures<E: BitOrder> {
    pub words: Vec<u64>,
    pub bit_len: u64,
    _order: PhantomData<E>,
}

/// Records where a document starts in a decoder's stream and extracts its bits
/// once the decoder has moved past it.
#[derive(Debug, Clone, Copy)]
pub struct RawFeaturesCollector {
    start: u64,
}

impl RawFeaturesCollector {
    /// Starts collecting at the decoder's current position.
    pub fn start<E: BitOrder>(decoder: &DecodeContext<'_, E>) -> RawFeaturesCollector {
        RawFeaturesCollector {
            start: decoder.bit_position(),
        }
    }

    pub fn start_offset(&self) -> u64 {
        self.start
    }

    /// Advances `decoder` past one document and returns its encoded bits.
    pub fn finish<E: BitOrder>(self, decoder: &mut DecodeContext<'_, E>) -> Result<RawFeatures<E>> {
        self.check_position(decoder)?;
        decoder.skip_features(1)?;
        self.copy(decoder)
    }

    /// Like [`RawFeaturesCollector::finish`], also returning the decoded document.
    pub fn collect_and_read<E: BitOrder>(
        self,
        decoder: &mut DecodeContext<'_, E>,
    ) -> Result<(RawFeatures<E>, DocumentFeatures)> {
        self.check_position(decoder)?;
        let features = decoder.read_features()?;
        Ok((self.copy(decoder)?, features))
    }

    fn check_position<E: BitOrder>(&self, decoder: &DecodeContext<'_, E>) -> Result<()> {
        if decoder.bit_position() != self.start {
            return Err(Error::invalid_operation(format!(
                "raw collection started at bit {}, decoder is at bit {}",
                self.start,
                decoder.bit_position()
            )));
        }
        Ok(())
    }

    fn copy<E: BitOrder>(&self, decoder: &DecodeContext<'_, E>) -> Result<RawFeatures<E>> {
        let bit_len = decoder.bit_position() - self.start;
        let mut reader = BitReader::<E>::new(decoder.words(), self.start, bit_len)?;
        let mut writer = BitWriter::<E>::with_capacity(bit_len as usize);
        writer.copy_bits(&mut reader, bit_len)?;
        let (words, bit_len) = writer.finish();
        Ok(RawFeatures {
            words,
            bit_len,
            _order: PhantomData,
        })
    }
}
