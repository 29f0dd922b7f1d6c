//! Feature encoder.

use std::marker::PhantomData;

use itertools::Itertools;
use posocc_bits::{
    BitOrder, BitReader, BitWriter, WORD_BITS, bytes_to_words, words_to_bytes, zigzag_encode,
};
use posocc_common::{Result, error::Error, verify_arg};

use crate::{
    code_params::{CodeParams, CodeProfile},
    features::DocumentFeatures,
    fields_params::{FieldParams, FieldsParams},
    header::{FeatureHeader, read_code_header, write_code_header},
    param_bag::{COOKED, NUM_FIELDS, PROFILE, ParamBag, apply_params, export_params},
    raw_features::RawFeatures,
    state::ContextState,
};

/// Output of an [`EncodeContext`]: the bit stream words and the number of valid
/// bits. Bits past `bit_len` are zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFeatures<E: BitOrder> {
    pub words: Vec<u64>,
    pub bit_len: u64,
    _order: PhantomData<E>,
}

impl<E: BitOrder> EncodedFeatures<E> {
    pub fn new(words: Vec<u64>, bit_len: u64) -> Result<EncodedFeatures<E>> {
        verify_arg!(bit_len, bit_len <= words.len() as u64 * WORD_BITS as u64);
        Ok(EncodedFeatures {
            words,
            bit_len,
            _order: PhantomData,
        })
    }

    /// Serializes the words in the stream's byte order. The first bit of the
    /// stream is in the first byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        words_to_bytes::<E>(&self.words)
    }

    /// Restores a stream serialized with [`EncodedFeatures::to_bytes`].
    pub fn from_bytes(bytes: &[u8], bit_len: u64) -> Result<EncodedFeatures<E>> {
        Self::new(bytes_to_words::<E>(bytes)?, bit_len)
    }
}

/// Encodes the occurrence features of one field, document by document, into an
/// append-only bit stream.
///
/// The context borrows the field set for its whole lifetime. Code parameters
/// start as the field defaults of the chosen profile and may be tuned through
/// [`EncodeContext::set_params`] until the header is written or adopted with
/// [`EncodeContext::read_header`]. The header must be in place before any
/// features.
pub struct EncodeContext<'a, E: BitOrder> {
    fields: &'a FieldsParams,
    field_id: usize,
    field: &'a FieldParams,
    profile: CodeProfile,
    params: CodeParams,
    state: ContextState,
    writer: BitWriter<E>,
}

impl<'a, E: BitOrder> EncodeContext<'a, E> {
    pub fn new(
        fields: &'a FieldsParams,
        field_id: usize,
        profile: CodeProfile,
    ) -> Result<EncodeContext<'a, E>> {
        let field = fields
            .field(field_id)
            .ok_or_else(|| Error::invalid_arg("field_id", format!("no field {field_id}")))?;
        Ok(EncodeContext {
            fields,
            field_id,
            field,
            profile,
            params: field.default_code_params(profile),
            state: ContextState::Constructed,
            writer: BitWriter::new(),
        })
    }

    pub fn profile(&self) -> CodeProfile {
        self.profile
    }

    pub fn field(&self) -> &'a FieldParams {
        self.field
    }

    pub fn params(&self) -> &CodeParams {
        &self.params
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    /// Number of bits written so far; the offset the next document starts at.
    #[inline]
    pub fn bit_position(&self) -> u64 {
        self.writer.bit_len()
    }

    /// Stores the stream description under `prefix` in `header`.
    pub fn write_header(&mut self, header: &mut FeatureHeader, prefix: &str) -> Result<()> {
        self.state.check_header_op("write_header")?;
        write_code_header(
            header,
            prefix,
            self.fields,
            self.field_id,
            self.profile,
            &self.params,
        );
        self.state = ContextState::HeaderReady;
        Ok(())
    }

    /// Adopts the code parameters of an existing stream header.
    pub fn read_header(&mut self, header: &FeatureHeader, prefix: &str) -> Result<()> {
        self.state.check_header_op("read_header")?;
        self.params = read_code_header(header, prefix, self.fields, self.field_id, self.profile)?;
        self.state = ContextState::HeaderReady;
        Ok(())
    }

    pub fn set_params(&mut self, bag: &ParamBag) -> Result<()> {
        self.state.check_set_params()?;
        self.params = apply_params(&self.params, bag)?;
        Ok(())
    }

    pub fn get_params(&self, bag: &mut ParamBag) {
        export_params(&self.params, bag);
        bag.set(NUM_FIELDS, self.fields.num_fields() as i64);
        bag.set(PROFILE, self.profile.as_str());
        bag.set(COOKED, false);
    }

    /// Appends the features of one document.
    ///
    /// The document is validated against the field first; an invalid document
    /// fails with `InvalidArgument` and leaves the stream untouched.
    pub fn write_features(&mut self, features: &DocumentFeatures) -> Result<()> {
        self.state.check_feature_op("write_features")?;
        features.validate(self.field)?;
        self.encode(features);
        self.state = ContextState::Streaming;
        Ok(())
    }

    fn encode(&mut self, features: &DocumentFeatures) {
        let collection = self.field.collection;
        let params = &self.params;
        let writer = &mut self.writer;

        if collection.has_elements() {
            writer.write_exp_golomb(features.elements.len() as u64 - 1, params.num_elements_k);
        }
        let mut min_element_id = 0u32;
        for element in &features.elements {
            if collection.has_elements() {
                writer.write_exp_golomb(
                    (element.element_id - min_element_id) as u64,
                    params.element_id_k,
                );
                min_element_id = element.element_id.saturating_add(1);
            }
            if collection.has_element_weights() {
                writer.write_exp_golomb(
                    zigzag_encode(element.weight) as u64,
                    params.element_weight_k,
                );
            }
            writer.write_exp_golomb(element.length as u64 - 1, params.element_len_k);

            if !self.field.has_positions {
                continue;
            }
            let num_positions = element.positions.len() as u32;
            let (first_k, delta_k) =
                params.word_pos_ks(self.profile, num_positions, element.length);
            writer.write_exp_golomb(num_positions as u64 - 1, params.num_positions_k);
            writer.write_exp_golomb(element.positions[0] as u64, first_k);
            for (prev, pos) in element.positions.iter().tuple_windows() {
                writer.write_exp_golomb((pos - prev - 1) as u64, delta_k);
            }
        }
    }

    /// Appends a document copied verbatim from a stream with the same parameters.
    pub fn write_raw_features(&mut self, raw: &RawFeatures<E>) -> Result<()> {
        self.state.check_feature_op("write_raw_features")?;
        let mut reader = BitReader::<E>::new(&raw.words, 0, raw.bit_len)?;
        self.writer.copy_bits(&mut reader, raw.bit_len)?;
        self.state = ContextState::Streaming;
        Ok(())
    }

    /// Pads the stream with zero bits to the next multiple of `alignment` bits
    /// (a power of two up to 64) and returns the padding length. Decoders resume
    /// at such checkpoints with `DecodeContext::open_at`.
    pub fn align(&mut self, alignment: u32) -> Result<u32> {
        verify_arg!(
            alignment,
            alignment.is_power_of_two() && alignment <= WORD_BITS
        );
        Ok(self.writer.align(alignment))
    }

    pub fn finish(self) -> EncodedFeatures<E> {
        let (words, bit_len) = self.writer.finish();
        EncodedFeatures {
            words,
            bit_len,
            _order: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use posocc_bits::{BigEndian, LittleEndian};

    use super::*;
    use crate::{features::ElementFeature, fields_params::CollectionType};

    #[test]
    fn test_single_field_bit_layout() {
        let fields = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
        let mut encoder = EncodeContext::<BigEndian>::new(&fields, 0, CodeProfile::DualK).unwrap();
        let mut bag = ParamBag::new();
        bag.set("elementLenK", 0u32);
        bag.set("firstWordPosK", 0u32);
        bag.set("deltaWordPosK", 0u32);
        encoder.set_params(&bag).unwrap();
        encoder.write_header(&mut FeatureHeader::new(), "").unwrap();

        // length 2 -> "010", one position -> "1", first 0 -> "1", no deltas
        encoder
            .write_features(&DocumentFeatures::single(2, [0]))
            .unwrap();
        let encoded = encoder.finish();
        assert_eq!(encoded.bit_len, 5);
        assert_eq!(encoded.to_bytes()[0], 0b0101_1000);
    }

    #[test]
    fn test_features_require_header() {
        let fields = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
        let mut encoder =
            EncodeContext::<LittleEndian>::new(&fields, 0, CodeProfile::DualK).unwrap();
        let err = encoder
            .write_features(&DocumentFeatures::single(4, [1]))
            .unwrap_err();
        assert!(err.to_string().contains("before header"));
        assert!(EncodeContext::<LittleEndian>::new(&fields, 1, CodeProfile::DualK).is_err());
    }

    #[test]
    fn test_params_frozen_by_header() {
        let fields = FieldsParams::single(FieldParams::new("tags", CollectionType::Array));
        let mut encoder =
            EncodeContext::<LittleEndian>::new(&fields, 0, CodeProfile::SingleK).unwrap();
        let mut bag = ParamBag::new();
        bag.set("elementIdK", 2u32);
        encoder.set_params(&bag).unwrap();
        let mut header = FeatureHeader::new();
        encoder.write_header(&mut header, "").unwrap();
        assert_eq!(header.get_integer("field[0].elementIdK").unwrap(), 2);

        // The header already describes the stream; retuning would desync it.
        bag.set("elementIdK", 5u32);
        let err = encoder.set_params(&bag).unwrap_err();
        assert!(err.to_string().contains("set_params after header"));
        assert_eq!(encoder.params().element_id_k, 2);

        encoder
            .write_features(&DocumentFeatures::new(vec![
                ElementFeature::new(1, 1, 3).with_positions([2]),
            ]))
            .unwrap();
        assert_eq!(encoder.state(), ContextState::Streaming);
        assert!(encoder.set_params(&bag).is_err());
        assert!(encoder.write_header(&mut FeatureHeader::new(), "").is_err());

        let mut adopted =
            EncodeContext::<LittleEndian>::new(&fields, 0, CodeProfile::SingleK).unwrap();
        adopted.read_header(&header, "").unwrap();
        assert_eq!(adopted.params().element_id_k, 2);
        assert!(adopted.set_params(&bag).is_err());
    }

    #[test]
    fn test_invalid_document_leaves_stream_untouched() {
        let fields = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
        let mut encoder = EncodeContext::<BigEndian>::new(&fields, 0, CodeProfile::DualK).unwrap();
        encoder.write_header(&mut FeatureHeader::new(), "").unwrap();
        assert!(encoder
            .write_features(&DocumentFeatures::single(4, [4]))
            .is_err());
        assert_eq!(encoder.bit_position(), 0);
        assert!(encoder.align(3).is_err());
    }

    #[test]
    fn test_get_params() {
        let fields = FieldsParams::single(
            FieldParams::new("body", CollectionType::Single).with_avg_elem_len(1000),
        );
        let encoder = EncodeContext::<BigEndian>::new(&fields, 0, CodeProfile::SingleK).unwrap();
        let mut bag = ParamBag::new();
        encoder.get_params(&mut bag);
        assert_eq!(bag.get_int("elementLenK"), Some(9));
        assert_eq!(bag.get_int("numFields"), Some(1));
        assert_eq!(bag.get_str("profile"), Some("singleK"));
        assert_eq!(bag.get_bool("cooked"), Some(false));
    }

    #[test]
    fn test_bytes_round_trip() {
        let encoded = EncodedFeatures::<LittleEndian>::new(vec![0x0102, 0x0304], 80).unwrap();
        let bytes = encoded.to_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(EncodedFeatures::<LittleEndian>::from_bytes(&bytes, 80).unwrap(), encoded);
        assert!(EncodedFeatures::<LittleEndian>::new(vec![0], 65).is_err());
    }
}
