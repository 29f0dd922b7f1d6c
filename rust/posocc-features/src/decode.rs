//! Feature decoder.

use posocc_bits::{BitOrder, BitReader, zigzag_decode};
use posocc_common::{Result, error::Error, verify_data};

use crate::{
    code_params::{CodeParams, CodeProfile},
    encode::EncodedFeatures,
    features::{DocumentFeatures, ElementFeature},
    fields_params::{FieldParams, FieldsParams},
    header::{FeatureHeader, read_code_header},
    match_data::{TermFieldMatchData, TermFieldMatchPosition},
    param_bag::{COOKED, NUM_FIELDS, PROFILE, ParamBag, apply_params, export_params},
    state::ContextState,
};

/// Receives the values of one document as the decoder parses them.
trait DocumentSink {
    /// Whether position values are needed; otherwise their codewords are only
    /// skipped.
    const WANTS_POSITIONS: bool;

    fn element(&mut self, element_id: u32, weight: i32, length: u32, num_positions: u32);

    fn position(&mut self, position: u32);
}

/// Fills a [`DocumentFeatures`] in place, reusing its element and position
/// buffers.
struct FeaturesSink<'b> {
    features: &'b mut DocumentFeatures,
    count: usize,
}

impl DocumentSink for FeaturesSink<'_> {
    const WANTS_POSITIONS: bool = true;

    fn element(&mut self, element_id: u32, weight: i32, length: u32, num_positions: u32) {
        let elements = &mut self.features.elements;
        if self.count < elements.len() {
            let element = &mut elements[self.count];
            element.element_id = element_id;
            element.weight = weight;
            element.length = length;
            element.positions.clear();
        } else {
            elements.push(ElementFeature::new(element_id, weight, length));
        }
        elements[self.count].positions.reserve(num_positions as usize);
        self.count += 1;
    }

    fn position(&mut self, position: u32) {
        self.features.elements[self.count - 1].positions.push(position);
    }
}

struct SkipSink;

impl DocumentSink for SkipSink {
    const WANTS_POSITIONS: bool = false;

    fn element(&mut self, _: u32, _: i32, _: u32, _: u32) {}

    fn position(&mut self, _: u32) {}
}

/// Collects occurrence count and field length only.
struct InterleavedSink<'b> {
    match_data: &'b mut TermFieldMatchData,
    has_positions: bool,
}

impl DocumentSink for InterleavedSink<'_> {
    const WANTS_POSITIONS: bool = false;

    fn element(&mut self, _: u32, _: i32, length: u32, num_positions: u32) {
        let occs = if self.has_positions { num_positions } else { 1 };
        self.match_data.add_interleaved(occs, length);
    }

    fn position(&mut self, _: u32) {}
}

/// Appends one match position per occurrence, and the interleaved counters when
/// those are wanted too.
struct MatchDataSink<'b> {
    match_data: &'b mut TermFieldMatchData,
    has_positions: bool,
    interleaved: bool,
    current: TermFieldMatchPosition,
}

impl DocumentSink for MatchDataSink<'_> {
    const WANTS_POSITIONS: bool = true;

    fn element(&mut self, element_id: u32, weight: i32, length: u32, num_positions: u32) {
        self.current = TermFieldMatchPosition {
            element_id,
            position: 0,
            element_weight: weight,
            element_len: length,
        };
        if self.interleaved {
            let occs = if self.has_positions { num_positions } else { 1 };
            self.match_data.add_interleaved(occs, length);
        }
        if !self.has_positions {
            self.match_data.append_position(self.current);
        }
    }

    fn position(&mut self, position: u32) {
        self.match_data.append_position(TermFieldMatchPosition {
            position,
            ..self.current
        });
    }
}

/// Decodes the occurrence features of one field from a bounded window of a bit
/// stream.
///
/// The decoder must be given the header (see [`DecodeContext::read_header`])
/// before any features are read, so that it uses the code parameters the stream
/// was written with. Every read is bounds checked; a read past the declared
/// stream length fails with `BoundsExceeded` and the decoder should be dropped.
///
/// Decoders are cheap: each thread decoding a shared buffer owns its own.
pub struct DecodeContext<'a, E: BitOrder> {
    fields: &'a FieldsParams,
    field_id: usize,
    pub(crate) field: &'a FieldParams,
    pub(crate) profile: CodeProfile,
    pub(crate) params: CodeParams,
    state: ContextState,
    pub(crate) reader: BitReader<'a, E>,
    pub(crate) cooked: bool,
}

impl<'a, E: BitOrder> DecodeContext<'a, E> {
    /// Creates a decoder for the `bit_len` bits starting at bit `bit_offset` of
    /// `words`.
    pub fn new(
        fields: &'a FieldsParams,
        field_id: usize,
        profile: CodeProfile,
        words: &'a [u64],
        bit_offset: u64,
        bit_len: u64,
    ) -> Result<DecodeContext<'a, E>> {
        let field = fields
            .field(field_id)
            .ok_or_else(|| Error::invalid_arg("field_id", format!("no field {field_id}")))?;
        Ok(DecodeContext {
            fields,
            field_id,
            field,
            profile,
            params: field.default_code_params(profile),
            state: ContextState::Constructed,
            reader: BitReader::new(words, bit_offset, bit_len)?,
            cooked: false,
        })
    }

    /// Creates a decoder over the whole output of an encoder.
    pub fn from_encoded(
        fields: &'a FieldsParams,
        field_id: usize,
        profile: CodeProfile,
        encoded: &'a EncodedFeatures<E>,
    ) -> Result<DecodeContext<'a, E>> {
        Self::new(fields, field_id, profile, &encoded.words, 0, encoded.bit_len)
    }

    /// Creates a decoder with the same field, profile and code parameters,
    /// positioned at an aligned checkpoint of the same stream.
    pub fn open_at(&self, bit_offset: u64, bit_len: u64) -> Result<DecodeContext<'a, E>> {
        let state = match self.state {
            ContextState::Constructed => ContextState::Constructed,
            _ => ContextState::HeaderReady,
        };
        log::trace!("reopening feature stream at bit {bit_offset}");
        Ok(DecodeContext {
            fields: self.fields,
            field_id: self.field_id,
            field: self.field,
            profile: self.profile,
            params: self.params,
            state,
            reader: BitReader::new(self.reader.words(), bit_offset, bit_len)?,
            cooked: self.cooked,
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
        match self.state {
            ContextState::Constructed => ContextState::Constructed,
            _ if self.reader.is_at_end() => ContextState::Done,
            state => state,
        }
    }

    /// Absolute bit offset of the next document.
    #[inline]
    pub fn bit_position(&self) -> u64 {
        self.reader.position()
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.reader.is_at_end()
    }

    /// The stream words the decoder reads from.
    pub fn words(&self) -> &'a [u64] {
        self.reader.words()
    }

    /// Validates the stream description under `prefix` against the field set and
    /// adopts the code parameters stored there.
    pub fn read_header(&mut self, header: &FeatureHeader, prefix: &str) -> Result<()> {
        self.state.check_header_op("read_header")?;
        self.params = read_code_header(header, prefix, self.fields, self.field_id, self.profile)?;
        self.state = ContextState::HeaderReady;
        Ok(())
    }

    /// Tunes the parameters of a decoder that has not read its header yet.
    /// [`DecodeContext::read_header`] replaces them with the stored ones, and
    /// they cannot change afterwards.
    pub fn set_params(&mut self, bag: &ParamBag) -> Result<()> {
        self.state.check_set_params()?;
        self.params = apply_params(&self.params, bag)?;
        Ok(())
    }

    pub fn get_params(&self, bag: &mut ParamBag) {
        export_params(&self.params, bag);
        bag.set(NUM_FIELDS, self.fields.num_fields() as i64);
        bag.set(PROFILE, self.profile.as_str());
        bag.set(COOKED, self.cooked);
    }

    /// Skips zero padding up to the next multiple of `alignment` bits, mirroring
    /// `EncodeContext::align`.
    pub fn align(&mut self, alignment: u32) -> Result<u32> {
        self.reader.align(alignment)
    }

    pub fn read_features(&mut self) -> Result<DocumentFeatures> {
        let mut features = DocumentFeatures::default();
        self.read_features_into(&mut features)?;
        Ok(features)
    }

    /// Decodes the next document into `features`, reusing its buffers.
    pub fn read_features_into(&mut self, features: &mut DocumentFeatures) -> Result<()> {
        self.state.check_feature_op("read_features")?;
        if self.cooked {
            self.read_single_element_into(features)?;
        } else {
            let mut sink = FeaturesSink {
                features,
                count: 0,
            };
            self.parse_document(&mut sink)?;
            let count = sink.count;
            features.elements.truncate(count);
        }
        self.state = ContextState::Streaming;
        Ok(())
    }

    /// Moves past `count` documents without materializing them. The cursor ends
    /// where `count` calls of [`DecodeContext::read_features`] would leave it.
    pub fn skip_features(&mut self, count: usize) -> Result<()> {
        self.state.check_feature_op("skip_features")?;
        for _ in 0..count {
            self.parse_document(&mut SkipSink)?;
        }
        self.state = ContextState::Streaming;
        Ok(())
    }

    /// Decodes the next document straight into the first match data entry, which
    /// is reset to `doc_id` first.
    ///
    /// Positions are appended when the entry needs normal features; the
    /// occurrence count and field length are filled when it needs interleaved
    /// features or does not need normal ones. An empty slice skips the document.
    pub fn unpack_features(
        &mut self,
        match_data: &mut [TermFieldMatchData],
        doc_id: u32,
    ) -> Result<()> {
        let Some(md) = match_data.first_mut() else {
            return self.skip_features(1);
        };
        self.state.check_feature_op("unpack_features")?;
        md.reset(doc_id);
        let has_positions = self.field.has_positions;
        if md.needs_normal_features() {
            let interleaved = md.needs_interleaved_features();
            self.parse_document(&mut MatchDataSink {
                match_data: md,
                has_positions,
                interleaved,
                current: TermFieldMatchPosition::default(),
            })?;
        } else {
            self.parse_document(&mut InterleavedSink {
                match_data: md,
                has_positions,
            })?;
        }
        self.state = ContextState::Streaming;
        Ok(())
    }

    /// Reads a count stored as `count - 1`.
    #[inline]
    pub(crate) fn read_count(&mut self, k: u32) -> Result<u32> {
        let value = self.reader.read_exp_golomb_u32(k)?;
        value
            .checked_add(1)
            .ok_or_else(|| Error::invalid_format("count", "count exceeds u32"))
    }

    /// Fails with `BoundsExceeded` when `count` items of at least one bit each
    /// cannot fit in the rest of the window.
    #[inline]
    pub(crate) fn check_count_fits(&self, count: u32) -> Result<()> {
        if count as u64 > self.reader.remaining() {
            return Err(Error::bounds_exceeded(
                self.reader.position(),
                count as u64,
                self.reader.end(),
            ));
        }
        Ok(())
    }

    /// Parses one document, handing every value to `sink`.
    fn parse_document<S: DocumentSink>(&mut self, sink: &mut S) -> Result<()> {
        let collection = self.field.collection;
        let params = self.params;

        let num_elements = if collection.has_elements() {
            let count = self.read_count(params.num_elements_k)?;
            self.check_count_fits(count)?;
            count
        } else {
            1
        };

        // Ids are stored as the gap to the previous id plus one.
        let mut min_element_id = 0u64;
        for _ in 0..num_elements {
            let element_id = if collection.has_elements() {
                let delta = self.reader.read_exp_golomb_u32(params.element_id_k)?;
                let id = u32::try_from(min_element_id + delta as u64)
                    .map_err(|_| Error::invalid_format("element_id", "element id exceeds u32"))?;
                min_element_id = id as u64 + 1;
                id
            } else {
                0
            };
            let weight = if collection.has_element_weights() {
                zigzag_decode(self.reader.read_exp_golomb_u32(params.element_weight_k)?)
            } else {
                1
            };
            let length = self.read_count(params.element_len_k)?;

            if !self.field.has_positions {
                sink.element(element_id, weight, length, 0);
                continue;
            }
            let num_positions = self.read_count(params.num_positions_k)?;
            verify_data!(num_positions, num_positions <= length);
            self.check_count_fits(num_positions)?;
            sink.element(element_id, weight, length, num_positions);

            let (first_k, delta_k) = params.word_pos_ks(self.profile, num_positions, length);
            if !S::WANTS_POSITIONS {
                self.reader.skip_exp_golomb(first_k)?;
                for _ in 1..num_positions {
                    self.reader.skip_exp_golomb(delta_k)?;
                }
                continue;
            }
            let mut position = self.reader.read_exp_golomb_u32(first_k)?;
            verify_data!(position, position < length);
            sink.position(position);
            for _ in 1..num_positions {
                let delta = self.reader.read_exp_golomb_u32(delta_k)?;
                position = position
                    .checked_add(delta)
                    .and_then(|p| p.checked_add(1))
                    .ok_or_else(|| Error::invalid_format("position", "word position exceeds u32"))?;
                verify_data!(position, position < length);
                sink.position(position);
            }
        }
        Ok(())
    }
}
