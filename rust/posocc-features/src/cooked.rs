//! Specialized decoder for single-field, single-value streams.

use posocc_bits::BitOrder;
use posocc_common::{Result, error::Error, verify_arg, verify_data};

use crate::{
    code_params::CodeProfile,
    decode::DecodeContext,
    features::{DocumentFeatures, ElementFeature},
    fields_params::FieldsParams,
};

/// A [`DecodeContext`] created with [`DecodeContext::cooked`]. Reads take a
/// straight-line path for the single element each document holds; results are
/// identical to those of the generic decoder.
pub type CookedDecodeContext<'a, E> = DecodeContext<'a, E>;

impl<'a, E: BitOrder> DecodeContext<'a, E> {
    /// Creates a decoder for a field set of exactly one single-value field.
    pub fn cooked(
        fields: &'a FieldsParams,
        profile: CodeProfile,
        words: &'a [u64],
        bit_offset: u64,
        bit_len: u64,
    ) -> Result<CookedDecodeContext<'a, E>> {
        verify_arg!(fields, fields.supports_cooked());
        let mut decoder = DecodeContext::new(fields, 0, profile, words, bit_offset, bit_len)?;
        decoder.cooked = true;
        Ok(decoder)
    }

    /// Whether reads go through the single-element fast path.
    pub fn is_cooked(&self) -> bool {
        self.cooked
    }

    pub(crate) fn read_single_element_into(
        &mut self,
        features: &mut DocumentFeatures,
    ) -> Result<()> {
        let params = self.params;
        let length = self.read_count(params.element_len_k)?;

        features.elements.truncate(1);
        if features.elements.is_empty() {
            features.elements.push(ElementFeature::default());
        }
        let element = &mut features.elements[0];
        element.element_id = 0;
        element.weight = 1;
        element.length = length;
        element.positions.clear();
        if !self.field.has_positions {
            return Ok(());
        }

        let num_positions = self.read_count(params.num_positions_k)?;
        verify_data!(num_positions, num_positions <= length);
        self.check_count_fits(num_positions)?;
        let (first_k, delta_k) = params.word_pos_ks(self.profile, num_positions, length);
        element.positions.reserve(num_positions as usize);

        let reader = &mut self.reader;
        let mut position = reader.read_exp_golomb_u32(first_k)?;
        verify_data!(position, position < length);
        element.positions.push(position);
        for _ in 1..num_positions {
            let delta = reader.read_exp_golomb_u32(delta_k)?;
            position = position
                .checked_add(delta)
                .and_then(|p| p.checked_add(1))
                .ok_or_else(|| Error::invalid_format("position", "word position exceeds u32"))?;
            verify_data!(position, position < length);
            element.positions.push(position);
        }
        Ok(())
    }
}
