//! Exponential-Golomb code parameters (K values) and the rules deriving them from
//! index statistics.

use serde::{Deserialize, Serialize};

/// Default K for the first word position of an element (dual-K profile).
pub const K_VALUE_FIRST_WORD_POS: u32 = 8;
/// Default K for subsequent word position deltas (dual-K profile).
pub const K_VALUE_DELTA_WORD_POS: u32 = 4;
/// Default K for element lengths (dual-K profile).
pub const K_VALUE_ELEMENT_LEN: u32 = 9;
pub const K_VALUE_NUM_POSITIONS: u32 = 0;
pub const K_VALUE_NUM_ELEMENTS: u32 = 0;
pub const K_VALUE_ELEMENT_ID: u32 = 0;
pub const K_VALUE_ELEMENT_WEIGHT: u32 = 9;

/// Average element length assumed when no statistics are available.
pub const DEFAULT_AVG_ELEM_LEN: u32 = 512;

/// Largest K accepted from parameter bags and headers.
pub const MAX_K: u32 = 31;

/// Parameter derivation rules of a feature stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CodeProfile {
    /// Fixed K values; word positions use separate K values for the first position
    /// and for the deltas that follow.
    DualK,
    /// One word position K per element, derived from its length and position
    /// count; the element length K follows the field's average element length.
    SingleK,
}

impl CodeProfile {
    /// Format identifier stored in the header for streams written with this profile.
    pub fn identifier(&self) -> &'static str {
        match self {
            CodeProfile::DualK => "EG2PosOcc.3",
            CodeProfile::SingleK => "EGPosOcc.3",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeProfile::DualK => "dualK",
            CodeProfile::SingleK => "singleK",
        }
    }
}

/// Identifies one of the K values of [`CodeParams`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodeParamKey {
    FirstWordPos,
    DeltaWordPos,
    ElementLen,
    NumPositions,
    NumElements,
    ElementId,
    ElementWeight,
}

impl CodeParamKey {
    pub const ALL: [CodeParamKey; 7] = [
        CodeParamKey::FirstWordPos,
        CodeParamKey::DeltaWordPos,
        CodeParamKey::ElementLen,
        CodeParamKey::NumPositions,
        CodeParamKey::NumElements,
        CodeParamKey::ElementId,
        CodeParamKey::ElementWeight,
    ];

    /// Name used for the value in parameter bags and header tags.
    pub fn name(&self) -> &'static str {
        match self {
            CodeParamKey::FirstWordPos => "firstWordPosK",
            CodeParamKey::DeltaWordPos => "deltaWordPosK",
            CodeParamKey::ElementLen => "elementLenK",
            CodeParamKey::NumPositions => "numPositionsK",
            CodeParamKey::NumElements => "numElementsK",
            CodeParamKey::ElementId => "elementIdK",
            CodeParamKey::ElementWeight => "elementWeightK",
        }
    }
}

/// Code parameters of one field.
///
/// Encoder and decoder must agree on every value, which is why the full set is
/// written to and restored from the stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeParams {
    /// Average element length the K values were derived from.
    pub avg_elem_len: u32,
    pub first_word_pos_k: u32,
    pub delta_word_pos_k: u32,
    pub element_len_k: u32,
    pub num_positions_k: u32,
    pub num_elements_k: u32,
    pub element_id_k: u32,
    pub element_weight_k: u32,
}

impl CodeParams {
    /// Default parameters of `profile` for a field with the given average element
    /// length.
    pub fn for_profile(profile: CodeProfile, avg_elem_len: u32) -> CodeParams {
        let element_len_k = match profile {
            CodeProfile::DualK => K_VALUE_ELEMENT_LEN,
            CodeProfile::SingleK => element_len_k(avg_elem_len),
        };
        CodeParams {
            avg_elem_len,
            first_word_pos_k: K_VALUE_FIRST_WORD_POS,
            delta_word_pos_k: K_VALUE_DELTA_WORD_POS,
            element_len_k,
            num_positions_k: K_VALUE_NUM_POSITIONS,
            num_elements_k: K_VALUE_NUM_ELEMENTS,
            element_id_k: K_VALUE_ELEMENT_ID,
            element_weight_k: K_VALUE_ELEMENT_WEIGHT,
        }
    }

    pub fn get(&self, key: CodeParamKey) -> u32 {
        match key {
            CodeParamKey::FirstWordPos => self.first_word_pos_k,
            CodeParamKey::DeltaWordPos => self.delta_word_pos_k,
            CodeParamKey::ElementLen => self.element_len_k,
            CodeParamKey::NumPositions => self.num_positions_k,
            CodeParamKey::NumElements => self.num_elements_k,
            CodeParamKey::ElementId => self.element_id_k,
            CodeParamKey::ElementWeight => self.element_weight_k,
        }
    }

    pub fn set(&mut self, key: CodeParamKey, k: u32) {
        let slot = match key {
            CodeParamKey::FirstWordPos => &mut self.first_word_pos_k,
            CodeParamKey::DeltaWordPos => &mut self.delta_word_pos_k,
            CodeParamKey::ElementLen => &mut self.element_len_k,
            CodeParamKey::NumPositions => &mut self.num_positions_k,
            CodeParamKey::NumElements => &mut self.num_elements_k,
            CodeParamKey::ElementId => &mut self.element_id_k,
            CodeParamKey::ElementWeight => &mut self.element_weight_k,
        };
        *slot = k;
    }

    /// K values used for the first position and for the following deltas of an
    /// element with `num_positions` positions and length `element_len`.
    #[inline]
    pub fn word_pos_ks(
        &self,
        profile: CodeProfile,
        num_positions: u32,
        element_len: u32,
    ) -> (u32, u32) {
        match profile {
            CodeProfile::DualK => (self.first_word_pos_k, self.delta_word_pos_k),
            CodeProfile::SingleK => {
                let k = word_pos_k(num_positions, element_len);
                (k, k)
            }
        }
    }
}

/// Element length K for an average element length: 1 below 4, otherwise
/// `floor(log2(avg_element_len))`.
#[inline]
pub fn element_len_k(avg_element_len: u32) -> u32 {
    if avg_element_len < 4 {
        1
    } else {
        avg_element_len.ilog2()
    }
}

/// Word position K for an element: with `avg_delta = element_len / (num_positions + 1)`,
/// 1 below 4, otherwise `floor(log2(avg_delta))`.
#[inline]
pub fn word_pos_k(num_positions: u32, element_len: u32) -> u32 {
    let avg_delta = element_len / num_positions.saturating_add(1);
    if avg_delta < 4 { 1 } else { avg_delta.ilog2() }
}
