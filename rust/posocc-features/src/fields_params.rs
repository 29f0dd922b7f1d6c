//! Field descriptors shared by every encode and decode context of an index.

use posocc_common::{Result, error::Error, verify_arg};
use serde::{Deserialize, Serialize};

use crate::code_params::{CodeParams, CodeProfile, DEFAULT_AVG_ELEM_LEN};

/// Shape of a field value within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionType {
    /// One element per document.
    Single,
    /// Any number of elements, addressed by element id.
    Array,
    /// Like [`CollectionType::Array`], with a signed weight per element.
    WeightedSet,
}

impl CollectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Single => "single",
            CollectionType::Array => "array",
            CollectionType::WeightedSet => "weightedSet",
        }
    }

    pub fn parse(s: &str) -> Option<CollectionType> {
        match s {
            "single" => Some(CollectionType::Single),
            "array" => Some(CollectionType::Array),
            "weightedSet" => Some(CollectionType::WeightedSet),
            _ => None,
        }
    }

    /// Whether element counts and element ids are stored.
    #[inline]
    pub fn has_elements(&self) -> bool {
        !matches!(self, CollectionType::Single)
    }

    /// Whether element weights are stored.
    #[inline]
    pub fn has_element_weights(&self) -> bool {
        matches!(self, CollectionType::WeightedSet)
    }
}

/// Descriptor of one indexed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldParams {
    pub name: String,
    pub collection: CollectionType,
    /// Average element length in words, as gathered at index build time.
    #[serde(default = "default_avg_elem_len")]
    pub avg_elem_len: u32,
    /// Whether word positions are stored for each element.
    #[serde(default = "default_has_positions")]
    pub has_positions: bool,
}

fn default_avg_elem_len() -> u32 {
    DEFAULT_AVG_ELEM_LEN
}

fn default_has_positions() -> bool {
    true
}

impl FieldParams {
    pub fn new(name: impl Into<String>, collection: CollectionType) -> FieldParams {
        FieldParams {
            name: name.into(),
            collection,
            avg_elem_len: DEFAULT_AVG_ELEM_LEN,
            has_positions: true,
        }
    }

    pub fn with_avg_elem_len(mut self, avg_elem_len: u32) -> FieldParams {
        self.avg_elem_len = avg_elem_len;
        self
    }

    pub fn with_positions(mut self, has_positions: bool) -> FieldParams {
        self.has_positions = has_positions;
        self
    }

    /// Code parameters a context starts with for this field.
    pub fn default_code_params(&self, profile: CodeProfile) -> CodeParams {
        CodeParams::for_profile(profile, self.avg_elem_len)
    }
}

/// Ordered, immutable set of field descriptors.
///
/// Contexts borrow the set for their whole lifetime; it is never modified after
/// construction and can be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FieldParams>", into = "Vec<FieldParams>")]
pub struct FieldsParams {
    fields: Vec<FieldParams>,
}

impl FieldsParams {
    pub fn new(fields: Vec<FieldParams>) -> Result<FieldsParams> {
        verify_arg!(fields, !fields.is_empty());
        Ok(FieldsParams { fields })
    }

    /// Set with exactly one field.
    pub fn single(field: FieldParams) -> FieldsParams {
        FieldsParams {
            fields: vec![field],
        }
    }

    #[inline]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, field_id: usize) -> Option<&FieldParams> {
        self.fields.get(field_id)
    }

    pub fn fields(&self) -> &[FieldParams] {
        &self.fields
    }

    /// Whether the specialized single-element decoder can serve this set: exactly
    /// one field, holding single values.
    pub fn supports_cooked(&self) -> bool {
        matches!(self.fields.as_slice(), [field] if field.collection == CollectionType::Single)
    }

    /// Loads the field set from its JSON form, an array of field descriptors.
    pub fn from_json(json: &str) -> Result<FieldsParams> {
        serde_json::from_str(json).map_err(|e| Error::invalid_arg("json", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::invalid_arg("fields", e.to_string()))
    }
}

impl TryFrom<Vec<FieldParams>> for FieldsParams {
    type Error = Error;

    fn try_from(fields: Vec<FieldParams>) -> Result<FieldsParams> {
        FieldsParams::new(fields)
    }
}

impl From<FieldsParams> for Vec<FieldParams> {
    fn from(params: FieldsParams) -> Vec<FieldParams> {
        params.fields
    }
}
