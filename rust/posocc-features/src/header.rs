//! Header block describing a feature stream: format identifier, field descriptors
//! and the code parameters the stream was written with.

use std::collections::BTreeMap;

use posocc_common::{Result, error::Error};
use serde::{Deserialize, Serialize};

use crate::{
    code_params::{CodeParamKey, CodeParams, CodeProfile, MAX_K},
    fields_params::{CollectionType, FieldsParams},
};

/// Identifiers of older or foreign feature formats that are recognized but
/// cannot be decoded.
pub const LEGACY_IDENTIFIERS: [&str; 3] = ["EG2PosOcc.2", "EGPosOcc.2", "PosOcc.3"];

/// A typed header value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderTag {
    Integer(i64),
    String(String),
}

/// Ordered map of header tags, persisted by the caller next to the posting lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureHeader {
    tags: BTreeMap<String, HeaderTag>,
}

impl FeatureHeader {
    pub fn new() -> FeatureHeader {
        Default::default()
    }

    pub fn put_integer(&mut self, key: impl Into<String>, value: i64) {
        self.tags.insert(key.into(), HeaderTag::Integer(value));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), HeaderTag::String(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&HeaderTag> {
        self.tags.get(key)
    }

    pub fn get_integer(&self, key: &str) -> Result<i64> {
        match self.tags.get(key) {
            Some(HeaderTag::Integer(v)) => Ok(*v),
            Some(_) => Err(Error::invalid_format(key, "tag is not an integer")),
            None => Err(Error::invalid_format(key, "tag is missing")),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<&str> {
        match self.tags.get(key) {
            Some(HeaderTag::String(v)) => Ok(v),
            Some(_) => Err(Error::invalid_format(key, "tag is not a string")),
            None => Err(Error::invalid_format(key, "tag is missing")),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<HeaderTag> {
        self.tags.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderTag)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::invalid_arg("header", e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<FeatureHeader> {
        serde_json::from_str(json).map_err(|e| Error::invalid_format("header", e.to_string()))
    }
}

fn field_key(prefix: &str, field_id: usize, name: &str) -> String {
    format!("{prefix}field[{field_id}].{name}")
}

fn bool_tag(header: &FeatureHeader, key: &str) -> Result<bool> {
    match header.get_integer(key)? {
        0 => Ok(false),
        1 => Ok(true),
        v => Err(Error::invalid_format(key, format!("{v}, expected 0 or 1"))),
    }
}

fn u32_tag(header: &FeatureHeader, key: &str, max: u32) -> Result<u32> {
    let value = header.get_integer(key)?;
    u32::try_from(value)
        .ok()
        .filter(|&v| v <= max)
        .ok_or_else(|| Error::invalid_format(key, format!("{value} out of range")))
}

/// Writes the stream identifier, every field descriptor and the code parameters
/// of `field_id` under `prefix`. Other fields get their default parameters.
pub(crate) fn write_code_header(
    header: &mut FeatureHeader,
    prefix: &str,
    fields: &FieldsParams,
    field_id: usize,
    profile: CodeProfile,
    params: &CodeParams,
) {
    header.put_string(format!("{prefix}format"), profile.identifier());
    header.put_integer(format!("{prefix}numFields"), fields.num_fields() as i64);
    for (i, field) in fields.fields().iter().enumerate() {
        let field_params = if i == field_id {
            *params
        } else {
            field.default_code_params(profile)
        };
        header.put_string(field_key(prefix, i, "name"), field.name.as_str());
        header.put_string(
            field_key(prefix, i, "collectionType"),
            field.collection.as_str(),
        );
        header.put_integer(
            field_key(prefix, i, "avgElemLen"),
            field_params.avg_elem_len as i64,
        );
        header.put_integer(
            field_key(prefix, i, "hasPositions"),
            field.has_positions as i64,
        );
        for key in CodeParamKey::ALL {
            header.put_integer(field_key(prefix, i, key.name()), field_params.get(key) as i64);
        }
    }
    log::debug!(
        "wrote feature header '{}' for {} field(s) under prefix '{prefix}'",
        profile.identifier(),
        fields.num_fields()
    );
}

/// Validates the header under `prefix` against `fields` and `profile` and
/// returns the code parameters stored for `field_id`.
pub(crate) fn read_code_header(
    header: &FeatureHeader,
    prefix: &str,
    fields: &FieldsParams,
    field_id: usize,
    profile: CodeProfile,
) -> Result<CodeParams> {
    let identifier = header.get_string(&format!("{prefix}format"))?;
    if identifier != profile.identifier() {
        if LEGACY_IDENTIFIERS.contains(&identifier) {
            log::debug!("feature format '{identifier}' is recognized but not supported");
        }
        return Err(Error::format_mismatch(identifier, profile.identifier()));
    }

    let num_fields = header.get_integer(&format!("{prefix}numFields"))?;
    if num_fields != fields.num_fields() as i64 {
        return Err(Error::param_mismatch(
            "numFields",
            format!("header has {num_fields}, schema has {}", fields.num_fields()),
        ));
    }

    let mut result = None;
    for (i, field) in fields.fields().iter().enumerate() {
        let collection_key = field_key(prefix, i, "collectionType");
        let collection_name = header.get_string(&collection_key)?;
        let collection = CollectionType::parse(collection_name).ok_or_else(|| {
            Error::invalid_format(
                &collection_key,
                format!("unknown collection type '{collection_name}'"),
            )
        })?;
        if collection != field.collection {
            return Err(Error::param_mismatch(
                collection_key,
                format!(
                    "header has '{}', field '{}' is '{}'",
                    collection.as_str(),
                    field.name,
                    field.collection.as_str()
                ),
            ));
        }

        let positions_key = field_key(prefix, i, "hasPositions");
        let has_positions = bool_tag(header, &positions_key)?;
        if has_positions != field.has_positions {
            return Err(Error::param_mismatch(
                positions_key,
                format!(
                    "header has {has_positions}, field '{}' has {}",
                    field.name, field.has_positions
                ),
            ));
        }

        let mut params = CodeParams::for_profile(
            profile,
            u32_tag(header, &field_key(prefix, i, "avgElemLen"), u32::MAX)?,
        );
        for key in CodeParamKey::ALL {
            params.set(key, u32_tag(header, &field_key(prefix, i, key.name()), MAX_K)?);
        }
        if i == field_id {
            result = Some(params);
        }
    }
    log::debug!("read feature header '{identifier}' under prefix '{prefix}'");
    result.ok_or_else(|| Error::invalid_arg("field_id", format!("no field {field_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields_params::FieldParams;

    fn fields() -> FieldsParams {
        FieldsParams::new(vec![
            FieldParams::new("title", CollectionType::Single),
            FieldParams::new("tags", CollectionType::WeightedSet).with_positions(false),
        ])
        .unwrap()
    }

    #[test]
    fn test_header_round_trip() {
        let fields = fields();
        let mut params = fields.fields()[1].default_code_params(CodeProfile::DualK);
        params.element_id_k = 3;

        let mut header = FeatureHeader::new();
        write_code_header(&mut header, "features.", &fields, 1, CodeProfile::DualK, &params);
        assert_eq!(header.get_string("features.format").unwrap(), "EG2PosOcc.3");
        assert_eq!(header.get_integer("features.numFields").unwrap(), 2);
        assert_eq!(
            header.get_string("features.field[1].collectionType").unwrap(),
            "weightedSet"
        );
        assert_eq!(header.get_integer("features.field[1].hasPositions").unwrap(), 0);

        let restored =
            read_code_header(&header, "features.", &fields, 1, CodeProfile::DualK).unwrap();
        assert_eq!(restored, params);

        let json = header.to_json().unwrap();
        assert_eq!(FeatureHeader::from_json(&json).unwrap(), header);
    }

    #[test]
    fn test_header_format_mismatch() {
        let fields = fields();
        let params = fields.fields()[0].default_code_params(CodeProfile::SingleK);
        let mut header = FeatureHeader::new();
        write_code_header(&mut header, "", &fields, 0, CodeProfile::SingleK, &params);

        let err = read_code_header(&header, "", &fields, 0, CodeProfile::DualK).unwrap_err();
        assert!(err.is_format_mismatch());

        for legacy in LEGACY_IDENTIFIERS {
            header.put_string("format", legacy);
            let err = read_code_header(&header, "", &fields, 0, CodeProfile::SingleK).unwrap_err();
            assert!(err.is_format_mismatch());
        }
    }

    #[test]
    fn test_header_param_mismatch() {
        let fields = fields();
        let params = fields.fields()[0].default_code_params(CodeProfile::DualK);
        let mut header = FeatureHeader::new();
        write_code_header(&mut header, "", &fields, 0, CodeProfile::DualK, &params);

        let one = FieldsParams::single(FieldParams::new("title", CollectionType::Single));
        let err = read_code_header(&header, "", &one, 0, CodeProfile::DualK).unwrap_err();
        assert!(err.is_param_mismatch());

        let other = FieldsParams::new(vec![
            FieldParams::new("title", CollectionType::Array),
            FieldParams::new("tags", CollectionType::WeightedSet).with_positions(false),
        ])
        .unwrap();
        let err = read_code_header(&header, "", &other, 0, CodeProfile::DualK).unwrap_err();
        assert!(err.is_param_mismatch());
    }

    #[test]
    fn test_header_invalid_tags() {
        let fields = fields();
        let params = fields.fields()[0].default_code_params(CodeProfile::DualK);
        let mut header = FeatureHeader::new();
        write_code_header(&mut header, "", &fields, 0, CodeProfile::DualK, &params);

        let mut broken = header.clone();
        broken.put_integer("field[0].deltaWordPosK", 40);
        assert!(read_code_header(&broken, "", &fields, 0, CodeProfile::DualK).is_err());

        let mut broken = header.clone();
        broken.remove("field[1].elementIdK");
        let err = read_code_header(&broken, "", &fields, 0, CodeProfile::DualK).unwrap_err();
        assert!(err.to_string().contains("missing"));

        let mut broken = header;
        broken.put_string("numFields", "2");
        assert!(read_code_header(&broken, "", &fields, 0, CodeProfile::DualK).is_err());
    }
}
