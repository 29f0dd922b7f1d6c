//! Typed name-value parameters exchanged with encode and decode contexts.

use ahash::AHashMap;
use posocc_common::{Result, error::Error};

use crate::code_params::{CodeParamKey, CodeParams, MAX_K, element_len_k};

/// Parameter key for the average element length of the context's field.
pub const AVG_ELEM_LEN: &str = "avgElemLen";
/// Read-only: number of fields of the context's field set.
pub const NUM_FIELDS: &str = "numFields";
/// Read-only: name of the context's code profile.
pub const PROFILE: &str = "profile";
/// Read-only: whether the context decodes through the single-element fast path.
pub const COOKED: &str = "cooked";

/// A parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl ParamValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(value as i64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Str(value)
    }
}

/// Collection of named parameter values used to tune a context (`set_params`) and
/// to inspect its current configuration (`get_params`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBag(AHashMap<String, ParamValue>);

impl ParamBag {
    pub fn new() -> ParamBag {
        ParamBag(Default::default())
    }

    /// Sets a parameter, replacing any previous value of the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&ParamValue> {
        self.0.get(name.as_ref())
    }

    pub fn get_int(&self, name: impl AsRef<str>) -> Option<i64> {
        self.get(name).and_then(ParamValue::as_int)
    }

    pub fn get_bool(&self, name: impl AsRef<str>) -> Option<bool> {
        self.get(name).and_then(ParamValue::as_bool)
    }

    pub fn get_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.get(name).and_then(ParamValue::as_str)
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.0.contains_key(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }
}

fn int_param(name: &str, value: &ParamValue) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| Error::invalid_arg(name, format!("expected an integer, got {value:?}")))
}

fn k_param(name: &str, value: &ParamValue) -> Result<u32> {
    let k = int_param(name, value)?;
    u32::try_from(k)
        .ok()
        .filter(|&k| k <= MAX_K)
        .ok_or_else(|| Error::invalid_arg(name, format!("K value {k} outside 0..={MAX_K}")))
}

/// Computes the code parameters resulting from applying `bag` to `current`.
///
/// `avgElemLen` is applied first and re-derives the element length K; an explicit
/// `elementLenK` in the same bag takes precedence. Read-only and unknown keys are
/// ignored. On error nothing is applied.
pub(crate) fn apply_params(current: &CodeParams, bag: &ParamBag) -> Result<CodeParams> {
    let mut params = *current;
    if let Some(value) = bag.get(AVG_ELEM_LEN) {
        let avg = int_param(AVG_ELEM_LEN, value)?;
        let avg = u32::try_from(avg)
            .map_err(|_| Error::invalid_arg(AVG_ELEM_LEN, format!("{avg} out of range")))?;
        params.avg_elem_len = avg;
        params.element_len_k = element_len_k(avg);
    }
    for key in CodeParamKey::ALL {
        if let Some(value) = bag.get(key.name()) {
            params.set(key, k_param(key.name(), value)?);
        }
    }
    for (name, _) in bag.iter() {
        let known = name == AVG_ELEM_LEN
            || name == NUM_FIELDS
            || name == PROFILE
            || name == COOKED
            || CodeParamKey::ALL.iter().any(|key| key.name() == name);
        if !known {
            log::debug!("ignoring unknown feature parameter '{name}'");
        }
    }
    if params != *current {
        log::trace!("feature code parameters changed: {current:?} -> {params:?}");
    }
    Ok(params)
}

/// Stores `params` under their parameter names.
pub(crate) fn export_params(params: &CodeParams, bag: &mut ParamBag) {
    bag.set(AVG_ELEM_LEN, params.avg_elem_len);
    for key in CodeParamKey::ALL {
        bag.set(key.name(), params.get(key));
    }
}
