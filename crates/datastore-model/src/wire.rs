//! Field accessors shared by the `from_wire` parsers.

use crate::error::{ModelError, ModelResult};
use serde_json::{Map, Value as Json};

pub(crate) fn object<'a>(value: &'a Json, what: &str) -> ModelResult<&'a Map<String, Json>> {
    value
        .as_object()
        .ok_or_else(|| ModelError::decode(format!("{what} must be a json object")))
}

pub(crate) fn required<'a>(value: &'a Json, field: &str) -> ModelResult<&'a Json> {
    value
        .get(field)
        .filter(|field_value| !field_value.is_null())
        .ok_or_else(|| ModelError::decode(format!("missing field '{field}'")))
}

pub(crate) fn required_str<'a>(value: &'a Json, field: &str) -> ModelResult<&'a str> {
    required(value, field)?
        .as_str()
        .ok_or_else(|| ModelError::decode(format!("field '{field}' must be a string")))
}

pub(crate) fn optional_str<'a>(value: &'a Json, field: &str) -> ModelResult<Option<&'a str>> {
    match value.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(text)) => Ok(Some(text)),
        Some(_) => Err(ModelError::decode(format!(
            "field '{field}' must be a string"
        ))),
    }
}

/// int64 fields travel as decimal strings; some emulators send bare numbers.
pub(crate) fn optional_int_string(value: &Json, field: &str) -> ModelResult<Option<String>> {
    match value.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(text)) => Ok(Some(text.clone())),
        Some(Json::Number(number)) => Ok(Some(number.to_string())),
        Some(_) => Err(ModelError::decode(format!(
            "field '{field}' must be a string or number"
        ))),
    }
}

pub(crate) fn optional_i64(value: &Json, field: &str) -> ModelResult<Option<i64>> {
    match value.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(raw) => parse_i64(raw)
            .map(Some)
            .ok_or_else(|| ModelError::decode(format!("field '{field}' must be an int64"))),
    }
}

pub(crate) fn optional_array<'a>(value: &'a Json, field: &str) -> ModelResult<&'a [Json]> {
    match value.get(field) {
        None | Some(Json::Null) => Ok(&[]),
        Some(Json::Array(items)) => Ok(items),
        Some(_) => Err(ModelError::decode(format!(
            "field '{field}' must be an array"
        ))),
    }
}

pub(crate) fn parse_i64(raw: &Json) -> Option<i64> {
    match raw {
        Json::String(text) => text.parse::<i64>().ok(),
        Json::Number(number) => number.as_i64(),
        _ => None,
    }
}
