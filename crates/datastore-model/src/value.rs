//! Property values and their wire envelopes.
//!
//! A value is built either from a native Rust value or from the raw json the
//! service returned. The native side is converted lazily on first read and
//! cached; serialization re-encodes the native side when present and passes the
//! raw json through untouched otherwise.
//!
//! Envelope shape: `{"<tag>": <raw>, "excludeFromIndexes": <!indexed>}`. Array
//! envelopes carry no index flag of their own.

use crate::error::{ModelError, ModelResult};
use crate::key::Key;
use base64::Engine;
use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};
use std::collections::HashMap;
use std::fmt;

/// Conversion rules for one value kind.
pub trait WireKind: 'static {
    type Native: Clone + fmt::Debug + PartialEq + Send + Sync;

    /// Envelope key, e.g. `integerValue`.
    const TAG: &'static str;
    const EMITS_INDEX_FLAG: bool = true;

    fn decode(raw: &Json) -> ModelResult<Self::Native>;
    fn encode(native: &Self::Native) -> Json;

    /// Brings a native value down to what the wire form can carry.
    fn normalize(native: Self::Native) -> Self::Native {
        native
    }
}

pub struct TypedValue<K: WireKind> {
    native: OnceCell<K::Native>,
    raw: Option<Json>,
    pub indexed: bool,
}

impl<K: WireKind> TypedValue<K> {
    pub fn new(value: K::Native) -> Self {
        Self {
            native: OnceCell::with_value(K::normalize(value)),
            raw: None,
            indexed: true,
        }
    }

    pub fn from_raw(raw: Json, indexed: bool) -> Self {
        Self {
            native: OnceCell::new(),
            raw: Some(raw),
            indexed,
        }
    }

    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }

    /// Logical value. Decodes the raw json once and caches the result.
    pub fn value(&self) -> ModelResult<&K::Native> {
        self.native.get_or_try_init(|| match &self.raw {
            Some(raw) => K::decode(raw),
            None => Err(ModelError::decode(format!(
                "{} holds neither a native nor a raw value",
                K::TAG
            ))),
        })
    }

    /// Replaces the native value. The raw json is left as-is; it is only
    /// consulted while no native value exists.
    pub fn set_value(&mut self, value: K::Native) {
        self.native = OnceCell::with_value(K::normalize(value));
    }

    pub fn native(&self) -> Option<&K::Native> {
        self.native.get()
    }

    pub fn raw(&self) -> Option<&Json> {
        self.raw.as_ref()
    }

    pub fn to_wire(&self) -> Json {
        let raw = match self.native.get() {
            Some(native) => K::encode(native),
            None => self.raw.clone().unwrap_or(Json::Null),
        };
        let mut envelope = Map::new();
        envelope.insert(K::TAG.to_string(), raw);
        if K::EMITS_INDEX_FLAG {
            envelope.insert("excludeFromIndexes".into(), Json::Bool(!self.indexed));
        }
        Json::Object(envelope)
    }
}

impl<K: WireKind> Clone for TypedValue<K> {
    fn clone(&self) -> Self {
        Self {
            native: self.native.clone(),
            raw: self.raw.clone(),
            indexed: self.indexed,
        }
    }
}

impl<K: WireKind> fmt::Debug for TypedValue<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(K::TAG)
            .field("native", &self.native.get())
            .field("raw", &self.raw)
            .field("indexed", &self.indexed)
            .finish()
    }
}

/// Compares logical values; the index flag is not part of equality.
impl<K: WireKind> PartialEq for TypedValue<K> {
    fn eq(&self, other: &Self) -> bool {
        match (self.value(), other.value()) {
            (Ok(left), Ok(right)) => left == right,
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

pub struct NullKind;
pub struct BooleanKind;
pub struct StringKind;
pub struct IntegerKind;
pub struct DoubleKind;
pub struct TimestampKind;
pub struct BlobKind;
pub struct ArrayKind;
pub struct GeoPointKind;
pub struct KeyKind;

pub type NullValue = TypedValue<NullKind>;
pub type BooleanValue = TypedValue<BooleanKind>;
pub type StringValue = TypedValue<StringKind>;
pub type IntegerValue = TypedValue<IntegerKind>;
pub type DoubleValue = TypedValue<DoubleKind>;
pub type TimestampValue = TypedValue<TimestampKind>;
pub type BlobValue = TypedValue<BlobKind>;
pub type ArrayValue = TypedValue<ArrayKind>;
pub type GeoPointValue = TypedValue<GeoPointKind>;
pub type KeyValue = TypedValue<KeyKind>;

const NULL_VALUE: &str = "NULL_VALUE";

impl NullValue {
    pub fn null() -> Self {
        Self::new(())
    }
}

impl WireKind for NullKind {
    type Native = ();
    const TAG: &'static str = "nullValue";

    fn decode(_raw: &Json) -> ModelResult<()> {
        Ok(())
    }

    fn encode(_native: &()) -> Json {
        Json::from(NULL_VALUE)
    }
}

impl WireKind for BooleanKind {
    type Native = bool;
    const TAG: &'static str = "booleanValue";

    fn decode(raw: &Json) -> ModelResult<bool> {
        raw.as_bool()
            .ok_or_else(|| ModelError::decode(format!("booleanValue must be a bool: {raw}")))
    }

    fn encode(native: &bool) -> Json {
        Json::Bool(*native)
    }
}

impl WireKind for StringKind {
    type Native = String;
    const TAG: &'static str = "stringValue";

    fn decode(raw: &Json) -> ModelResult<String> {
        raw.as_str()
            .map(str::to_string)
            .ok_or_else(|| ModelError::decode(format!("stringValue must be a string: {raw}")))
    }

    fn encode(native: &String) -> Json {
        Json::from(native.as_str())
    }
}

impl WireKind for IntegerKind {
    type Native = i64;
    const TAG: &'static str = "integerValue";

    fn decode(raw: &Json) -> ModelResult<i64> {
        crate::wire::parse_i64(raw)
            .ok_or_else(|| ModelError::decode(format!("integerValue must be an int64: {raw}")))
    }

    fn encode(native: &i64) -> Json {
        Json::from(native.to_string())
    }
}

impl WireKind for DoubleKind {
    type Native = f64;
    const TAG: &'static str = "doubleValue";

    fn decode(raw: &Json) -> ModelResult<f64> {
        let parsed = match raw {
            Json::Number(number) => number.as_f64(),
            Json::String(text) => match text.as_str() {
                "NaN" => Some(f64::NAN),
                "Infinity" => Some(f64::INFINITY),
                "-Infinity" => Some(f64::NEG_INFINITY),
                other => other.parse().ok(),
            },
            _ => None,
        };
        parsed.ok_or_else(|| ModelError::decode(format!("doubleValue must be a number: {raw}")))
    }

    // json numbers cannot carry non-finite floats
    fn encode(native: &f64) -> Json {
        if native.is_nan() {
            Json::from("NaN")
        } else if native.is_infinite() {
            Json::from(if *native > 0.0 { "Infinity" } else { "-Infinity" })
        } else {
            Json::from(*native)
        }
    }
}

impl WireKind for TimestampKind {
    type Native = DateTime<Utc>;
    const TAG: &'static str = "timestampValue";

    fn decode(raw: &Json) -> ModelResult<DateTime<Utc>> {
        let text = raw
            .as_str()
            .ok_or_else(|| ModelError::decode(format!("timestampValue must be a string: {raw}")))?;
        parse_timestamp(text)
    }

    fn encode(native: &DateTime<Utc>) -> Json {
        Json::from(format_timestamp(native))
    }

    fn normalize(native: DateTime<Utc>) -> DateTime<Utc> {
        truncate_to_micros(native)
    }
}

fn truncate_to_micros(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .with_nanosecond(timestamp.nanosecond() / 1_000 * 1_000)
        .unwrap_or(timestamp)
}

/// RFC 3339 in UTC with exactly six fractional digits and a trailing `Z`.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Parses any fractional precision, with or without a zone suffix, and
/// truncates to microseconds.
pub fn parse_timestamp(text: &str) -> ModelResult<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(text)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
        .map_err(|err| ModelError::decode(format!("invalid timestamp '{text}': {err}")))?;
    Ok(truncate_to_micros(parsed))
}

impl WireKind for BlobKind {
    type Native = Vec<u8>;
    const TAG: &'static str = "blobValue";

    fn decode(raw: &Json) -> ModelResult<Vec<u8>> {
        let text = raw
            .as_str()
            .ok_or_else(|| ModelError::decode(format!("blobValue must be a string: {raw}")))?;
        base64::engine::general_purpose::STANDARD
            .decode(text)
            .map_err(|err| ModelError::decode(format!("blobValue base64 decode failed: {err}")))
    }

    fn encode(native: &Vec<u8>) -> Json {
        Json::from(base64::engine::general_purpose::STANDARD.encode(native))
    }
}

impl WireKind for ArrayKind {
    type Native = Vec<Value>;
    const TAG: &'static str = "arrayValue";
    const EMITS_INDEX_FLAG: bool = false;

    // The service drops `values` entirely for an empty array.
    fn decode(raw: &Json) -> ModelResult<Vec<Value>> {
        crate::wire::optional_array(raw, "values")?
            .iter()
            .enumerate()
            .map(|(index, element)| Value::from_wire(&format!("{}[{index}]", Self::TAG), element))
            .collect()
    }

    fn encode(native: &Vec<Value>) -> Json {
        let mut data = Map::new();
        data.insert(
            "values".into(),
            Json::Array(native.iter().map(Value::to_wire).collect()),
        );
        Json::Object(data)
    }
}

impl WireKind for GeoPointKind {
    type Native = LatLng;
    const TAG: &'static str = "geoPointValue";

    fn decode(raw: &Json) -> ModelResult<LatLng> {
        crate::wire::object(raw, Self::TAG)?;
        let coordinate = |field: &str| -> ModelResult<f64> {
            match raw.get(field) {
                None | Some(Json::Null) => Ok(0.0),
                Some(value) => value.as_f64().ok_or_else(|| {
                    ModelError::decode(format!("geoPointValue.{field} must be a number"))
                }),
            }
        };
        Ok(LatLng {
            lat: coordinate("latitude")?,
            lng: coordinate("longitude")?,
        })
    }

    fn encode(native: &LatLng) -> Json {
        let mut data = Map::new();
        data.insert("latitude".into(), Json::from(native.lat));
        data.insert("longitude".into(), Json::from(native.lng));
        Json::Object(data)
    }
}

impl WireKind for KeyKind {
    type Native = Key;
    const TAG: &'static str = "keyValue";

    fn decode(raw: &Json) -> ModelResult<Key> {
        Key::from_wire(raw)
    }

    fn encode(native: &Key) -> Json {
        native.to_wire()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null(NullValue),
    Boolean(BooleanValue),
    String(StringValue),
    Integer(IntegerValue),
    Double(DoubleValue),
    Timestamp(TimestampValue),
    Blob(BlobValue),
    Array(ArrayValue),
    GeoPoint(GeoPointValue),
    Key(KeyValue),
}

type WireDecoder = fn(Json, bool) -> Value;

macro_rules! decoder_entry {
    ($table:ident, $kind:ty, $variant:ident) => {
        $table.insert(
            <$kind as WireKind>::TAG,
            (|raw: Json, indexed: bool| Value::$variant(TypedValue::<$kind>::from_raw(raw, indexed)))
                as WireDecoder,
        );
    };
}

/// Envelope tag to constructor. Built once, read-only afterwards.
static VALUE_TYPES: Lazy<HashMap<&'static str, WireDecoder>> = Lazy::new(|| {
    let mut table = HashMap::new();
    decoder_entry!(table, NullKind, Null);
    decoder_entry!(table, BooleanKind, Boolean);
    decoder_entry!(table, StringKind, String);
    decoder_entry!(table, IntegerKind, Integer);
    decoder_entry!(table, DoubleKind, Double);
    decoder_entry!(table, TimestampKind, Timestamp);
    decoder_entry!(table, BlobKind, Blob);
    decoder_entry!(table, ArrayKind, Array);
    decoder_entry!(table, GeoPointKind, GeoPoint);
    decoder_entry!(table, KeyKind, Key);
    table
});

impl Value {
    pub fn null() -> Self {
        Self::Null(NullValue::null())
    }

    pub fn boolean(value: bool) -> Self {
        Self::Boolean(BooleanValue::new(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::String(StringValue::new(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::Integer(IntegerValue::new(value))
    }

    pub fn double(value: f64) -> Self {
        Self::Double(DoubleValue::new(value))
    }

    pub fn timestamp(value: DateTime<Utc>) -> Self {
        Self::Timestamp(TimestampValue::new(value))
    }

    pub fn blob(value: impl Into<Vec<u8>>) -> Self {
        Self::Blob(BlobValue::new(value.into()))
    }

    pub fn array(values: Vec<Value>) -> Self {
        Self::Array(ArrayValue::new(values))
    }

    pub fn geo_point(lat: f64, lng: f64) -> Self {
        Self::GeoPoint(GeoPointValue::new(LatLng::new(lat, lng)))
    }

    pub fn key(key: Key) -> Self {
        Self::Key(KeyValue::new(key))
    }

    /// Builds a value from its envelope. The kind is the first key ending in
    /// `Value`; `property` only labels the error.
    pub fn from_wire(property: &str, envelope: &Json) -> ModelResult<Self> {
        let unrecognized = || ModelError::UnrecognizedValueKind {
            property: property.to_string(),
        };
        let fields = envelope.as_object().ok_or_else(unrecognized)?;
        let (tag, raw) = fields
            .iter()
            .find(|(field, _)| field.ends_with("Value"))
            .ok_or_else(unrecognized)?;
        let decode = VALUE_TYPES.get(tag.as_str()).ok_or_else(unrecognized)?;
        let excluded = fields
            .get("excludeFromIndexes")
            .and_then(Json::as_bool)
            .unwrap_or(false);
        Ok(decode(raw.clone(), !excluded))
    }

    pub fn to_wire(&self) -> Json {
        match self {
            Self::Null(value) => value.to_wire(),
            Self::Boolean(value) => value.to_wire(),
            Self::String(value) => value.to_wire(),
            Self::Integer(value) => value.to_wire(),
            Self::Double(value) => value.to_wire(),
            Self::Timestamp(value) => value.to_wire(),
            Self::Blob(value) => value.to_wire(),
            Self::Array(value) => value.to_wire(),
            Self::GeoPoint(value) => value.to_wire(),
            Self::Key(value) => value.to_wire(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Null(_) => NullKind::TAG,
            Self::Boolean(_) => BooleanKind::TAG,
            Self::String(_) => StringKind::TAG,
            Self::Integer(_) => IntegerKind::TAG,
            Self::Double(_) => DoubleKind::TAG,
            Self::Timestamp(_) => TimestampKind::TAG,
            Self::Blob(_) => BlobKind::TAG,
            Self::Array(_) => ArrayKind::TAG,
            Self::GeoPoint(_) => GeoPointKind::TAG,
            Self::Key(_) => KeyKind::TAG,
        }
    }

    pub fn indexed(&self) -> bool {
        match self {
            Self::Null(value) => value.indexed,
            Self::Boolean(value) => value.indexed,
            Self::String(value) => value.indexed,
            Self::Integer(value) => value.indexed,
            Self::Double(value) => value.indexed,
            Self::Timestamp(value) => value.indexed,
            Self::Blob(value) => value.indexed,
            Self::Array(value) => value.indexed,
            Self::GeoPoint(value) => value.indexed,
            Self::Key(value) => value.indexed,
        }
    }

    pub fn set_indexed(&mut self, indexed: bool) {
        match self {
            Self::Null(value) => value.indexed = indexed,
            Self::Boolean(value) => value.indexed = indexed,
            Self::String(value) => value.indexed = indexed,
            Self::Integer(value) => value.indexed = indexed,
            Self::Double(value) => value.indexed = indexed,
            Self::Timestamp(value) => value.indexed = indexed,
            Self::Blob(value) => value.indexed = indexed,
            Self::Array(value) => value.indexed = indexed,
            Self::GeoPoint(value) => value.indexed = indexed,
            Self::Key(value) => value.indexed = indexed,
        }
    }

    pub fn unindexed(mut self) -> Self {
        self.set_indexed(false);
        self
    }
}

macro_rules! value_from {
    ($($variant:ident => $typed:ty),* $(,)?) => {
        $(
            impl From<$typed> for Value {
                fn from(value: $typed) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

value_from!(
    Null => NullValue,
    Boolean => BooleanValue,
    String => StringValue,
    Integer => IntegerValue,
    Double => DoubleValue,
    Timestamp => TimestampValue,
    Blob => BlobValue,
    Array => ArrayValue,
    GeoPoint => GeoPointValue,
    Key => KeyValue,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{PartitionId, PathElement};
    use chrono::NaiveDate;
    use serde_json::json;

    fn timestamp() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2022, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123_456)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn integer_native_to_wire_and_back() {
        let value = IntegerValue::new(-123).with_indexed(false);
        let encoded = value.to_wire();
        assert_eq!(
            encoded,
            json!({"integerValue": "-123", "excludeFromIndexes": true})
        );

        let decoded = match Value::from_wire("n", &encoded).unwrap() {
            Value::Integer(decoded) => decoded,
            other => panic!("expected integer value, got {other:?}"),
        };
        assert!(!decoded.indexed);
        assert_eq!(*decoded.value().unwrap(), -123);
    }

    #[test]
    fn raw_value_is_decoded_once_and_cached() {
        let value = IntegerValue::from_raw(json!("42"), true);
        assert!(value.native().is_none());
        assert_eq!(*value.value().unwrap(), 42);
        assert_eq!(value.native(), Some(&42));
    }

    #[test]
    fn unread_raw_value_passes_through_unchanged() {
        let value = TimestampValue::from_raw(json!("raw-value1"), true);
        assert_eq!(
            value.to_wire(),
            json!({"timestampValue": "raw-value1", "excludeFromIndexes": false})
        );
        assert!(value.value().is_err());
    }

    #[test]
    fn set_value_overrides_stale_raw() {
        let mut value = StringValue::from_raw(json!("old"), true);
        value.set_value("new".to_string());
        assert_eq!(value.value().unwrap(), "new");
        assert_eq!(value.raw(), Some(&json!("old")));
        assert_eq!(
            value.to_wire(),
            json!({"stringValue": "new", "excludeFromIndexes": false})
        );
    }

    #[test]
    fn null_encodes_constant() {
        assert_eq!(
            NullValue::null().with_indexed(false).to_wire(),
            json!({"nullValue": "NULL_VALUE", "excludeFromIndexes": true})
        );
        assert_eq!(
            Value::from_wire("n", &json!({"nullValue": null})).unwrap(),
            Value::null()
        );
    }

    #[test]
    fn timestamp_formats_six_digits_and_truncates_nanos() {
        assert_eq!(
            TimestampValue::new(timestamp()).to_wire()["timestampValue"],
            json!("2022-01-02T03:04:05.123456Z")
        );

        let nanos = parse_timestamp("2022-01-02T03:04:05.123456789Z").unwrap();
        assert_eq!(nanos, timestamp());
        let naive = parse_timestamp("2022-01-02T03:04:05.123456").unwrap();
        assert_eq!(naive, timestamp());
        let whole = parse_timestamp("2022-01-02T03:04:05Z").unwrap();
        assert_eq!(format_timestamp(&whole), "2022-01-02T03:04:05.000000Z");
    }

    #[test]
    fn native_timestamp_is_truncated_to_micros() {
        let nanos = timestamp().with_nanosecond(123_456_789).unwrap();
        let value = Value::timestamp(nanos);
        let decoded = Value::from_wire("t", &value.to_wire()).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(value, Value::timestamp(timestamp()));

        let mut updated = TimestampValue::from_raw(json!("2000-01-01T00:00:00Z"), true);
        updated.set_value(nanos);
        assert_eq!(updated.native(), Some(&timestamp()));
    }

    #[test]
    fn blob_is_base64_on_the_wire() {
        let value = BlobValue::from_raw(json!("aGVsbG8h"), true);
        assert_eq!(value.value().unwrap(), b"hello!");
        assert_eq!(
            BlobValue::new(b"hello!".to_vec()).to_wire()["blobValue"],
            json!("aGVsbG8h")
        );
        assert!(BlobValue::from_raw(json!("%%%"), true).value().is_err());
    }

    #[test]
    fn array_serializes_elements_without_own_index_flag() {
        let value = Value::array(vec![
            Value::null().unindexed(),
            Value::boolean(true),
            Value::string("s"),
        ]);
        assert_eq!(
            value.to_wire(),
            json!({"arrayValue": {"values": [
                {"nullValue": "NULL_VALUE", "excludeFromIndexes": true},
                {"booleanValue": true, "excludeFromIndexes": false},
                {"stringValue": "s", "excludeFromIndexes": false},
            ]}})
        );
    }

    #[test]
    fn array_elements_dispatch_by_tag() {
        let value = ArrayValue::from_raw(
            json!({"values": [
                {"nullValue": "NULL_VALUE"},
                {"stringValue": "string1", "excludeFromIndexes": true},
                {"booleanValue": false},
            ]}),
            true,
        );
        let elements = value.value().unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], Value::null());
        assert_eq!(elements[1].tag(), "stringValue");
        assert!(!elements[1].indexed());
        assert_eq!(elements[2], Value::boolean(false));

        assert!(ArrayValue::from_raw(json!({}), true).value().unwrap().is_empty());
        assert!(matches!(
            ArrayValue::from_raw(json!({"values": [{"key": "value"}]}), true).value(),
            Err(ModelError::UnrecognizedValueKind { property }) if property == "arrayValue[0]"
        ));
    }

    #[test]
    fn array_equality_is_ordered() {
        let first = Value::array(vec![Value::boolean(true), Value::null()]);
        let second = Value::array(vec![Value::boolean(true), Value::null()]);
        let swapped = Value::array(vec![Value::null(), Value::boolean(true)]);
        assert_eq!(first, second);
        assert_ne!(first, swapped);
    }

    #[test]
    fn geo_point_and_double_wire_forms() {
        let point = GeoPointValue::from_raw(json!({"latitude": 1.23, "longitude": 4.56}), true);
        assert_eq!(*point.value().unwrap(), LatLng::new(1.23, 4.56));
        assert_eq!(
            Value::geo_point(1.23, 4.56).to_wire(),
            json!({"geoPointValue": {"latitude": 1.23, "longitude": 4.56}, "excludeFromIndexes": false})
        );

        assert!(DoubleValue::from_raw(json!("NaN"), true).value().unwrap().is_nan());
        assert_eq!(
            DoubleValue::new(f64::NEG_INFINITY).to_wire()["doubleValue"],
            json!("-Infinity")
        );
        assert_eq!(*DoubleValue::from_raw(json!(1.5), true).value().unwrap(), 1.5);
    }

    #[test]
    fn key_value_delegates_to_key_wire_form() {
        let key = Key::new(
            PartitionId::new("project1"),
            vec![PathElement::with_name("kind1", "name1")],
        )
        .unwrap();
        let value = KeyValue::from_raw(key.to_wire(), false);
        assert_eq!(value.value().unwrap(), &key);
        assert_eq!(
            KeyValue::new(key.clone()).to_wire(),
            json!({"keyValue": key.to_wire(), "excludeFromIndexes": false})
        );
    }

    #[test]
    fn unrecognized_envelope_names_property() {
        let error = Value::from_wire("field1", &json!({"key": "value"})).unwrap_err();
        assert!(matches!(
            &error,
            ModelError::UnrecognizedValueKind { property } if property == "field1"
        ));
        assert!(error.to_string().contains("field1"));

        assert!(matches!(
            Value::from_wire("field2", &json!({"entityValue": {}})),
            Err(ModelError::UnrecognizedValueKind { .. })
        ));
    }

    #[test]
    fn equality_ignores_index_flag() {
        assert_eq!(
            Value::string("str1").unindexed(),
            Value::from_wire("f", &json!({"stringValue": "str1"})).unwrap()
        );
        assert_ne!(Value::string("1"), Value::integer(1));
    }

    #[test]
    fn every_kind_is_registered() {
        for tag in [
            "nullValue",
            "booleanValue",
            "stringValue",
            "integerValue",
            "doubleValue",
            "timestampValue",
            "blobValue",
            "arrayValue",
            "geoPointValue",
            "keyValue",
        ] {
            assert!(VALUE_TYPES.contains_key(tag), "{tag} missing from table");
        }
    }
}
