//! The wire tagged-value union.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::validation::ValidationError;

/// 64-bit integer as transmitted by the platform.
///
/// Integers arrive either as decimal strings, plain JSON numbers, or a
/// `{low, high}` pair of signed 32-bit halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireInteger {
    /// Decimal text, e.g. `"-42"`.
    Decimal(String),
    /// Plain JSON number.
    Number(i64),
    /// Two's-complement halves.
    Pair {
        /// Low 32 bits.
        low: i32,
        /// High 32 bits.
        high: i32,
    },
}

impl WireInteger {
    /// Normalizes every encoding to an `i64`.
    pub fn to_i64(&self) -> Result<i64, ValidationError> {
        match self {
            WireInteger::Decimal(text) => {
                text.trim()
                    .parse::<i64>()
                    .map_err(|err| ValidationError::InvalidEncoding {
                        field: "integerValue",
                        reason: format!("{text}: {err}"),
                    })
            }
            WireInteger::Number(n) => Ok(*n),
            WireInteger::Pair { low, high } => {
                Ok(((*high as i64) << 32) | (*low as u32 as i64))
            }
        }
    }
}

/// Latitude/longitude exactly as shipped (unvalidated).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WireGeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// One node of the wire value union. Exactly one variant per node.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedValue {
    /// `nullValue`
    Null,
    /// `booleanValue`
    Boolean(bool),
    /// `integerValue`
    Integer(WireInteger),
    /// `doubleValue`
    Double(f64),
    /// `timestampValue` (RFC 3339 text, parsed by the decoder).
    Timestamp(String),
    /// `stringValue`
    String(String),
    /// `bytesValue` (base64 text, decoded by the decoder).
    Bytes(String),
    /// `referenceValue` (fully qualified document name).
    Reference(String),
    /// `geoPointValue`
    GeoPoint(WireGeoPoint),
    /// `arrayValue.values`
    Array(Vec<TaggedValue>),
    /// `mapValue.fields`
    Map(BTreeMap<String, TaggedValue>),
    /// A node carrying none of the known tags. Kept verbatim so the decoder
    /// can report it.
    Unrecognized(Value),
}

impl TaggedValue {
    /// Reads one node from its JSON transport form.
    ///
    /// Absence of every known tag is not an error here; it yields
    /// [`TaggedValue::Unrecognized`] and is rejected at decode time.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let Some(obj) = value.as_object() else {
            return Ok(TaggedValue::Unrecognized(value.clone()));
        };

        if obj.contains_key("nullValue") {
            return Ok(TaggedValue::Null);
        }
        if let Some(raw) = obj.get("booleanValue") {
            return raw
                .as_bool()
                .map(TaggedValue::Boolean)
                .ok_or_else(|| mismatch("booleanValue", raw));
        }
        if let Some(raw) = obj.get("integerValue") {
            return parse_integer(raw).map(TaggedValue::Integer);
        }
        if let Some(raw) = obj.get("doubleValue") {
            return parse_double(raw).map(TaggedValue::Double);
        }
        if let Some(raw) = obj.get("timestampValue") {
            return string_tag("timestampValue", raw).map(TaggedValue::Timestamp);
        }
        if let Some(raw) = obj.get("stringValue") {
            return string_tag("stringValue", raw).map(TaggedValue::String);
        }
        if let Some(raw) = obj.get("bytesValue") {
            return string_tag("bytesValue", raw).map(TaggedValue::Bytes);
        }
        if let Some(raw) = obj.get("referenceValue") {
            return string_tag("referenceValue", raw).map(TaggedValue::Reference);
        }
        if let Some(raw) = obj.get("geoPointValue") {
            if !raw.is_object() {
                return Err(mismatch("geoPointValue", raw));
            }
            // Zero coordinates are omitted by the JSON transport.
            let coordinate = |key: &str| raw.get(key).and_then(Value::as_f64).unwrap_or(0.0);
            return Ok(TaggedValue::GeoPoint(WireGeoPoint {
                latitude: coordinate("latitude"),
                longitude: coordinate("longitude"),
            }));
        }
        if let Some(raw) = obj.get("arrayValue") {
            let values = match raw.get("values") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(TaggedValue::from_json)
                    .collect::<Result<Vec<_>, _>>()?,
                Some(other) => return Err(mismatch("arrayValue", other)),
                None => Vec::new(),
            };
            return Ok(TaggedValue::Array(values));
        }
        if let Some(raw) = obj.get("mapValue") {
            let fields = match raw.get("fields") {
                Some(Value::Object(fields)) => fields_from_json(fields)?,
                Some(other) => return Err(mismatch("mapValue", other)),
                None => BTreeMap::new(),
            };
            return Ok(TaggedValue::Map(fields));
        }

        Ok(TaggedValue::Unrecognized(value.clone()))
    }

    /// Wire tag name for this node, or `None` when unrecognized.
    pub fn tag(&self) -> Option<&'static str> {
        Some(match self {
            TaggedValue::Null => "nullValue",
            TaggedValue::Boolean(_) => "booleanValue",
            TaggedValue::Integer(_) => "integerValue",
            TaggedValue::Double(_) => "doubleValue",
            TaggedValue::Timestamp(_) => "timestampValue",
            TaggedValue::String(_) => "stringValue",
            TaggedValue::Bytes(_) => "bytesValue",
            TaggedValue::Reference(_) => "referenceValue",
            TaggedValue::GeoPoint(_) => "geoPointValue",
            TaggedValue::Array(_) => "arrayValue",
            TaggedValue::Map(_) => "mapValue",
            TaggedValue::Unrecognized(_) => return None,
        })
    }
}

/// Reads a `fields` object into tagged values.
pub fn fields_from_json(
    fields: &Map<String, Value>,
) -> Result<BTreeMap<String, TaggedValue>, ValidationError> {
    fields
        .iter()
        .map(|(key, raw)| TaggedValue::from_json(raw).map(|v| (key.clone(), v)))
        .collect()
}

impl<'de> Deserialize<'de> for TaggedValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        TaggedValue::from_json(&raw).map_err(serde::de::Error::custom)
    }
}

fn mismatch(field: &'static str, raw: &Value) -> ValidationError {
    ValidationError::PatternMismatch {
        field,
        value: raw.to_string(),
    }
}

fn string_tag(field: &'static str, raw: &Value) -> Result<String, ValidationError> {
    raw.as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch(field, raw))
}

fn parse_integer(raw: &Value) -> Result<WireInteger, ValidationError> {
    match raw {
        Value::String(text) => Ok(WireInteger::Decimal(text.clone())),
        Value::Number(n) => n
            .as_i64()
            .map(WireInteger::Number)
            .ok_or_else(|| mismatch("integerValue", raw)),
        Value::Object(pair) => {
            let half = |key: &str| {
                pair.get(key)
                    .and_then(Value::as_i64)
                    .and_then(|v| i32::try_from(v).ok())
            };
            match (half("low"), half("high")) {
                (Some(low), Some(high)) => Ok(WireInteger::Pair { low, high }),
                _ => Err(mismatch("integerValue", raw)),
            }
        }
        _ => Err(mismatch("integerValue", raw)),
    }
}

fn parse_double(raw: &Value) -> Result<f64, ValidationError> {
    match raw {
        Value::Number(n) => n.as_f64().ok_or_else(|| mismatch("doubleValue", raw)),
        Value::String(text) => match text.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => other.parse::<f64>().map_err(|_| mismatch("doubleValue", raw)),
        },
        _ => Err(mismatch("doubleValue", raw)),
    }
}
