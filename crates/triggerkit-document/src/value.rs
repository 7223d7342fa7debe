//! Decoded document values.

use std::collections::BTreeMap;

use base64::Engine;
use serde_json::{Map, Number, Value};
use triggerkit_values::{GeoPoint, Timestamp};

use crate::reference::DocumentReference;

/// Plain value produced by decoding one wire node.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentValue {
    /// Explicit null.
    Null,
    /// Boolean.
    Boolean(bool),
    /// 64-bit integer.
    Integer(i64),
    /// Double.
    Double(f64),
    /// Seconds + nanos.
    Timestamp(Timestamp),
    /// UTF-8 string.
    String(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Lazy reference to another document.
    Reference(DocumentReference),
    /// Geographic point.
    GeoPoint(GeoPoint),
    /// Ordered list.
    Array(Vec<DocumentValue>),
    /// String-keyed map.
    Map(BTreeMap<String, DocumentValue>),
}

impl DocumentValue {
    /// Nested value at `segments`, descending through maps only.
    pub fn get_path<S: AsRef<str>>(&self, segments: &[S]) -> Option<&DocumentValue> {
        segments.iter().try_fold(self, |node, segment| match node {
            DocumentValue::Map(fields) => fields.get(segment.as_ref()),
            _ => None,
        })
    }

    /// JSON rendering for logs and tooling.
    ///
    /// Timestamps become RFC 3339 text, bytes become base64, references become
    /// their full name and non-finite doubles become their textual name.
    pub fn to_json(&self) -> Value {
        match self {
            DocumentValue::Null => Value::Null,
            DocumentValue::Boolean(b) => Value::Bool(*b),
            DocumentValue::Integer(i) => Value::Number((*i).into()),
            DocumentValue::Double(d) => match Number::from_f64(*d) {
                Some(n) => Value::Number(n),
                None => Value::String(non_finite_name(*d).to_string()),
            },
            DocumentValue::Timestamp(ts) => Value::String(ts.to_rfc3339()),
            DocumentValue::String(s) => Value::String(s.clone()),
            DocumentValue::Bytes(bytes) => {
                Value::String(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            DocumentValue::Reference(reference) => Value::String(reference.name().to_string()),
            DocumentValue::GeoPoint(point) => {
                let mut map = Map::new();
                map.insert("latitude".into(), float(point.latitude));
                map.insert("longitude".into(), float(point.longitude));
                Value::Object(map)
            }
            DocumentValue::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            DocumentValue::Map(fields) => Value::Object(fields_to_json(fields)),
        }
    }
}

/// Renders a decoded field map as a JSON object.
pub fn fields_to_json(fields: &BTreeMap<String, DocumentValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect()
}

fn float(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn non_finite_name(value: f64) -> &'static str {
    if value.is_nan() {
        "NaN"
    } else if value.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    }
}
