//! Typed value decoding.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine;
use triggerkit_values::{
    DocumentName, GeoPoint, RawDocument, TaggedValue, Timestamp, ValidationError, WireGeoPoint,
    WireInteger,
};

use crate::backend::{DetachedBackend, DocumentBackend};
use crate::error::DecodeError;
use crate::reference::DocumentReference;
use crate::snapshot::DocumentSnapshot;
use crate::value::DocumentValue;

/// Decoder bound to the backend that decoded references will resolve against.
///
/// Construct one per process and pass it to whichever component decodes
/// payloads; cloning is cheap.
#[derive(Debug, Clone)]
pub struct Decoder {
    backend: Arc<dyn DocumentBackend>,
}

impl Decoder {
    /// Creates a decoder whose references open handles through `backend`.
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Decoder whose references cannot reach a store.
    pub fn detached() -> Self {
        Self::new(Arc::new(DetachedBackend))
    }

    /// Decodes one wire node.
    ///
    /// Fails with [`DecodeError::UnknownVariant`] for a node that carries no
    /// known tag; an explicit `nullValue` decodes to [`DocumentValue::Null`].
    pub fn decode(&self, value: &TaggedValue) -> Result<DocumentValue, DecodeError> {
        Ok(match value {
            TaggedValue::Null => DocumentValue::Null,
            TaggedValue::Boolean(b) => DocumentValue::Boolean(*b),
            TaggedValue::Integer(i) => DocumentValue::Integer(i.to_i64()?),
            TaggedValue::Double(d) => DocumentValue::Double(*d),
            TaggedValue::Timestamp(text) => DocumentValue::Timestamp(Timestamp::parse(text)?),
            TaggedValue::String(s) => DocumentValue::String(s.clone()),
            TaggedValue::Bytes(text) => DocumentValue::Bytes(decode_base64(text)?),
            TaggedValue::Reference(name) => {
                DocumentValue::Reference(self.reference(DocumentName::new(name.as_str())))
            }
            TaggedValue::GeoPoint(point) => {
                DocumentValue::GeoPoint(GeoPoint::new(point.latitude, point.longitude)?)
            }
            TaggedValue::Array(items) => DocumentValue::Array(
                items
                    .iter()
                    .map(|item| self.decode(item))
                    .collect::<Result<_, _>>()?,
            ),
            TaggedValue::Map(fields) => DocumentValue::Map(self.decode_fields(fields)?),
            TaggedValue::Unrecognized(raw) => {
                return Err(DecodeError::UnknownVariant(raw.to_string()))
            }
        })
    }

    /// Decodes a whole field map.
    pub fn decode_fields(
        &self,
        fields: &BTreeMap<String, TaggedValue>,
    ) -> Result<BTreeMap<String, DocumentValue>, DecodeError> {
        fields
            .iter()
            .map(|(key, value)| self.decode(value).map(|v| (key.clone(), v)))
            .collect()
    }

    /// Encodes a decoded value back into its wire form.
    pub fn encode(&self, value: &DocumentValue) -> TaggedValue {
        match value {
            DocumentValue::Null => TaggedValue::Null,
            DocumentValue::Boolean(b) => TaggedValue::Boolean(*b),
            DocumentValue::Integer(i) => TaggedValue::Integer(WireInteger::Decimal(i.to_string())),
            DocumentValue::Double(d) => TaggedValue::Double(*d),
            DocumentValue::Timestamp(ts) => TaggedValue::Timestamp(ts.to_rfc3339()),
            DocumentValue::String(s) => TaggedValue::String(s.clone()),
            DocumentValue::Bytes(bytes) => {
                TaggedValue::Bytes(base64::engine::general_purpose::STANDARD.encode(bytes))
            }
            DocumentValue::Reference(reference) => {
                TaggedValue::Reference(reference.name().to_string())
            }
            DocumentValue::GeoPoint(point) => TaggedValue::GeoPoint(WireGeoPoint {
                latitude: point.latitude,
                longitude: point.longitude,
            }),
            DocumentValue::Array(items) => {
                TaggedValue::Array(items.iter().map(|item| self.encode(item)).collect())
            }
            DocumentValue::Map(fields) => TaggedValue::Map(self.encode_fields(fields)),
        }
    }

    /// Encodes a whole field map.
    pub fn encode_fields(
        &self,
        fields: &BTreeMap<String, DocumentValue>,
    ) -> BTreeMap<String, TaggedValue> {
        fields
            .iter()
            .map(|(key, value)| (key.clone(), self.encode(value)))
            .collect()
    }

    /// Proxy reference for `name`. No backend call is made.
    pub fn reference(&self, name: DocumentName) -> DocumentReference {
        DocumentReference::new(name, self.clone())
    }

    /// Snapshot over `raw`, named `fallback_name` when the payload has no name.
    pub fn snapshot(
        &self,
        raw: &RawDocument,
        fallback_name: &str,
    ) -> Result<DocumentSnapshot, DecodeError> {
        DocumentSnapshot::build(raw, fallback_name, self)
    }

    pub(crate) fn backend(&self) -> &Arc<dyn DocumentBackend> {
        &self.backend
    }
}

fn decode_base64(text: &str) -> Result<Vec<u8>, ValidationError> {
    base64::engine::general_purpose::STANDARD
        .decode(text)
        .map_err(|err| ValidationError::InvalidEncoding {
            field: "bytesValue",
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode_json(raw: serde_json::Value) -> Result<DocumentValue, DecodeError> {
        Decoder::detached().decode(&TaggedValue::from_json(&raw).unwrap())
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(decode_json(json!({"nullValue": null})).unwrap(), DocumentValue::Null);
        assert_eq!(
            decode_json(json!({"booleanValue": false})).unwrap(),
            DocumentValue::Boolean(false)
        );
        assert_eq!(
            decode_json(json!({"doubleValue": 0.5})).unwrap(),
            DocumentValue::Double(0.5)
        );
        assert_eq!(
            decode_json(json!({"stringValue": ""})).unwrap(),
            DocumentValue::String(String::new())
        );
    }

    #[test]
    fn integers_normalize_to_i64() {
        assert_eq!(
            decode_json(json!({"integerValue": "-17"})).unwrap(),
            DocumentValue::Integer(-17)
        );
        assert_eq!(
            decode_json(json!({"integerValue": {"low": 1, "high": 1}})).unwrap(),
            DocumentValue::Integer(4_294_967_297)
        );
    }

    #[test]
    fn timestamps_decode_to_seconds_and_nanos() {
        let value = decode_json(json!({"timestampValue": "2017-06-13T00:58:40.349Z"})).unwrap();
        assert_eq!(
            value,
            DocumentValue::Timestamp(Timestamp::new(1497315520, 349000000).unwrap())
        );
    }

    #[test]
    fn bytes_decode_from_base64() {
        assert_eq!(
            decode_json(json!({"bytesValue": "AQID"})).unwrap(),
            DocumentValue::Bytes(vec![1, 2, 3])
        );
        assert!(matches!(
            decode_json(json!({"bytesValue": "***"})),
            Err(DecodeError::Validation(_))
        ));
    }

    #[test]
    fn references_become_proxies() {
        let value = decode_json(json!({
            "referenceValue": "projects/p/databases/(default)/documents/states/ca"
        }))
        .unwrap();
        let DocumentValue::Reference(reference) = value else {
            panic!("expected reference");
        };
        assert_eq!(reference.path(), "states/ca");
        assert_eq!(reference.id(), "ca");
    }

    #[test]
    fn geo_points_compare_by_both_components() {
        let value = decode_json(json!({"geoPointValue": {"latitude": 1.5, "longitude": -2.5}}))
            .unwrap();
        let DocumentValue::GeoPoint(point) = value else {
            panic!("expected geo point");
        };
        assert!(point.is_equal(&GeoPoint::new(1.5, -2.5).unwrap()));
    }

    #[test]
    fn containers_decode_recursively() {
        let value = decode_json(json!({"mapValue": {"fields": {
            "list": {"arrayValue": {"values": [{"integerValue": "1"}, {"mapValue": {}}]}}
        }}}))
        .unwrap();
        assert_eq!(
            value.to_json(),
            json!({"list": [1, {}]})
        );
    }

    #[test]
    fn untagged_node_is_a_decode_error_not_null() {
        let err = decode_json(json!({"somethingElse": true})).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownVariant(_)));

        let nested = decode_json(json!({"arrayValue": {"values": [{}]}})).unwrap_err();
        assert!(matches!(nested, DecodeError::UnknownVariant(_)));
    }

    #[test]
    fn encode_restores_wire_tags() {
        let decoder = Decoder::detached();
        let original = TaggedValue::from_json(&json!({"mapValue": {"fields": {
            "when": {"timestampValue": "2017-06-13T00:58:40.349Z"},
            "n": {"integerValue": "5"}
        }}}))
        .unwrap();
        let decoded = decoder.decode(&original).unwrap();
        assert_eq!(decoder.encode(&decoded), original);
    }
}
