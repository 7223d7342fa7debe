use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::tagged::TaggedValue;
use crate::validation::ValidationError;

/// Document payload as carried in `data.value` / `data.oldValue`.
///
/// Every member is optional: a fully deleted document arrives as `{}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    /// Fully qualified document name.
    #[serde(default)]
    pub name: Option<String>,
    /// Encoded field map.
    #[serde(default)]
    pub fields: BTreeMap<String, TaggedValue>,
    /// Creation time; present iff the document exists.
    #[serde(default)]
    pub create_time: Option<String>,
    /// Last update time.
    #[serde(default)]
    pub update_time: Option<String>,
    /// Time the payload was read.
    #[serde(default)]
    pub read_time: Option<String>,
}

impl RawDocument {
    /// Reads a payload from JSON. `null` is treated like `{}`.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        RawDocument::deserialize(value).map_err(|err| ValidationError::InvalidEncoding {
            field: "document",
            reason: err.to_string(),
        })
    }

    /// True when the payload carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.fields.is_empty()
            && self.create_time.is_none()
            && self.update_time.is_none()
            && self.read_time.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_payload_is_empty() {
        assert!(RawDocument::from_json(&json!({})).unwrap().is_empty());
        assert!(RawDocument::from_json(&Value::Null).unwrap().is_empty());
    }

    #[test]
    fn reads_camel_case_members() {
        let raw = RawDocument::from_json(&json!({
            "name": "projects/p/databases/(default)/documents/a/b",
            "fields": {"n": {"integerValue": "1"}},
            "createTime": "2017-06-13T00:58:40.349Z",
            "updateTime": "2017-06-13T00:58:40.349Z"
        }))
        .unwrap();
        assert!(!raw.is_empty());
        assert_eq!(raw.create_time.as_deref(), Some("2017-06-13T00:58:40.349Z"));
        assert_eq!(raw.fields.len(), 1);
    }
}
