//! Document snapshots built from wire payloads.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::{Map, Value};
use triggerkit_values::{DocumentName, RawDocument, TaggedValue, Timestamp};

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::field_path::FieldPath;
use crate::reference::DocumentReference;
use crate::value::{fields_to_json, DocumentValue};

/// Read-only view of one document at one point in time.
///
/// Field data is decoded on first access and cached; the reference proxy is
/// likewise built once. A snapshot over an empty payload reports
/// `exists() == false` but still carries the name it was built for.
#[derive(Debug)]
pub struct DocumentSnapshot {
    name: DocumentName,
    fields: BTreeMap<String, TaggedValue>,
    create_time: Option<Timestamp>,
    update_time: Option<Timestamp>,
    read_time: Option<Timestamp>,
    decoder: Decoder,
    data: OnceLock<Result<BTreeMap<String, DocumentValue>, DecodeError>>,
    reference: OnceLock<DocumentReference>,
}

impl DocumentSnapshot {
    pub(crate) fn build(
        raw: &RawDocument,
        fallback_name: &str,
        decoder: &Decoder,
    ) -> Result<Self, DecodeError> {
        let name = raw.name.as_deref().unwrap_or(fallback_name);
        Ok(Self {
            name: DocumentName::new(name),
            fields: raw.fields.clone(),
            create_time: parse_time(raw.create_time.as_deref())?,
            update_time: parse_time(raw.update_time.as_deref())?,
            read_time: parse_time(raw.read_time.as_deref())?,
            decoder: decoder.clone(),
            data: OnceLock::new(),
            reference: OnceLock::new(),
        })
    }

    /// Whether the document existed; keyed off the creation time.
    pub fn exists(&self) -> bool {
        self.create_time.is_some()
    }

    /// Document id.
    pub fn id(&self) -> &str {
        self.name.id()
    }

    /// Full resource name.
    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    /// Proxy reference for this document; built on first call, backend untouched.
    pub fn reference(&self) -> &DocumentReference {
        self.reference
            .get_or_init(|| self.decoder.reference(self.name.clone()))
    }

    /// Creation time, when the document existed.
    pub fn create_time(&self) -> Option<Timestamp> {
        self.create_time
    }

    /// Last update time, when the document existed.
    pub fn update_time(&self) -> Option<Timestamp> {
        self.update_time
    }

    /// Time the snapshot was read.
    ///
    /// Falls back to the update time and then to the current time; the
    /// second fallback is logged because the payload was incomplete.
    pub fn read_time(&self) -> Timestamp {
        if let Some(read) = self.read_time.or(self.update_time) {
            return read;
        }
        tracing::warn!(name = %self.name, "snapshot has no read time; using current time");
        Timestamp::now()
    }

    /// Decoded field map, or `None` when the document does not exist.
    ///
    /// An existing document without fields yields an empty map.
    pub fn data(&self) -> Result<Option<&BTreeMap<String, DocumentValue>>, DecodeError> {
        if !self.exists() {
            return Ok(None);
        }
        match self
            .data
            .get_or_init(|| self.decoder.decode_fields(&self.fields))
        {
            Ok(data) => Ok(Some(data)),
            Err(err) => Err(err.clone()),
        }
    }

    /// Decoded value at `path`, or `None` when absent.
    pub fn get(&self, path: impl Into<FieldPath>) -> Result<Option<&DocumentValue>, DecodeError> {
        let path = path.into();
        let Some(data) = self.data()? else {
            return Ok(None);
        };
        let Some((first, rest)) = path.segments().split_first() else {
            return Ok(None);
        };
        Ok(data.get(first).and_then(|value| value.get_path(rest)))
    }

    /// JSON rendering of the snapshot: name, existence, times and data.
    pub fn to_json(&self) -> Result<Value, DecodeError> {
        let mut map = Map::new();
        map.insert("name".into(), Value::String(self.name.to_string()));
        map.insert("id".into(), Value::String(self.id().to_string()));
        map.insert("exists".into(), Value::Bool(self.exists()));
        map.insert("createTime".into(), time_json(self.create_time));
        map.insert("updateTime".into(), time_json(self.update_time));
        map.insert("readTime".into(), time_json(self.read_time.or(self.update_time)));
        let data = self
            .data()?
            .map_or(Value::Null, |data| Value::Object(fields_to_json(data)));
        map.insert("data".into(), data);
        Ok(Value::Object(map))
    }
}

fn parse_time(value: Option<&str>) -> Result<Option<Timestamp>, DecodeError> {
    Ok(value.map(Timestamp::parse).transpose()?)
}

fn time_json(value: Option<Timestamp>) -> Value {
    value.map_or(Value::Null, |ts| Value::String(ts.to_rfc3339()))
}
