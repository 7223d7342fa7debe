//! Detection of the two supported wire envelope shapes.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::CoreError;
use crate::event::{EventContext, Resource};
use crate::legacy;
use crate::trigger::TriggerDescriptor;

/// A raw invocation as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum WireEnvelope {
    /// `{ data, context: {...} }`
    Current {
        /// Payload.
        data: Value,
        /// Context members.
        context: Map<String, Value>,
    },
    /// Flat object: payload in `data`, every other member is context.
    Legacy {
        /// Payload.
        data: Value,
        /// Remaining top-level members.
        fields: Map<String, Value>,
    },
}

/// Envelope after shape reconciliation, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledEnvelope {
    /// Payload.
    pub data: Value,
    /// Context with canonical event type and structured resource.
    pub context: EventContext,
    /// Raw auth claim, consumed by classification.
    pub auth_claim: Option<Value>,
    /// True when the caller supplied `params` itself.
    pub params_supplied: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireContext {
    #[serde(default)]
    event_id: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default)]
    event_type: String,
    #[serde(default)]
    resource: Option<WireResource>,
    #[serde(default)]
    params: Option<BTreeMap<String, String>>,
    #[serde(default)]
    auth: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResource {
    Name(String),
    Structured(Resource),
}

impl WireEnvelope {
    /// Classifies a raw JSON envelope by the presence of a `context` object.
    pub fn from_json(raw: Value) -> Result<Self, CoreError> {
        let Value::Object(mut obj) = raw else {
            return Err(CoreError::InvalidEnvelope(format!(
                "expected a JSON object, got {}",
                json_kind(&raw)
            )));
        };
        let data = obj.remove("data").unwrap_or(Value::Null);

        match obj.remove("context") {
            Some(Value::Object(context)) => Ok(WireEnvelope::Current { data, context }),
            Some(other) => Err(CoreError::InvalidEnvelope(format!(
                "context must be an object, got {}",
                json_kind(&other)
            ))),
            None => Ok(WireEnvelope::Legacy { data, fields: obj }),
        }
    }

    /// Short name of the detected shape.
    pub fn shape(&self) -> &'static str {
        match self {
            WireEnvelope::Current { .. } => "current",
            WireEnvelope::Legacy { .. } => "legacy",
        }
    }

    /// Rewrites deprecated event types and lifts flat resource strings.
    pub fn reconcile(self, trigger: &TriggerDescriptor) -> Result<ReconciledEnvelope, CoreError> {
        let (data, members) = match self {
            WireEnvelope::Current { data, context } => (data, context),
            WireEnvelope::Legacy { data, fields } => (data, fields),
        };
        let wire: WireContext = serde_json::from_value(Value::Object(members))?;

        let mut service = trigger.service.clone();
        let mut event_type = wire.event_type;
        if trigger.legacy_event_type.as_deref() == Some(event_type.as_str()) {
            event_type = trigger.event_type();
        } else if let Some((canonical, legacy_service)) = legacy::canonical_event_type(&event_type)
        {
            event_type = canonical.to_string();
            service = legacy_service.to_string();
        }

        let resource = wire.resource.map(|resource| match resource {
            WireResource::Name(name) => Resource {
                service,
                name,
                kind: None,
                labels: None,
            },
            WireResource::Structured(resource) => resource,
        });

        let params_supplied = wire.params.is_some();
        let context = EventContext {
            event_id: wire.event_id,
            timestamp: wire.timestamp,
            event_type,
            resource,
            params: wire.params.unwrap_or_default(),
            auth_type: None,
            auth: Default::default(),
        };

        Ok(ReconciledEnvelope {
            data,
            context,
            auth_claim: wire.auth,
            params_supplied,
        })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trigger::TriggerResource;
    use serde_json::json;

    fn document_trigger() -> TriggerDescriptor {
        TriggerDescriptor::new(
            "google.firestore",
            "document.write",
            legacy::DOCUMENT_SERVICE,
            TriggerResource::fixed("projects/p/databases/(default)/documents/users/{uid}"),
        )
    }

    #[test]
    fn context_member_selects_current_shape() {
        let envelope = WireEnvelope::from_json(json!({
            "data": {"a": 1},
            "context": {"eventId": "1"}
        }))
        .unwrap();
        assert_eq!(envelope.shape(), "current");
    }

    #[test]
    fn flat_object_is_legacy_and_drops_data_from_context() {
        let envelope = WireEnvelope::from_json(json!({
            "data": {"a": 1},
            "eventId": "1",
            "eventType": "providers/cloud.firestore/eventTypes/document.write",
            "resource": "projects/p/databases/(default)/documents/users/alice"
        }))
        .unwrap();
        assert_eq!(envelope.shape(), "legacy");

        let reconciled = envelope.reconcile(&document_trigger()).unwrap();
        assert_eq!(reconciled.data, json!({"a": 1}));
        assert_eq!(reconciled.context.event_type, "google.firestore.document.write");
        assert_eq!(
            reconciled.context.resource,
            Some(Resource {
                service: "firestore.googleapis.com".into(),
                name: "projects/p/databases/(default)/documents/users/alice".into(),
                kind: None,
                labels: None,
            })
        );
    }

    #[test]
    fn trigger_alias_rewrites_to_trigger_type() {
        let trigger = TriggerDescriptor::new(
            "custom.provider",
            "thing.happen",
            "custom.example.com",
            TriggerResource::fixed("things/{id}"),
        )
        .with_legacy_event_type("providers/custom/eventTypes/thing.happen");
        let reconciled = WireEnvelope::from_json(json!({
            "eventType": "providers/custom/eventTypes/thing.happen",
            "resource": "things/7"
        }))
        .unwrap()
        .reconcile(&trigger)
        .unwrap();
        assert_eq!(reconciled.context.event_type, "custom.provider.thing.happen");
        assert_eq!(
            reconciled.context.resource.unwrap().service,
            "custom.example.com"
        );
    }

    #[test]
    fn structured_resource_is_kept() {
        let reconciled = WireEnvelope::from_json(json!({
            "data": null,
            "context": {
                "eventType": "google.firestore.document.write",
                "resource": {"service": "s", "name": "n", "type": "t"},
                "params": {"uid": "preset"}
            }
        }))
        .unwrap()
        .reconcile(&document_trigger())
        .unwrap();
        let resource = reconciled.context.resource.unwrap();
        assert_eq!(resource.kind.as_deref(), Some("t"));
        assert!(reconciled.params_supplied);
        assert_eq!(reconciled.context.params["uid"], "preset");
    }

    #[test]
    fn non_object_envelopes_are_rejected() {
        assert!(matches!(
            WireEnvelope::from_json(json!([1, 2])),
            Err(CoreError::InvalidEnvelope(_))
        ));
        assert!(WireEnvelope::from_json(json!({"context": "nope"})).is_err());
    }
}
