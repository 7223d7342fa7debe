//! Document-store triggers.
//!
//! Events carry the encoded document in `data.value` and, for updates and
//! deletes, its prior state in `data.oldValue`. Either may be `{}` or absent
//! when the document did not exist on that side.

use serde_json::Value;
use triggerkit_core::legacy::DOCUMENT_SERVICE;
use triggerkit_core::{
    BoxError, Change, CloudFunction, Environment, Event, EventContext, HandlerReturn,
    TriggerDescriptor, TriggerResource,
};
use triggerkit_document::{is_decode_error, Decoder, DocumentSnapshot};
use triggerkit_values::RawDocument;

use crate::errors::ProviderError;

/// Provider prefix of document event types.
pub const PROVIDER: &str = "google.firestore";
/// Database used when none is named.
pub const DEFAULT_DATABASE: &str = "(default)";

/// Document lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// Document created.
    Create,
    /// Existing document changed.
    Update,
    /// Document deleted.
    Delete,
    /// Any of the above.
    Write,
}

impl DocumentEvent {
    /// Event name within the provider, e.g. `document.create`.
    pub fn event_name(self) -> &'static str {
        match self {
            DocumentEvent::Create => "document.create",
            DocumentEvent::Update => "document.update",
            DocumentEvent::Delete => "document.delete",
            DocumentEvent::Write => "document.write",
        }
    }

    /// Deprecated event type still sent by older deployments.
    pub fn legacy_event_type(self) -> String {
        format!("providers/cloud.firestore/eventTypes/{}", self.event_name())
    }
}

/// Descriptor for `event` on documents matching `path`, e.g. `users/{uid}`.
///
/// The project id is read from `env` only when the resource is resolved.
pub fn trigger(event: DocumentEvent, env: &Environment, path: &str) -> TriggerDescriptor {
    let env = env.clone();
    let path = path.trim_matches('/').to_string();
    let resource = TriggerResource::lazy(move || {
        Ok(format!(
            "projects/{}/databases/{DEFAULT_DATABASE}/documents/{path}",
            env.project_id()?
        ))
    });
    TriggerDescriptor::new(PROVIDER, event.event_name(), DOCUMENT_SERVICE, resource)
        .with_legacy_event_type(event.legacy_event_type())
}

fn resource_name(event: &Event) -> Result<&str, ProviderError> {
    event
        .context
        .resource
        .as_ref()
        .map(|resource| resource.name.as_str())
        .ok_or(ProviderError::MissingResource)
}

fn snapshot_at(
    decoder: &Decoder,
    event: &Event,
    key: &str,
) -> Result<DocumentSnapshot, ProviderError> {
    let name = resource_name(event)?;
    let raw = RawDocument::from_json(event.data.get(key).unwrap_or(&Value::Null))?;
    Ok(decoder.snapshot(&raw, name)?)
}

/// Snapshot of the document after the event.
pub fn snapshot_constructor(
    decoder: &Decoder,
    event: &Event,
) -> Result<DocumentSnapshot, ProviderError> {
    snapshot_at(decoder, event, "value")
}

/// Snapshot of the document before the event.
pub fn before_snapshot_constructor(
    decoder: &Decoder,
    event: &Event,
) -> Result<DocumentSnapshot, ProviderError> {
    snapshot_at(decoder, event, "oldValue")
}

/// Before and after snapshots.
pub fn change_constructor(
    decoder: &Decoder,
    event: &Event,
) -> Result<Change<DocumentSnapshot>, ProviderError> {
    Ok(Change::new(
        before_snapshot_constructor(decoder, event)?,
        snapshot_constructor(decoder, event)?,
    ))
}

/// Function receiving the created document.
pub fn on_create<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    decoder: Decoder,
    handler: H,
) -> CloudFunction<DocumentSnapshot, T>
where
    H: Fn(DocumentSnapshot, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    CloudFunction::new(
        name,
        trigger(DocumentEvent::Create, env, path),
        move |event: &Event| snapshot_constructor(&decoder, event).map_err(BoxError::from),
        handler,
    )
    .with_data_errors(is_decode_error)
}

/// Function receiving the deleted document's last state.
pub fn on_delete<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    decoder: Decoder,
    handler: H,
) -> CloudFunction<DocumentSnapshot, T>
where
    H: Fn(DocumentSnapshot, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    CloudFunction::new(
        name,
        trigger(DocumentEvent::Delete, env, path),
        move |event: &Event| before_snapshot_constructor(&decoder, event).map_err(BoxError::from),
        handler,
    )
    .with_data_errors(is_decode_error)
}

/// Function receiving both states of an updated document.
pub fn on_update<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    decoder: Decoder,
    handler: H,
) -> CloudFunction<Change<DocumentSnapshot>, T>
where
    H: Fn(Change<DocumentSnapshot>, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    CloudFunction::new(
        name,
        trigger(DocumentEvent::Update, env, path),
        move |event: &Event| change_constructor(&decoder, event).map_err(BoxError::from),
        handler,
    )
    .with_data_errors(is_decode_error)
}

/// Function receiving both states for any write; one side may not exist.
pub fn on_write<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    decoder: Decoder,
    handler: H,
) -> CloudFunction<Change<DocumentSnapshot>, T>
where
    H: Fn(Change<DocumentSnapshot>, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    CloudFunction::new(
        name,
        trigger(DocumentEvent::Write, env, path),
        move |event: &Event| change_constructor(&decoder, event).map_err(BoxError::from),
        handler,
    )
    .with_data_errors(is_decode_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triggerkit_core::Resource;

    const NAME: &str = "projects/demo/databases/(default)/documents/users/alice";

    fn event(data: Value) -> Event {
        Event {
            data,
            context: EventContext {
                resource: Some(Resource {
                    service: DOCUMENT_SERVICE.into(),
                    name: NAME.into(),
                    ..Resource::default()
                }),
                ..EventContext::default()
            },
        }
    }

    #[test]
    fn resource_is_lazy() {
        let descriptor = trigger(DocumentEvent::Write, &Environment::default(), "users/{uid}");
        assert_eq!(descriptor.event_type(), "google.firestore.document.write");
        assert!(descriptor.metadata().is_err());

        let env = Environment::default().with_project_id("demo");
        let metadata = trigger(DocumentEvent::Create, &env, "/users/{uid}/").metadata().unwrap();
        assert_eq!(
            metadata.resource,
            "projects/demo/databases/(default)/documents/users/{uid}"
        );
        assert_eq!(metadata.service, "firestore.googleapis.com");
    }

    #[test]
    fn deleted_side_is_named_after_resource() {
        let change = change_constructor(
            &Decoder::detached(),
            &event(json!({
                "oldValue": {
                    "name": NAME,
                    "createTime": "2017-06-13T00:58:40.349Z",
                    "fields": {"a": {"integerValue": "1"}}
                },
                "value": {}
            })),
        )
        .unwrap();
        assert!(change.before.exists());
        assert!(!change.after.exists());
        assert_eq!(change.after.id(), "alice");
        assert_eq!(change.after.reference().path(), "users/alice");
    }

    #[test]
    fn missing_value_is_non_existent() {
        let snap = snapshot_constructor(&Decoder::detached(), &event(json!({}))).unwrap();
        assert!(!snap.exists());
    }

    #[test]
    fn missing_resource_is_reported() {
        let mut bare = event(json!({}));
        bare.context.resource = None;
        assert!(matches!(
            snapshot_constructor(&Decoder::detached(), &bare),
            Err(ProviderError::MissingResource)
        ));
    }
}
