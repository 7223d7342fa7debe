//! Hierarchical-store triggers.
//!
//! Events carry the node as it was in `data.data` and the sparse change in
//! `data.delta`. These triggers carry an end-user auth claim, so their
//! contexts are classified as admin, user or unauthenticated.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use triggerkit_core::legacy::DATABASE_SERVICE;
use triggerkit_core::{
    BoxError, Change, CloudFunction, CoreError, Environment, Event, EventContext, HandlerReturn,
    TriggerDescriptor, TriggerResource,
};
use triggerkit_tree::{DatabaseResource, DeltaSnapshot};

use crate::errors::ProviderError;

/// Provider prefix of database event types.
pub const PROVIDER: &str = "google.firebase.database";

fn namespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[?&]ns=([^&]+)").expect("invalid regex"))
}

fn host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://([^./]+)\.").expect("invalid regex"))
}

/// Node lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEvent {
    /// Node created.
    Create,
    /// Existing node changed.
    Update,
    /// Node deleted.
    Delete,
    /// Any of the above.
    Write,
}

impl DatabaseEvent {
    /// Event name within the provider, e.g. `ref.write`.
    pub fn event_name(self) -> &'static str {
        match self {
            DatabaseEvent::Create => "ref.create",
            DatabaseEvent::Update => "ref.update",
            DatabaseEvent::Delete => "ref.delete",
            DatabaseEvent::Write => "ref.write",
        }
    }

    /// Deprecated event type still sent by older deployments.
    pub fn legacy_event_type(self) -> String {
        format!(
            "providers/google.firebase.database/eventTypes/{}",
            self.event_name()
        )
    }
}

/// Instance name encoded in a database URL.
///
/// Accepts `https://{instance}.firebaseio.com` and emulator URLs carrying
/// `?ns={instance}`.
pub fn instance_from_url(url: &str) -> Result<String, CoreError> {
    namespace_regex()
        .captures(url)
        .or_else(|| host_regex().captures(url))
        .map(|caps| caps[1].to_string())
        .ok_or_else(|| CoreError::InvalidEnvironment {
            var: "databaseURL",
            reason: format!("cannot find instance name in {url}"),
        })
}

/// Descriptor for `event` on nodes matching `path`, e.g. `/rooms/{room}`.
///
/// Without an explicit `instance` the default instance is derived from the
/// configured database URL, only when the resource is resolved.
pub fn trigger(
    event: DatabaseEvent,
    env: &Environment,
    instance: Option<&str>,
    path: &str,
) -> TriggerDescriptor {
    let env = env.clone();
    let instance = instance.map(str::to_string);
    let path = path.trim_matches('/').to_string();
    let resource = TriggerResource::lazy(move || {
        let instance = match &instance {
            Some(instance) => instance.clone(),
            None => instance_from_url(env.database_url()?)?,
        };
        Ok(format!("projects/_/instances/{instance}/refs/{path}"))
    });
    TriggerDescriptor::new(PROVIDER, event.event_name(), DATABASE_SERVICE, resource)
        .with_legacy_event_type(event.legacy_event_type())
        .with_identity_scoped_auth()
}

/// Snapshot over the event's node, current side selected.
///
/// An optional `data.fieldMask` marks `data.data` as sparse.
pub fn snapshot_constructor(
    env: &Environment,
    event: &Event,
) -> Result<DeltaSnapshot, ProviderError> {
    let name = event
        .context
        .resource
        .as_ref()
        .map(|resource| resource.name.as_str())
        .ok_or(ProviderError::MissingResource)?;
    let resource = DatabaseResource::parse(name)?;

    let before = event.data.get("data").cloned().unwrap_or(Value::Null);
    let delta = event.data.get("delta").cloned();
    let field_mask = event.data.get("fieldMask").and_then(Value::as_str);

    let url = resource.instance_url(env.database_emulator_host());
    tracing::debug!(
        instance = resource.instance(),
        path = resource.path(),
        sparse = field_mask.is_some(),
        "building delta snapshot"
    );
    Ok(
        DeltaSnapshot::with_field_mask(before, delta, resource.path(), field_mask)
            .with_instance_url(url),
    )
}

/// Before and after views of the event's node.
pub fn change_constructor(
    env: &Environment,
    event: &Event,
) -> Result<Change<DeltaSnapshot>, ProviderError> {
    Ok(snapshot_constructor(env, event)?.into_change())
}

/// Function receiving the created node.
pub fn on_create<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    handler: H,
) -> CloudFunction<DeltaSnapshot, T>
where
    H: Fn(DeltaSnapshot, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    let data_env = env.clone();
    CloudFunction::new(
        name,
        trigger(DatabaseEvent::Create, env, None, path),
        move |event: &Event| {
            snapshot_constructor(&data_env, event)
                .map(|snapshot| snapshot.current().clone())
                .map_err(BoxError::from)
        },
        handler,
    )
}

/// Function receiving the deleted node's last state.
pub fn on_delete<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    handler: H,
) -> CloudFunction<DeltaSnapshot, T>
where
    H: Fn(DeltaSnapshot, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    let data_env = env.clone();
    CloudFunction::new(
        name,
        trigger(DatabaseEvent::Delete, env, None, path),
        move |event: &Event| {
            snapshot_constructor(&data_env, event)
                .map(|snapshot| snapshot.previous().clone())
                .map_err(BoxError::from)
        },
        handler,
    )
}

/// Function receiving both states of an updated node.
pub fn on_update<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    handler: H,
) -> CloudFunction<Change<DeltaSnapshot>, T>
where
    H: Fn(Change<DeltaSnapshot>, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    let data_env = env.clone();
    CloudFunction::new(
        name,
        trigger(DatabaseEvent::Update, env, None, path),
        move |event: &Event| change_constructor(&data_env, event).map_err(BoxError::from),
        handler,
    )
}

/// Function receiving both states for any write.
pub fn on_write<T, H>(
    name: impl Into<String>,
    env: &Environment,
    path: &str,
    handler: H,
) -> CloudFunction<Change<DeltaSnapshot>, T>
where
    H: Fn(Change<DeltaSnapshot>, EventContext) -> Result<HandlerReturn<T>, BoxError>
        + Send
        + Sync
        + 'static,
{
    let data_env = env.clone();
    CloudFunction::new(
        name,
        trigger(DatabaseEvent::Write, env, None, path),
        move |event: &Event| change_constructor(&data_env, event).map_err(BoxError::from),
        handler,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triggerkit_core::Resource;

    fn event(data: Value) -> Event {
        Event {
            data,
            context: EventContext {
                resource: Some(Resource {
                    service: DATABASE_SERVICE.into(),
                    name: "projects/_/instances/chat/refs/rooms/lobby".into(),
                    ..Resource::default()
                }),
                ..EventContext::default()
            },
        }
    }

    #[test]
    fn instance_names_from_urls() {
        assert_eq!(instance_from_url("https://chat.firebaseio.com").unwrap(), "chat");
        assert_eq!(
            instance_from_url("http://localhost:9000/?ns=chat-dev").unwrap(),
            "chat-dev"
        );
        assert!(instance_from_url("not a url").is_err());
    }

    #[test]
    fn resource_uses_configured_instance() {
        let env = Environment::default().with_database_url("https://chat.firebaseio.com");
        let metadata = trigger(DatabaseEvent::Write, &env, None, "/rooms/{room}")
            .metadata()
            .unwrap();
        assert_eq!(metadata.event_type, "google.firebase.database.ref.write");
        assert_eq!(metadata.resource, "projects/_/instances/chat/refs/rooms/{room}");

        let explicit = trigger(DatabaseEvent::Create, &Environment::default(), Some("other"), "a");
        assert_eq!(
            explicit.metadata().unwrap().resource,
            "projects/_/instances/other/refs/a"
        );
        assert!(trigger(DatabaseEvent::Create, &Environment::default(), None, "a")
            .metadata()
            .is_err());
    }

    #[test]
    fn snapshot_points_at_emulator_when_configured() {
        let env = Environment::default().with_database_emulator_host("localhost:9000");
        let snap = snapshot_constructor(&env, &event(json!({"data": null, "delta": {"a": 1}})))
            .unwrap();
        assert_eq!(snap.instance_url(), Some("http://localhost:9000/?ns=chat"));
        assert_eq!(snap.key().as_deref(), Some("lobby"));
        assert_eq!(snap.val(), json!({"a": 1}));
    }

    #[test]
    fn change_honors_field_mask() {
        let change = change_constructor(
            &Environment::default(),
            &event(json!({
                "data": {"num": 1},
                "delta": {"foo": "bar", "num": 2},
                "fieldMask": "num"
            })),
        )
        .unwrap();
        assert_eq!(change.before.val(), json!({"foo": "bar", "num": 1}));
        assert_eq!(change.after.val(), json!({"foo": "bar", "num": 2}));
    }
}
