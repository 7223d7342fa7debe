//! Trigger descriptors and lazily generated resource templates.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::CoreError;

type Generator = dyn Fn() -> Result<String, CoreError> + Send + Sync;

/// Resource template generator.
///
/// The generator runs only when the template is requested, so a trigger can
/// be defined in an environment that lacks the variables its template needs.
#[derive(Clone)]
pub struct TriggerResource {
    generator: Arc<Generator>,
}

impl TriggerResource {
    /// Template known up front.
    pub fn fixed(template: impl Into<String>) -> Self {
        let template = template.into();
        Self {
            generator: Arc::new(move || Ok(template.clone())),
        }
    }

    /// Template computed on demand.
    pub fn lazy<F>(generator: F) -> Self
    where
        F: Fn() -> Result<String, CoreError> + Send + Sync + 'static,
    {
        Self {
            generator: Arc::new(generator),
        }
    }

    /// Runs the generator.
    pub fn resolve(&self) -> Result<String, CoreError> {
        (self.generator)()
    }
}

impl fmt::Debug for TriggerResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TriggerResource(..)")
    }
}

/// What a function listens to.
#[derive(Debug, Clone)]
pub struct TriggerDescriptor {
    /// Provider prefix, e.g. `google.firestore`.
    pub provider: String,
    /// Event name within the provider, e.g. `document.write`.
    pub event_name: String,
    /// Emitting service used when lifting flat resource strings.
    pub service: String,
    /// Deprecated type this trigger also accepts.
    pub legacy_event_type: Option<String>,
    /// Resource template.
    pub resource: TriggerResource,
    /// Whether events carry an end-user auth claim.
    pub identity_scoped_auth: bool,
    /// Deployment labels.
    pub labels: BTreeMap<String, String>,
}

impl TriggerDescriptor {
    /// Creates a descriptor without legacy alias, identity auth or labels.
    pub fn new(
        provider: impl Into<String>,
        event_name: impl Into<String>,
        service: impl Into<String>,
        resource: TriggerResource,
    ) -> Self {
        Self {
            provider: provider.into(),
            event_name: event_name.into(),
            service: service.into(),
            legacy_event_type: None,
            resource,
            identity_scoped_auth: false,
            labels: BTreeMap::new(),
        }
    }

    /// Accepts `legacy` as an alias for this trigger's event type.
    pub fn with_legacy_event_type(mut self, legacy: impl Into<String>) -> Self {
        self.legacy_event_type = Some(legacy.into());
        self
    }

    /// Marks events as carrying an auth claim to classify.
    pub fn with_identity_scoped_auth(mut self) -> Self {
        self.identity_scoped_auth = true;
        self
    }

    /// Adds a deployment label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Canonical dotted event type.
    pub fn event_type(&self) -> String {
        format!("{}.{}", self.provider, self.event_name)
    }

    /// Materializes the metadata; fails if the resource generator does.
    pub fn metadata(&self) -> Result<TriggerMetadata, CoreError> {
        Ok(TriggerMetadata {
            event_type: self.event_type(),
            resource: self.resource.resolve()?,
            service: self.service.clone(),
            labels: self.labels.clone(),
        })
    }
}

/// Serializable trigger metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMetadata {
    /// Canonical dotted event type.
    pub event_type: String,
    /// Resolved resource template.
    pub resource: String,
    /// Emitting service.
    pub service: String,
    /// Deployment labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn lazy_generator_runs_only_on_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let trigger = TriggerDescriptor::new(
            "google.pubsub",
            "topic.publish",
            "pubsub.googleapis.com",
            TriggerResource::lazy(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(CoreError::MissingEnvironment("GCLOUD_PROJECT"))
            }),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(
            trigger.metadata(),
            Err(CoreError::MissingEnvironment(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn metadata_carries_dotted_type() {
        let trigger = TriggerDescriptor::new(
            "google.pubsub",
            "topic.publish",
            "pubsub.googleapis.com",
            TriggerResource::fixed("projects/p/topics/t"),
        )
        .with_label("team", "core");
        let metadata = trigger.metadata().unwrap();
        assert_eq!(metadata.event_type, "google.pubsub.topic.publish");
        assert_eq!(metadata.resource, "projects/p/topics/t");
        assert_eq!(metadata.labels["team"], "core");
    }
}
