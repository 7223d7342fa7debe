//! Envelope normalization: one canonical `(data, context)` per invocation.

use serde_json::Value;

use crate::auth;
use crate::envelope::WireEnvelope;
use crate::errors::CoreError;
use crate::event::{ContextAuth, Event};
use crate::params::match_wildcards;
use crate::trigger::TriggerDescriptor;

/// Normalizes a raw envelope for `trigger`.
///
/// Steps, in order: shape detection, legacy rewrite, auth classification
/// (identity-scoped triggers only), wildcard parameters. Parameters supplied
/// by the caller, or events without a resource, skip wildcard matching; only
/// then is the trigger's resource generator left untouched.
pub fn normalize_event(raw: Value, trigger: &TriggerDescriptor) -> Result<Event, CoreError> {
    let envelope = WireEnvelope::from_json(raw)?;
    let shape = envelope.shape();
    let reconciled = envelope.reconcile(trigger)?;
    let mut context = reconciled.context;

    if trigger.identity_scoped_auth {
        let claim = reconciled.auth_claim.as_ref();
        let auth_type = auth::classify(claim);
        context.auth_type = Some(auth_type);
        context.auth = auth::context_auth(auth_type, claim);
    } else {
        context.auth_type = None;
        context.auth = ContextAuth::Absent;
    }

    if !reconciled.params_supplied {
        if let Some(resource) = &context.resource {
            let template = trigger.resource.resolve()?;
            context.params = match_wildcards(&template, &resource.name);
        }
    }

    tracing::debug!(
        event_id = %context.event_id,
        event_type = %context.event_type,
        shape,
        "normalized event"
    );

    Ok(Event {
        data: reconciled.data,
        context,
    })
}
