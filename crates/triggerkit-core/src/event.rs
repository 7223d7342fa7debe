use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Authentication category attached to identity-scoped events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthType {
    /// Privileged caller; no user identity is exposed.
    Admin,
    /// End user with an identity.
    User,
    /// No credentials.
    Unauthenticated,
}

/// Identity of the end user that caused the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAuth {
    /// User id, when the claim carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Decoded token claims.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Value>,
}

/// The `auth` member of an [`EventContext`].
///
/// `Absent` and `Anonymous` differ on the wire: the former omits the member,
/// the latter renders it as an explicit `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ContextAuth {
    /// Member omitted (admin callers, providers without identity).
    #[default]
    Absent,
    /// Explicit `null` identity.
    Anonymous,
    /// A user identity.
    User(UserAuth),
}

impl ContextAuth {
    /// True when the member is omitted entirely.
    pub fn is_absent(&self) -> bool {
        matches!(self, ContextAuth::Absent)
    }

    /// User identity, when there is one.
    pub fn user(&self) -> Option<&UserAuth> {
        match self {
            ContextAuth::User(user) => Some(user),
            _ => None,
        }
    }
}

impl Serialize for ContextAuth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContextAuth::User(user) => user.serialize(serializer),
            ContextAuth::Absent | ContextAuth::Anonymous => serializer.serialize_none(),
        }
    }
}

/// Resource that emitted the event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Emitting service, e.g. `firestore.googleapis.com`.
    #[serde(default)]
    pub service: String,
    /// Concrete resource name matched by the trigger.
    #[serde(default)]
    pub name: String,
    /// Optional resource type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Optional resource labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,
}

/// Canonical metadata handed to every handler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    /// Unique event id.
    pub event_id: String,
    /// RFC 3339 emission time.
    pub timestamp: String,
    /// Canonical dotted event type.
    pub event_type: String,
    /// Structured emitting resource. `None` only for hand-built test events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    /// Values extracted from the trigger's wildcard segments.
    pub params: BTreeMap<String, String>,
    /// Authentication category, for identity-scoped providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<AuthType>,
    /// User identity, see [`ContextAuth`].
    #[serde(skip_serializing_if = "ContextAuth::is_absent")]
    pub auth: ContextAuth,
}

/// A normalized invocation: payload plus canonical context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Provider-specific payload, untouched.
    pub data: Value,
    /// Canonical context.
    pub context: EventContext,
}
