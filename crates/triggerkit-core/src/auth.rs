//! Authentication classification for identity-scoped events.

use serde_json::Value;

use crate::event::{AuthType, ContextAuth, UserAuth};

/// Classifies a raw auth claim (`{admin, variable: {uid, token}}`).
pub fn classify(claim: Option<&Value>) -> AuthType {
    let Some(claim) = claim else {
        return AuthType::Unauthenticated;
    };
    if claim.get("admin").and_then(Value::as_bool).unwrap_or(false) {
        return AuthType::Admin;
    }
    match claim.get("variable") {
        Some(variable) if !variable.is_null() => AuthType::User,
        _ => AuthType::Unauthenticated,
    }
}

/// Builds the context `auth` member for a classification.
pub fn context_auth(auth_type: AuthType, claim: Option<&Value>) -> ContextAuth {
    match auth_type {
        AuthType::Admin => ContextAuth::Absent,
        AuthType::Unauthenticated => ContextAuth::Anonymous,
        AuthType::User => {
            let variable = claim.and_then(|c| c.get("variable"));
            ContextAuth::User(UserAuth {
                uid: variable
                    .and_then(|v| v.get("uid"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
                token: variable.and_then(|v| v.get("token")).cloned(),
            })
        }
    }
}
