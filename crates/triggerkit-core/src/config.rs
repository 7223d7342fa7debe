//! Process environment consumed by trigger resource generators.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::CoreError;

/// Project id variables, in lookup order.
pub const PROJECT_VARS: [&str; 2] = ["GCLOUD_PROJECT", "GCP_PROJECT"];
/// JSON object describing the project (`projectId`, `databaseURL`).
pub const FIREBASE_CONFIG_VAR: &str = "FIREBASE_CONFIG";
/// Host of a local hierarchical-store emulator.
pub const DATABASE_EMULATOR_VAR: &str = "FIREBASE_DATABASE_EMULATOR_HOST";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FirebaseConfig {
    project_id: Option<String>,
    #[serde(rename = "databaseURL")]
    database_url: Option<String>,
}

/// Snapshot of the environment relevant to triggers.
///
/// Nothing is validated at load time. Required values are checked by the
/// accessors so a missing variable only fails the code path that needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    project_id: Option<String>,
    database_url: Option<String>,
    database_emulator_host: Option<String>,
}

impl Environment {
    /// Reads the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds an environment from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = Environment::default();

        if let Some(raw) = lookup(FIREBASE_CONFIG_VAR) {
            match parse_firebase_config(&raw) {
                Ok(config) => {
                    env.project_id = config.project_id;
                    env.database_url = config.database_url;
                }
                Err(err) => {
                    tracing::warn!("ignoring {FIREBASE_CONFIG_VAR}: {err}");
                }
            }
        }

        for var in PROJECT_VARS {
            if let Some(raw) = lookup(var) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    env.project_id = Some(trimmed.to_string());
                    break;
                }
            }
        }

        if let Some(raw) = lookup(DATABASE_EMULATOR_VAR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                env.database_emulator_host = Some(trimmed.to_string());
            }
        }

        env
    }

    /// Sets the project id.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the default hierarchical-store URL.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Sets the hierarchical-store emulator host.
    pub fn with_database_emulator_host(mut self, host: impl Into<String>) -> Self {
        self.database_emulator_host = Some(host.into());
        self
    }

    /// Project id, or an error naming the variable to set.
    pub fn project_id(&self) -> Result<&str, CoreError> {
        self.project_id
            .as_deref()
            .ok_or(CoreError::MissingEnvironment(PROJECT_VARS[0]))
    }

    /// Default hierarchical-store URL.
    pub fn database_url(&self) -> Result<&str, CoreError> {
        self.database_url
            .as_deref()
            .ok_or(CoreError::MissingEnvironment(FIREBASE_CONFIG_VAR))
    }

    /// Emulator host, when one is configured.
    pub fn database_emulator_host(&self) -> Option<&str> {
        self.database_emulator_host.as_deref()
    }
}

fn parse_firebase_config(raw: &str) -> Result<FirebaseConfig, CoreError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(CoreError::InvalidEnvironment {
            var: FIREBASE_CONFIG_VAR,
            reason: "expected a JSON object".to_string(),
        });
    }
    Ok(serde_json::from_value(value)?)
}
