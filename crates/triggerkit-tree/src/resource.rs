//! Hierarchical-store resource names.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::TreeError;

/// Production host suffix for database instances.
pub const DATABASE_HOST: &str = "firebaseio.com";

fn resource_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^projects/([^/]+)/instances/([a-zA-Z0-9-]+)/refs(/.+)?$")
            .expect("invalid regex")
    })
}

/// Instance and path named by a database event resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseResource {
    instance: String,
    path: String,
}

impl DatabaseResource {
    /// Parses `projects/{project}/instances/{instance}/refs/{path}`.
    ///
    /// A resource without a path refers to the root, `/`.
    pub fn parse(resource: &str) -> Result<Self, TreeError> {
        let caps = resource_regex()
            .captures(resource)
            .ok_or_else(|| TreeError::InvalidResource(resource.to_string()))?;
        Ok(Self {
            instance: caps[2].to_string(),
            path: caps.get(3).map_or("/", |m| m.as_str()).to_string(),
        })
    }

    /// Database instance name.
    pub fn instance(&self) -> &str {
        &self.instance
    }

    /// Path inside the instance, always starting with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URL of the instance, pointed at the emulator when one is configured.
    pub fn instance_url(&self, emulator_host: Option<&str>) -> String {
        match emulator_host {
            Some(host) => format!("http://{host}/?ns={}", self.instance),
            None => format!("https://{}.{DATABASE_HOST}", self.instance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_instance_and_path() {
        let resource =
            DatabaseResource::parse("projects/_/instances/my-db/refs/users/alice").unwrap();
        assert_eq!(resource.instance(), "my-db");
        assert_eq!(resource.path(), "/users/alice");
        assert_eq!(resource.instance_url(None), "https://my-db.firebaseio.com");
        assert_eq!(
            resource.instance_url(Some("localhost:9000")),
            "http://localhost:9000/?ns=my-db"
        );
    }

    #[test]
    fn missing_path_is_root() {
        let resource = DatabaseResource::parse("projects/_/instances/db/refs").unwrap();
        assert_eq!(resource.path(), "/");
    }

    #[test]
    fn rejects_foreign_resources() {
        let err = DatabaseResource::parse("projects/p/databases/(default)/documents/a").unwrap_err();
        assert!(matches!(err, TreeError::InvalidResource(_)));
        assert!(DatabaseResource::parse("projects/_/instances/bad_name/refs/a").is_err());
    }
}
