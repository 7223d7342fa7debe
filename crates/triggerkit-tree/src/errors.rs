use thiserror::Error;

/// Errors raised while interpreting hierarchical-store events.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Resource name did not follow `projects/{p}/instances/{i}/refs/{path}`.
    #[error("unexpected database resource name: {0}")]
    InvalidResource(String),
}
