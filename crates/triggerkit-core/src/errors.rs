use thiserror::Error;

/// Boxed error produced by handlers and data constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Core error types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The wire envelope is not shaped like either supported format.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
    /// A required environment variable is not set.
    #[error("missing environment: {0} is not set")]
    MissingEnvironment(&'static str),
    /// An environment variable is set but cannot be interpreted.
    #[error("invalid environment value for {var}: {reason}")]
    InvalidEnvironment {
        /// Variable name.
        var: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by a function invocation.
///
/// Bad wire data and handler failures are kept apart so callers can tell
/// "the payload could not be decoded" from "the handler failed".
#[derive(Error, Debug)]
pub enum FunctionError {
    /// Envelope normalization or trigger metadata failed.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// The data constructor could not build the handler input.
    #[error("data construction failed: {0}")]
    DataConstruction(#[source] BoxError),
    /// The handler stopped on payload data it could not decode.
    #[error("invalid payload data: {0}")]
    Data(#[source] BoxError),
    /// The handler failed or its deferred result rejected.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl FunctionError {
    /// True when the failure came from decoding the incoming payload.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            FunctionError::DataConstruction(_) | FunctionError::Data(_)
        )
    }
}
