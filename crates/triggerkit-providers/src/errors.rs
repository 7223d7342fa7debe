use thiserror::Error;
use triggerkit_document::DecodeError;
use triggerkit_tree::TreeError;
use triggerkit_values::ValidationError;

/// Errors raised while building handler input from a normalized event.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The event carries no resource to name the data after.
    #[error("event has no resource")]
    MissingResource,
    /// A document payload was not shaped like a document.
    #[error("invalid document payload: {0}")]
    Payload(#[from] ValidationError),
    /// A document field could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// The database resource name was malformed.
    #[error(transparent)]
    Tree(#[from] TreeError),
}
