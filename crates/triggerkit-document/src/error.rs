//! Error types for document decoding and reference operations.

use thiserror::Error;
use triggerkit_values::ValidationError;

/// Failure to turn wire data into decoded values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A node carried none of the known value tags.
    #[error("value has no recognized type tag: {0}")]
    UnknownVariant(String),
    /// A known tag carried a malformed payload.
    #[error("invalid wire value: {0}")]
    Validation(#[from] ValidationError),
}

/// Errors from reference operations.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Data read back from the backend could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
    /// The live backend failed.
    #[error("backend error: {0}")]
    Backend(String),
}

/// True when `err` is a [`DecodeError`].
///
/// Snapshot fields decode on first access, so a bad payload can surface from
/// inside a handler. Functions use this to report it as bad data.
pub fn is_decode_error(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<DecodeError>()
}
