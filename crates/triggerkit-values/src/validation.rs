use thiserror::Error;

/// Validation errors for wire primitives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// When a value does not match the required pattern.
    #[error("{field} ('{value}') is not allowed")]
    PatternMismatch {
        /// Field name that failed validation.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When a numeric value exceeds its bounds.
    #[error("{field} ({value}) is out of bounds")]
    OutOfBounds {
        /// Field name that is out of bounds.
        field: &'static str,
        /// Offending value.
        value: String,
    },
    /// When an encoded payload (base64, integer text) cannot be decoded.
    #[error("{field} could not be decoded: {reason}")]
    InvalidEncoding {
        /// Field name whose encoding is broken.
        field: &'static str,
        /// Decoder message.
        reason: String,
    },
}
