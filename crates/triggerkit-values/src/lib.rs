//! Wire-level value primitives for trigger event payloads.
//!
//! The platform ships document field values as a tagged union in its JSON
//! transport form (`{"stringValue": "..."}`, `{"mapValue": {"fields": ...}}`).
//! This crate models that union as a closed sum type together with the
//! scalar helpers (timestamps, geo-points, 64-bit integers) needed to read it.
//! Nothing here resolves references or talks to a backend.
//!
#![deny(missing_docs)]

/// Raw document payloads as shipped inside trigger events.
pub mod document;
/// Geographic point value type.
pub mod geo;
/// Validated resource identifiers.
pub mod identifiers;
/// The wire tagged-value union.
pub mod tagged;
/// Seconds + nanoseconds timestamps parsed from RFC 3339 strings.
pub mod timestamp;
/// Validation helpers used by wire types.
pub mod validation;

pub use document::RawDocument;
pub use geo::GeoPoint;
pub use identifiers::{CollectionId, DocumentName};
pub use tagged::{TaggedValue, WireGeoPoint, WireInteger};
pub use timestamp::Timestamp;
pub use validation::ValidationError;
