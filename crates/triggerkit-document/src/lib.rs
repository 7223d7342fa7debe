//! Decoding of typed document payloads into snapshots.
//!
//! This crate provides:
//! - [`Decoder`], which turns tagged wire values into [`DocumentValue`]s
//! - [`DocumentSnapshot`], a lazily decoded view over one document payload
//! - [`DocumentReference`], a proxy whose live handle is opened on first use
//! - The [`DocumentBackend`] seam plus an in-memory implementation
//!
//! Decoding never contacts a store. Only reads and writes through a
//! reference reach the backend.

#![deny(missing_docs)]

/// Live store abstraction.
pub mod backend;
/// Wire value decoding.
pub mod decoder;
/// Error types.
pub mod error;
/// Nested field addressing.
pub mod field_path;
/// In-memory backend.
pub mod memory;
/// Reference proxies.
pub mod reference;
/// Document snapshots.
pub mod snapshot;
/// Decoded values.
pub mod value;

pub use backend::{DetachedBackend, DocumentBackend, LiveDocument};
pub use decoder::Decoder;
pub use error::{is_decode_error, DecodeError, DocumentError};
pub use field_path::FieldPath;
pub use memory::InMemoryBackend;
pub use reference::DocumentReference;
pub use snapshot::DocumentSnapshot;
pub use triggerkit_values::{CollectionId, DocumentName, RawDocument, TaggedValue, Timestamp};
pub use value::{fields_to_json, DocumentValue};
