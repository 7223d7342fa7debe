//! Provider bindings for document-store and hierarchical-store triggers.
//!
//! Each provider module offers a trigger descriptor with a lazily resolved
//! resource, data constructors that turn a normalized [`Event`] into handler
//! input, and `on_*` helpers that assemble a [`CloudFunction`].
//!
//! [`Event`]: triggerkit_core::Event
//! [`CloudFunction`]: triggerkit_core::CloudFunction

#![deny(missing_docs)]

/// Hierarchical-store triggers.
pub mod database;
/// Document-store triggers.
pub mod document;
/// Error types.
pub mod errors;

pub use database::DatabaseEvent;
pub use document::DocumentEvent;
pub use errors::ProviderError;
