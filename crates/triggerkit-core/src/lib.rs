//! Event normalization and handler orchestration for platform triggers.
//!
//! This crate provides:
//! - Detection of the legacy (flat) and current (`{data, context}`) envelopes
//! - Rewriting of deprecated event types into canonical dotted names
//! - Wildcard parameter extraction from resource templates
//! - Auth classification for identity-scoped providers
//! - [`CloudFunction`], which runs a handler around one normalized event
//!
//! Core invariants:
//! - Shape is decided once, at the envelope boundary; everything downstream
//!   sees one [`EventContext`]
//! - Wildcard matching never fails; mismatches produce fewer params
//! - Resource templates are generated lazily, only when needed
//! - Decode failures and handler failures are distinct [`FunctionError`] kinds
//!
#![deny(missing_docs)]

/// Auth claim classification.
pub mod auth;
/// Before/after pairs and field-mask reconstruction.
pub mod change;
/// Process environment.
pub mod config;
/// Wire envelope shapes.
pub mod envelope;
/// Error types for core operations.
pub mod errors;
/// Canonical event model.
pub mod event;
/// Handler orchestration.
pub mod function;
/// Deprecated event type table.
pub mod legacy;
/// End-to-end envelope normalization.
pub mod normalizer;
/// Wildcard matching.
pub mod params;
/// Trigger descriptors.
pub mod trigger;

pub use change::{apply_field_mask, Change};
pub use config::Environment;
pub use envelope::{ReconciledEnvelope, WireEnvelope};
pub use errors::{BoxError, CoreError, FunctionError};
pub use event::{AuthType, ContextAuth, Event, EventContext, Resource, UserAuth};
pub use function::{CloudFunction, DataErrorClassifier, Deferred, HandlerReturn};
pub use normalizer::normalize_event;
pub use params::match_wildcards;
pub use trigger::{TriggerDescriptor, TriggerMetadata, TriggerResource};
