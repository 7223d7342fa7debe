//! Seam between reference proxies and a live document store.

use std::collections::BTreeMap;
use std::fmt;

use triggerkit_values::{DocumentName, RawDocument, TaggedValue};

use crate::error::DocumentError;

/// Opens live handles for document names.
///
/// Implementations are shared by every reference a decoder produces; opening
/// a handle is the only point where a connection may be established.
pub trait DocumentBackend: Send + Sync + fmt::Debug {
    /// Opens a live handle for `name`.
    fn open(&self, name: &DocumentName) -> Result<Box<dyn LiveDocument>, DocumentError>;
}

/// Live handle to one document.
pub trait LiveDocument: Send + Sync + fmt::Debug {
    /// Reads the current payload; an empty payload means "does not exist".
    fn get(&self) -> Result<RawDocument, DocumentError>;

    /// Replaces the document's fields.
    fn set(&self, fields: BTreeMap<String, TaggedValue>) -> Result<(), DocumentError>;

    /// Merges top-level fields into an existing document.
    fn update(&self, fields: BTreeMap<String, TaggedValue>) -> Result<(), DocumentError>;

    /// Deletes the document.
    fn delete(&self) -> Result<(), DocumentError>;
}

/// Backend for contexts without a store, such as offline decoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedBackend;

impl DocumentBackend for DetachedBackend {
    fn open(&self, name: &DocumentName) -> Result<Box<dyn LiveDocument>, DocumentError> {
        Err(DocumentError::Backend(format!(
            "no document backend configured for {name}"
        )))
    }
}
