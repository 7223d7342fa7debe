//! Lazy references to documents.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use triggerkit_values::{CollectionId, DocumentName};

use crate::backend::LiveDocument;
use crate::decoder::Decoder;
use crate::error::DocumentError;
use crate::snapshot::DocumentSnapshot;
use crate::value::DocumentValue;

type LiveSlot = Arc<Mutex<Option<Arc<dyn LiveDocument>>>>;

/// Proxy for the document at `name`.
///
/// Naming accessors never touch the backend. The live handle is opened on the
/// first read or write and reused by every clone of this reference.
#[derive(Clone)]
pub struct DocumentReference {
    name: DocumentName,
    decoder: Decoder,
    live: LiveSlot,
}

impl DocumentReference {
    pub(crate) fn new(name: DocumentName, decoder: Decoder) -> Self {
        Self {
            name,
            decoder,
            live: Arc::new(Mutex::new(None)),
        }
    }

    /// Full resource name.
    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    /// Path relative to the database root.
    pub fn path(&self) -> &str {
        self.name.relative_path()
    }

    /// Document id (last path segment).
    pub fn id(&self) -> &str {
        self.name.id()
    }

    /// Relative path of the parent collection.
    pub fn parent_path(&self) -> Option<&str> {
        self.name.parent_path()
    }

    /// Reference to `doc_id` inside a subcollection of this document.
    pub fn collection(&self, collection: &CollectionId, doc_id: &str) -> DocumentReference {
        DocumentReference::new(self.name.child(collection, doc_id), self.decoder.clone())
    }

    /// Whether the live handle has been opened.
    pub fn is_resolved(&self) -> bool {
        self.live.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    /// Reads the document.
    pub fn get(&self) -> Result<DocumentSnapshot, DocumentError> {
        let raw = self.handle()?.get()?;
        Ok(self.decoder.snapshot(&raw, self.name.as_ref())?)
    }

    /// Replaces the document's fields.
    pub fn set(&self, fields: &BTreeMap<String, DocumentValue>) -> Result<(), DocumentError> {
        self.handle()?.set(self.decoder.encode_fields(fields))
    }

    /// Merges top-level fields into the existing document.
    pub fn update(&self, fields: &BTreeMap<String, DocumentValue>) -> Result<(), DocumentError> {
        self.handle()?.update(self.decoder.encode_fields(fields))
    }

    /// Deletes the document.
    pub fn delete(&self) -> Result<(), DocumentError> {
        self.handle()?.delete()
    }

    fn handle(&self) -> Result<Arc<dyn LiveDocument>, DocumentError> {
        let mut slot = self
            .live
            .lock()
            .map_err(|_| DocumentError::Backend("reference lock poisoned".to_string()))?;
        if let Some(live) = slot.as_ref() {
            return Ok(live.clone());
        }
        tracing::debug!(name = %self.name, "opening live document handle");
        let live: Arc<dyn LiveDocument> = Arc::from(self.decoder.backend().open(&self.name)?);
        *slot = Some(live.clone());
        Ok(live)
    }
}

impl PartialEq for DocumentReference {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for DocumentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentReference")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
