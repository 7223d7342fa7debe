//! In-memory document backend.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use triggerkit_values::{DocumentName, RawDocument, TaggedValue, Timestamp};

use crate::backend::{DocumentBackend, LiveDocument};
use crate::error::DocumentError;

type Documents = Arc<Mutex<BTreeMap<String, RawDocument>>>;

/// Backend that keeps documents in a shared map keyed by full name.
///
/// Counts how many live handles were opened, which makes lazy resolution
/// observable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    documents: Documents,
    opened: Arc<AtomicUsize>,
}

impl InMemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a document.
    pub fn insert(&self, name: &str, document: RawDocument) -> Result<(), DocumentError> {
        lock(&self.documents)?.insert(name.to_string(), document);
        Ok(())
    }

    /// Stored payload for `name`, if any.
    pub fn document(&self, name: &str) -> Result<Option<RawDocument>, DocumentError> {
        Ok(lock(&self.documents)?.get(name).cloned())
    }

    /// Number of live handles opened so far.
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl DocumentBackend for InMemoryBackend {
    fn open(&self, name: &DocumentName) -> Result<Box<dyn LiveDocument>, DocumentError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryDocument {
            name: name.to_string(),
            documents: self.documents.clone(),
        }))
    }
}

#[derive(Debug)]
struct MemoryDocument {
    name: String,
    documents: Documents,
}

impl LiveDocument for MemoryDocument {
    fn get(&self) -> Result<RawDocument, DocumentError> {
        let documents = lock(&self.documents)?;
        let mut document = documents.get(&self.name).cloned().unwrap_or_default();
        document.read_time = Some(Timestamp::now().to_rfc3339());
        Ok(document)
    }

    fn set(&self, fields: BTreeMap<String, TaggedValue>) -> Result<(), DocumentError> {
        let now = Timestamp::now().to_rfc3339();
        let mut documents = lock(&self.documents)?;
        let create_time = documents
            .get(&self.name)
            .and_then(|existing| existing.create_time.clone())
            .unwrap_or_else(|| now.clone());
        documents.insert(
            self.name.clone(),
            RawDocument {
                name: Some(self.name.clone()),
                fields,
                create_time: Some(create_time),
                update_time: Some(now),
                read_time: None,
            },
        );
        Ok(())
    }

    fn update(&self, fields: BTreeMap<String, TaggedValue>) -> Result<(), DocumentError> {
        let mut documents = lock(&self.documents)?;
        let Some(existing) = documents.get_mut(&self.name) else {
            return Err(DocumentError::Backend(format!(
                "no document to update: {}",
                self.name
            )));
        };
        existing.fields.extend(fields);
        existing.update_time = Some(Timestamp::now().to_rfc3339());
        Ok(())
    }

    fn delete(&self) -> Result<(), DocumentError> {
        lock(&self.documents)?.remove(&self.name);
        Ok(())
    }
}

fn lock(
    documents: &Documents,
) -> Result<MutexGuard<'_, BTreeMap<String, RawDocument>>, DocumentError> {
    documents
        .lock()
        .map_err(|_| DocumentError::Backend("document map lock poisoned".to_string()))
}
