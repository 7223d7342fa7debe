//! Deprecated event type names still emitted by older platform versions.

/// Service name of the document store.
pub const DOCUMENT_SERVICE: &str = "firestore.googleapis.com";
/// Service name of the hierarchical store.
pub const DATABASE_SERVICE: &str = "firebaseio.com";
/// Service name of the message bus.
pub const PUBSUB_SERVICE: &str = "pubsub.googleapis.com";
/// Service name of object storage.
pub const STORAGE_SERVICE: &str = "storage.googleapis.com";

/// Legacy type, canonical dotted type, emitting service.
const LEGACY_EVENT_TYPES: &[(&str, &str, &str)] = &[
    (
        "providers/cloud.firestore/eventTypes/document.create",
        "google.firestore.document.create",
        DOCUMENT_SERVICE,
    ),
    (
        "providers/cloud.firestore/eventTypes/document.update",
        "google.firestore.document.update",
        DOCUMENT_SERVICE,
    ),
    (
        "providers/cloud.firestore/eventTypes/document.delete",
        "google.firestore.document.delete",
        DOCUMENT_SERVICE,
    ),
    (
        "providers/cloud.firestore/eventTypes/document.write",
        "google.firestore.document.write",
        DOCUMENT_SERVICE,
    ),
    (
        "providers/google.firebase.database/eventTypes/ref.create",
        "google.firebase.database.ref.create",
        DATABASE_SERVICE,
    ),
    (
        "providers/google.firebase.database/eventTypes/ref.update",
        "google.firebase.database.ref.update",
        DATABASE_SERVICE,
    ),
    (
        "providers/google.firebase.database/eventTypes/ref.delete",
        "google.firebase.database.ref.delete",
        DATABASE_SERVICE,
    ),
    (
        "providers/google.firebase.database/eventTypes/ref.write",
        "google.firebase.database.ref.write",
        DATABASE_SERVICE,
    ),
    (
        "providers/firebase.database/eventTypes/ref.write",
        "google.firebase.database.ref.write",
        DATABASE_SERVICE,
    ),
    (
        "providers/cloud.pubsub/eventTypes/topic.publish",
        "google.pubsub.topic.publish",
        PUBSUB_SERVICE,
    ),
    (
        "providers/cloud.storage/eventTypes/object.change",
        "google.storage.object.change",
        STORAGE_SERVICE,
    ),
];

/// Canonical type and service for a known legacy event type.
pub fn canonical_event_type(legacy: &str) -> Option<(&'static str, &'static str)> {
    LEGACY_EVENT_TYPES
        .iter()
        .find(|(name, _, _)| *name == legacy)
        .map(|(_, canonical, service)| (*canonical, *service))
}

/// True when `event_type` is one of the deprecated names.
pub fn is_legacy_event_type(event_type: &str) -> bool {
    canonical_event_type(event_type).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_document_write() {
        assert_eq!(
            canonical_event_type("providers/cloud.firestore/eventTypes/document.write"),
            Some(("google.firestore.document.write", DOCUMENT_SERVICE))
        );
    }

    #[test]
    fn both_database_spellings_map_to_one_type() {
        let (a, _) =
            canonical_event_type("providers/firebase.database/eventTypes/ref.write").unwrap();
        let (b, _) =
            canonical_event_type("providers/google.firebase.database/eventTypes/ref.write")
                .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_names_are_not_legacy() {
        assert!(!is_legacy_event_type("google.firestore.document.write"));
    }
}
