use crate::validation::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};

macro_rules! newtype {
    ($name:ident, $doc:expr, $pattern:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new instance without validation; callers are responsible for conformity.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Parses a validated identifier from a string.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let s = value.into();
                if !Regex::new($pattern).expect("invalid regex").is_match(&s) {
                    return Err(ValidationError::PatternMismatch {
                        field: stringify!($name),
                        value: s,
                    });
                }
                Ok(Self(s))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

newtype!(
    DocumentName,
    "Fully qualified document resource name (`projects/{p}/databases/{d}/documents/{path}`).",
    r"^projects/[^/]+/databases/[^/]+/documents(/[^/]+)*$"
);
newtype!(
    CollectionId,
    "Single collection segment; never contains a slash.",
    r"^[^/]+$"
);

const DOCUMENTS_MARKER: &str = "/documents/";

impl DocumentName {
    /// Path relative to the database root, e.g. `users/alice`.
    ///
    /// Names that were never qualified (test fixtures often pass bare paths)
    /// are returned as-is with surrounding slashes removed.
    pub fn relative_path(&self) -> &str {
        match self.0.find(DOCUMENTS_MARKER) {
            Some(idx) => &self.0[idx + DOCUMENTS_MARKER.len()..],
            None => self.0.trim_matches('/'),
        }
    }

    /// Last path segment of the name.
    pub fn id(&self) -> &str {
        self.relative_path().rsplit('/').next().unwrap_or_default()
    }

    /// Relative path of the collection containing this document, if any.
    pub fn parent_path(&self) -> Option<&str> {
        let relative = self.relative_path();
        relative.rfind('/').map(|idx| &relative[..idx])
    }

    /// Name of a document nested under `collection` with the given id.
    pub fn child(&self, collection: &CollectionId, doc_id: &str) -> DocumentName {
        DocumentName(format!("{}/{}/{}", self.0, collection.as_ref(), doc_id))
    }
}
