//! Paths into a document's field map.

use std::fmt;

/// Sequence of map keys addressing a nested field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Path from explicit segments; segments may themselves contain dots.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Path from dotted notation, e.g. `address.city`.
    ///
    /// Empty segments are kept, so `a..b` only matches a field literally
    /// named `""` between `a` and `b`.
    pub fn from_dotted(path: &str) -> Self {
        Self::new(path.split('.'))
    }

    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::from_dotted(path)
    }
}

impl From<Vec<String>> for FieldPath {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}
