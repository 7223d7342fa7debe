//! Before/after pairs and sparse "before" reconstruction.

use serde::Serialize;
use serde_json::{Map, Value};

/// State of a resource before and after an operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change<T> {
    /// State before the operation.
    pub before: T,
    /// State after the operation.
    pub after: T,
}

impl<T> Change<T> {
    /// Pairs two states.
    pub fn new(before: T, after: T) -> Self {
        Self { before, after }
    }

    /// Maps both sides through `f`.
    pub fn map<U, F>(self, mut f: F) -> Change<U>
    where
        F: FnMut(T) -> U,
    {
        Change {
            before: f(self.before),
            after: f(self.after),
        }
    }
}

impl Change<Value> {
    /// Builds a change from JSON, rebuilding `before` when a field mask is given.
    pub fn from_json(before: Value, after: Value, field_mask: Option<&str>) -> Self {
        match field_mask {
            Some(mask) => {
                let before = apply_field_mask(&before, &after, mask);
                Change { before, after }
            }
            None => Change { before, after },
        }
    }
}

/// Reconstructs a full "before" value from a sparse one.
///
/// Starts from a deep copy of `after`; every comma-separated dotted path in
/// `field_mask` is overwritten with the value at that path in
/// `sparse_before`, or removed when `sparse_before` has nothing there.
/// `after` itself is never modified.
pub fn apply_field_mask(sparse_before: &Value, after: &Value, field_mask: &str) -> Value {
    let mut before = after.clone();
    for mask in field_mask.split(',').map(str::trim).filter(|m| !m.is_empty()) {
        let segments: Vec<&str> = mask.split('.').collect();
        match get_path(sparse_before, &segments) {
            Some(value) => set_path(&mut before, &segments, value.clone()),
            None => unset_path(&mut before, &segments),
        }
    }
    before
}

fn get_path<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |node, segment| match node {
            Value::Object(map) => map.get(*segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn set_path(target: &mut Value, segments: &[&str], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        *target = value;
        return;
    };
    let mut node = target;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        map.insert(last.to_string(), value);
    }
}

fn unset_path(target: &mut Value, segments: &[&str]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut node = target;
    for segment in parents {
        match node {
            Value::Object(map) => match map.get_mut(*segment) {
                Some(child) => node = child,
                None => return,
            },
            _ => return,
        }
    }
    if let Value::Object(map) = node {
        map.remove(*last);
    }
}
