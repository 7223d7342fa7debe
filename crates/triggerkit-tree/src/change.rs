//! Applying sparse deltas to trees.

use serde_json::{Map, Value};

/// Applies `delta` on top of `src`.
///
/// When both are objects they are deep-merged, with `delta` winning on every
/// conflicting leaf, and `null` entries are then pruned from the merged tree.
/// Otherwise `delta` replaces `src` as-is.
pub fn apply_change(src: &Value, delta: &Value) -> Value {
    match (src, delta) {
        (Value::Object(_), Value::Object(_)) => {
            let mut merged = src.clone();
            deep_merge(&mut merged, delta);
            prune_nulls(&mut merged);
            merged
        }
        _ => delta.clone(),
    }
}

fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Removes every `null` member from nested objects, in place.
pub fn prune_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, child| !child.is_null());
            map.values_mut().for_each(prune_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(prune_nulls),
        _ => {}
    }
}

/// Value at `parts` below `source`, walking objects by key and arrays by index.
pub fn value_at<'a, S: AsRef<str>>(source: &'a Value, parts: &[S]) -> Option<&'a Value> {
    parts.iter().try_fold(source, |node, part| match node {
        Value::Object(map) => map.get(part.as_ref()),
        Value::Array(items) => part.as_ref().parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Whether a delta touches the node at `parts`.
///
/// A `null` or leaf met on the way down replaced the whole subtree, so it
/// counts as touching every path beneath it.
pub fn delta_touches<S: AsRef<str>>(delta: &Value, parts: &[S]) -> bool {
    let mut node = delta;
    for part in parts {
        match node {
            Value::Object(map) => match map.get(part.as_ref()) {
                Some(child) => node = child,
                None => return false,
            },
            _ => return true,
        }
    }
    true
}

pub(crate) fn is_empty_object(value: &Value) -> bool {
    value.as_object().map_or(false, Map::is_empty)
}
