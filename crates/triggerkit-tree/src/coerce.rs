//! Conversion of integer-keyed objects into arrays.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

fn array_index_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(0|[1-9]\d*)$").expect("invalid regex"))
}

/// Rewrites objects that look like arrays into arrays, bottom-up.
///
/// An object qualifies when every key is a base-10 index without leading
/// zeros and the largest index is below twice the number of keys. Missing
/// indices become `null`. The density threshold is kept for compatibility
/// with data written by existing clients.
///
/// ```
/// use serde_json::json;
/// use triggerkit_tree::coerce::coerce_arrays;
///
/// let tree = json!({"foo": {"0": "a", "1": "b"}});
/// assert_eq!(coerce_arrays(tree), json!({"foo": ["a", "b"]}));
/// ```
pub fn coerce_arrays(value: Value) -> Value {
    match value {
        Value::Object(map) => coerce_object(map),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_arrays).collect()),
        other => other,
    }
}

fn coerce_object(map: Map<String, Value>) -> Value {
    let converted: Map<String, Value> = map
        .into_iter()
        .map(|(key, child)| (key, coerce_arrays(child)))
        .collect();

    let Some(max_index) = max_index(&converted) else {
        return Value::Object(converted);
    };
    if max_index >= 2 * converted.len() {
        return Value::Object(converted);
    }

    let mut items = vec![Value::Null; max_index + 1];
    for (key, child) in converted {
        if let Ok(index) = key.parse::<usize>() {
            items[index] = child;
        }
    }
    Value::Array(items)
}

/// Largest index key, or `None` when the map is empty or any key is not an index.
fn max_index(map: &Map<String, Value>) -> Option<usize> {
    let mut max = None;
    for key in map.keys() {
        if !array_index_regex().is_match(key) {
            return None;
        }
        let index = key.parse::<usize>().ok()?;
        max = Some(max.map_or(index, |m: usize| m.max(index)));
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dense_keys_become_array() {
        let tree = json!({"0": "a", "1": "b", "2": {"c": "d"}});
        assert_eq!(coerce_arrays(tree), json!(["a", "b", {"c": "d"}]));
    }

    #[test]
    fn holes_are_filled_with_null() {
        let tree = json!({"0": "a", "2": "b", "3": {"c": "d"}});
        assert_eq!(coerce_arrays(tree), json!(["a", null, "b", {"c": "d"}]));
    }

    #[test]
    fn sparse_keys_stay_object() {
        let tree = json!({"0": "a", "5": "b"});
        assert_eq!(coerce_arrays(tree.clone()), tree);
    }

    #[test]
    fn leading_zero_or_mixed_keys_stay_object() {
        let leading = json!({"0": "a", "01": "b"});
        assert_eq!(coerce_arrays(leading.clone()), leading);
        let mixed = json!({"0": "a", "x": "b"});
        assert_eq!(coerce_arrays(mixed.clone()), mixed);
    }

    #[test]
    fn empty_object_stays_object() {
        assert_eq!(coerce_arrays(json!({})), json!({}));
    }

    #[test]
    fn coercion_is_idempotent() {
        let tree = json!({"a": {"0": {"1": "x", "0": "y"}, "1": 0}, "b": {"0": null}});
        let once = coerce_arrays(tree);
        assert_eq!(coerce_arrays(once.clone()), once);
    }

    #[test]
    fn zero_leaves_are_preserved() {
        assert_eq!(coerce_arrays(json!({"myKey": 0})), json!({"myKey": 0}));
        assert_eq!(coerce_arrays(json!({"myKey": null})), json!({"myKey": null}));
    }

    #[test]
    fn oversized_index_stays_object() {
        let tree = json!({"99999999999999999999999": 1});
        assert_eq!(coerce_arrays(tree.clone()), tree);
    }
}
