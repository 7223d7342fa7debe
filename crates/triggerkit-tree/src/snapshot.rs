//! Read views over a tree before and after a delta.

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use triggerkit_core::{apply_field_mask, Change};

use crate::change::{apply_change, delta_touches, is_empty_object, value_at};
use crate::coerce::coerce_arrays;
use crate::path::{join_path, path_parts};

#[derive(Debug)]
struct Trees {
    before: Value,
    delta: Option<Value>,
    after: Value,
}

/// View of one node of a hierarchical tree, either before or after a delta.
///
/// Views share the underlying trees. Deriving a child, `previous` or
/// `current` view never mutates the receiver; `val()` and the
/// previous/current views are computed once per instance.
pub struct DeltaSnapshot {
    trees: Arc<Trees>,
    path: Arc<str>,
    instance_url: Option<Arc<str>>,
    child_path: String,
    is_previous: bool,
    val: OnceLock<Value>,
    previous: OnceLock<Box<DeltaSnapshot>>,
    current: OnceLock<Box<DeltaSnapshot>>,
}

impl DeltaSnapshot {
    /// Snapshot at `path` for `before` patched by `delta`.
    ///
    /// Without a delta the "after" tree equals `before`.
    pub fn new(before: Value, delta: Option<Value>, path: &str) -> Self {
        Self::with_field_mask(before, delta, path, None)
    }

    /// Like [`DeltaSnapshot::new`], treating `before` as sparse when a field
    /// mask is given: masked paths are taken from `before`, everything else
    /// from the patched tree.
    pub fn with_field_mask(
        before: Value,
        delta: Option<Value>,
        path: &str,
        field_mask: Option<&str>,
    ) -> Self {
        let after = match &delta {
            Some(delta) => apply_change(&before, delta),
            None => before.clone(),
        };
        let before = match field_mask {
            Some(mask) => {
                tracing::debug!(path, mask, "rebuilding sparse before tree");
                apply_field_mask(&before, &after, mask)
            }
            None => before,
        };
        Self::from_parts(
            Arc::new(Trees {
                before,
                delta,
                after,
            }),
            Arc::from(path),
            None,
            String::new(),
            false,
        )
    }

    /// Records the URL of the database instance the data came from.
    pub fn with_instance_url(mut self, url: impl Into<String>) -> Self {
        self.instance_url = Some(Arc::from(url.into()));
        self
    }

    fn from_parts(
        trees: Arc<Trees>,
        path: Arc<str>,
        instance_url: Option<Arc<str>>,
        child_path: String,
        is_previous: bool,
    ) -> Self {
        Self {
            trees,
            path,
            instance_url,
            child_path,
            is_previous,
            val: OnceLock::new(),
            previous: OnceLock::new(),
            current: OnceLock::new(),
        }
    }

    fn dup(&self) -> ViewBuilder<'_> {
        ViewBuilder {
            source: self,
            is_previous: self.is_previous,
            child_path: self.child_path.clone(),
        }
    }

    /// Deep copy of the value at this view, with array-like objects coerced.
    pub fn val(&self) -> Value {
        self.val
            .get_or_init(|| {
                let source = if self.is_previous {
                    &self.trees.before
                } else {
                    &self.trees.after
                };
                let node = value_at(source, &path_parts(&self.child_path))
                    .cloned()
                    .unwrap_or(Value::Null);
                coerce_arrays(node)
            })
            .clone()
    }

    /// Same as [`DeltaSnapshot::val`].
    pub fn export_val(&self) -> Value {
        self.val()
    }

    /// Priority; this data model has none, so always 0.
    pub fn priority(&self) -> i64 {
        0
    }

    /// Whether the view holds data. `null` and `{}` count as absent.
    pub fn exists(&self) -> bool {
        let val = self.val();
        !val.is_null() && !is_empty_object(&val)
    }

    /// View of `child_path` below this one. An empty path yields an equivalent view.
    pub fn child(&self, child_path: &str) -> DeltaSnapshot {
        self.dup().child(child_path).build()
    }

    /// The same node before the delta was applied.
    pub fn previous(&self) -> &DeltaSnapshot {
        if self.is_previous {
            return self;
        }
        self.previous
            .get_or_init(|| Box::new(self.dup().previous(true).build()))
    }

    /// The same node after the delta was applied.
    pub fn current(&self) -> &DeltaSnapshot {
        if !self.is_previous {
            return self;
        }
        self.current
            .get_or_init(|| Box::new(self.dup().previous(false).build()))
    }

    /// Whether this view shows the tree before the delta.
    pub fn is_previous(&self) -> bool {
        self.is_previous
    }

    /// Whether the delta touched this node.
    ///
    /// A `null` or leaf delta above this node replaced its whole subtree, so
    /// it counts as a change here too. A delta of `5` at the root reports
    /// `child("a").changed()` as `true`, matching `child("a").val()` going
    /// from its old value to `null`.
    pub fn changed(&self) -> bool {
        self.trees
            .delta
            .as_ref()
            .map_or(false, |delta| delta_touches(delta, &path_parts(&self.child_path)))
    }

    /// Calls `action` with each child view until it returns `true`.
    ///
    /// Returns `true` when iteration stopped early. Only object values have
    /// children.
    pub fn for_each<F>(&self, mut action: F) -> bool
    where
        F: FnMut(DeltaSnapshot) -> bool,
    {
        match self.val() {
            Value::Object(map) => map.keys().any(|key| action(self.child(key))),
            _ => false,
        }
    }

    /// Whether data exists at `child_path`.
    pub fn has_child(&self, child_path: &str) -> bool {
        self.child(child_path).exists()
    }

    /// Whether the value is an object with at least one member.
    pub fn has_children(&self) -> bool {
        self.num_children() > 0
    }

    /// Number of members when the value is an object, otherwise 0.
    pub fn num_children(&self) -> usize {
        match self.val() {
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    /// Last segment of the full path, or `None` at the root.
    pub fn key(&self) -> Option<String> {
        path_parts(&self.full_path()).last().map(|s| s.to_string())
    }

    /// Full path of this node, starting with `/`.
    pub fn path(&self) -> String {
        format!("/{}", path_parts(&self.full_path()).join("/"))
    }

    /// URL of the database instance, when known.
    pub fn instance_url(&self) -> Option<&str> {
        self.instance_url.as_deref()
    }

    /// JSON form of the view, identical to [`DeltaSnapshot::val`].
    pub fn to_json(&self) -> Value {
        self.val()
    }

    /// Splits into a before/after pair of views.
    pub fn into_change(self) -> Change<DeltaSnapshot> {
        let before = self.dup().previous(true).build();
        let after = self.dup().previous(false).build();
        Change::new(before, after)
    }

    fn full_path(&self) -> String {
        join_path(&self.path, &self.child_path)
    }
}

impl Clone for DeltaSnapshot {
    fn clone(&self) -> Self {
        self.dup().build()
    }
}

impl fmt::Debug for DeltaSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeltaSnapshot")
            .field("path", &self.path())
            .field("is_previous", &self.is_previous)
            .field("changed", &self.changed())
            .finish()
    }
}

/// Copy of a view with selected fields overridden.
struct ViewBuilder<'a> {
    source: &'a DeltaSnapshot,
    is_previous: bool,
    child_path: String,
}

impl ViewBuilder<'_> {
    fn previous(mut self, is_previous: bool) -> Self {
        self.is_previous = is_previous;
        self
    }

    fn child(mut self, child_path: &str) -> Self {
        if !child_path.is_empty() {
            self.child_path = join_path(&self.child_path, child_path);
        }
        self
    }

    fn build(self) -> DeltaSnapshot {
        DeltaSnapshot::from_parts(
            self.source.trees.clone(),
            self.source.path.clone(),
            self.source.instance_url.clone(),
            self.child_path,
            self.is_previous,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn populate(before: Value, delta: Value) -> DeltaSnapshot {
        DeltaSnapshot::new(before, Some(delta), "/foo")
    }

    #[test]
    fn current_and_previous_values() {
        let snap = populate(json!({"a": "b"}), json!({"a": "c"}));
        assert_eq!(snap.val(), json!({"a": "c"}));
        assert_eq!(snap.previous().val(), json!({"a": "b"}));
        assert_eq!(snap.previous().current().val(), json!({"a": "c"}));
        assert!(snap.previous().is_previous());
    }

    #[test]
    fn child_keeps_side_and_offset() {
        let snap = populate(json!({"a": {"b": 1}}), json!({"a": {"b": 2}}));
        let child = snap.previous().child("a/b");
        assert_eq!(child.val(), json!(1));
        assert_eq!(child.current().val(), json!(2));
        assert_eq!(child.key().as_deref(), Some("b"));
        assert_eq!(child.path(), "/foo/a/b");
        assert_eq!(snap.val(), json!({"a": {"b": 2}}));
    }

    #[test]
    fn zero_and_explicit_null_are_data() {
        let zero = populate(json!(null), json!({"myKey": 0}));
        assert_eq!(zero.val(), json!({"myKey": 0}));
        assert!(zero.child("myKey").exists());

        let null = populate(json!(null), json!({"myKey": null}));
        assert_eq!(null.val(), json!({"myKey": null}));
        assert!(!null.child("myKey").exists());
    }

    #[test]
    fn deletion_is_pruned_from_current() {
        let snap = populate(json!({"a": 1, "b": 2}), json!({"a": null}));
        assert_eq!(snap.val(), json!({"b": 2}));
        assert!(snap.child("a").changed());
        assert!(!snap.child("b").changed());
        assert!(!snap.has_child("a"));
        assert!(snap.previous().has_child("a"));
    }

    #[test]
    fn val_coerces_arrays() {
        let snap = populate(json!(null), json!({"list": {"0": "a", "1": "b"}}));
        assert_eq!(snap.val(), json!({"list": ["a", "b"]}));
        assert_eq!(snap.child("list").num_children(), 0);
    }

    #[test]
    fn children_of_objects_only() {
        let snap = populate(json!({"x": 1}), json!({"y": {"z": true}}));
        assert!(snap.has_children());
        assert_eq!(snap.num_children(), 2);
        assert!(!snap.child("x").has_children());

        let mut seen = Vec::new();
        let stopped = snap.for_each(|child| {
            seen.push(child.key().unwrap_or_default());
            false
        });
        assert!(!stopped);
        assert_eq!(seen, vec!["x", "y"]);
        assert!(snap.for_each(|child| child.key().as_deref() == Some("x")));
    }

    #[test]
    fn exists_and_root_key() {
        let root = DeltaSnapshot::new(json!({}), None, "/");
        assert!(!root.exists());
        assert_eq!(root.key(), None);
        assert_eq!(root.path(), "/");
        assert!(!root.changed());
        assert_eq!(root.priority(), 0);
    }

    #[test]
    fn field_mask_rebuilds_before() {
        let after = json!({"foo": "bar", "num": 2, "obj": {"a": 1, "b": 2}});
        let snap = DeltaSnapshot::with_field_mask(json!({}), Some(after.clone()), "/", Some("num,obj.a"));
        assert_eq!(snap.previous().val(), json!({"foo": "bar", "obj": {"b": 2}}));
        assert_eq!(snap.val(), after);
    }

    #[test]
    fn into_change_splits_sides() {
        let change = populate(json!({"n": 1}), json!({"n": 2})).into_change();
        assert_eq!(change.before.val(), json!({"n": 1}));
        assert_eq!(change.after.val(), json!({"n": 2}));
        assert!(change.after.changed());
    }

    #[test]
    fn val_returns_independent_copies() {
        let snap = populate(json!(null), json!({"a": 1}));
        let mut copy = snap.val();
        copy["a"] = json!(99);
        assert_eq!(snap.val(), json!({"a": 1}));
    }
}
