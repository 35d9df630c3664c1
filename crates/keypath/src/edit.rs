//! Copy-producing edits: `set`, `delete` and `extend`.
//!
//! Each edit resolves the whole path first and only then rebuilds the
//! ancestors bottom-up, so a failed edit allocates nothing visible to the
//! caller. Every ancestor on the path is cloned one level deep; all other
//! subtrees are shared with the input.

use std::borrow::Cow;
use std::sync::Arc;

use crate::find::{descend, locate, rebuild, without_child, with_child, Slot};
use crate::types::{Segment, ToKeyPath};
use crate::util::format_key_path;
use crate::value::TreeValue;
use crate::KeyPathError;

fn segments_for<'p, P>(op: &'static str, path: &'p P) -> Result<Cow<'p, [Segment]>, KeyPathError>
where
    P: ToKeyPath + ?Sized,
{
    let segments = path.to_segments().inspect_err(|err| {
        tracing::debug!(target: "keypath::engine", op, error = %err, "keypath rejected");
    })?;
    tracing::trace!(
        target: "keypath::engine",
        op,
        path = %format_key_path(&segments),
        "applying edit"
    );
    Ok(segments)
}

fn log_failure(op: &'static str, segments: &[Segment], err: &KeyPathError) {
    tracing::debug!(
        target: "keypath::engine",
        op,
        path = %format_key_path(segments),
        error = %err,
        "edit failed"
    );
}

/// Return a new root with `value` installed at `path`.
///
/// Every segment but the last must resolve. The last one may name a new map
/// key; list elements must already exist. The empty path replaces the root.
///
/// # Example
///
/// ```
/// use keypath::{set, TreeValue};
/// use serde_json::json;
///
/// let root = TreeValue::from(json!({"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}));
/// let next = set(&root, "items.id=2.name", TreeValue::from("x")).unwrap();
/// assert_eq!(next, TreeValue::from(json!({"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "x"}]})));
/// ```
pub fn set<P>(root: &TreeValue, path: &P, value: TreeValue) -> Result<TreeValue, KeyPathError>
where
    P: ToKeyPath + ?Sized,
{
    let segments = segments_for("set", path)?;
    set_segments(root, &segments, value).inspect_err(|err| log_failure("set", &segments, err))
}

fn set_segments(
    root: &TreeValue,
    segments: &[Segment],
    value: TreeValue,
) -> Result<TreeValue, KeyPathError> {
    let Some((last, ancestors)) = segments.split_last() else {
        return Ok(value);
    };
    let (steps, parent) = descend(root, ancestors)?;
    let slot = match locate(parent, last) {
        Ok((slot, _)) => slot,
        Err(KeyPathError::MissingKey { key }) => Slot::Key(key),
        Err(err) => return Err(err),
    };
    let leaf = with_child(parent, slot, value)?;
    rebuild(steps, leaf)
}

/// Return a new root without the value at `path`.
///
/// Every segment, the last one included, must resolve. A predicate segment
/// removes the first matching element.
///
/// # Errors
///
/// [`KeyPathError::RootDelete`] for the empty path.
pub fn delete<P>(root: &TreeValue, path: &P) -> Result<TreeValue, KeyPathError>
where
    P: ToKeyPath + ?Sized,
{
    let segments = segments_for("delete", path)?;
    delete_segments(root, &segments).inspect_err(|err| log_failure("delete", &segments, err))
}

fn delete_segments(root: &TreeValue, segments: &[Segment]) -> Result<TreeValue, KeyPathError> {
    let (mut steps, _) = descend(root, segments)?;
    let Some(last) = steps.pop() else {
        return Err(KeyPathError::RootDelete);
    };
    let leaf = without_child(last.node, last.slot)?;
    rebuild(steps, leaf)
}

/// Return a new root where the value at `path` is shallow-merged with
/// `patch` (see [`merge`]).
///
/// # Example
///
/// ```
/// use keypath::{extend, TreeValue};
/// use serde_json::json;
///
/// let root = TreeValue::from(json!({"items": [{"id": 1, "name": "a"}]}));
/// let next = extend(&root, "items.id=1", TreeValue::from(json!({"tag": "new"}))).unwrap();
/// assert_eq!(next, TreeValue::from(json!({"items": [{"id": 1, "name": "a", "tag": "new"}]})));
/// ```
pub fn extend<P>(root: &TreeValue, path: &P, patch: TreeValue) -> Result<TreeValue, KeyPathError>
where
    P: ToKeyPath + ?Sized,
{
    let segments = segments_for("extend", path)?;
    extend_segments(root, &segments, &patch).inspect_err(|err| log_failure("extend", &segments, err))
}

fn extend_segments(
    root: &TreeValue,
    segments: &[Segment],
    patch: &TreeValue,
) -> Result<TreeValue, KeyPathError> {
    let (steps, current) = descend(root, segments)?;
    let merged = merge(current, patch)?;
    rebuild(steps, merged)
}

/// Shallow merge of two containers.
///
/// Lists concatenate, `patch` elements last. Maps overlay key by key:
/// existing keys keep their position and take the patch value, new keys are
/// appended. Children are shared, not copied. Any other pairing is a
/// `TypeMismatch`.
///
/// ```
/// use keypath::{merge, TreeValue};
/// use serde_json::json;
///
/// let list = merge(&TreeValue::from(json!([1, 2])), &TreeValue::from(json!([2, 3]))).unwrap();
/// assert_eq!(list, TreeValue::from(json!([1, 2, 2, 3])));
///
/// let map = merge(&TreeValue::from(json!({"a": 1, "b": 2})), &TreeValue::from(json!({"b": 3, "c": 4}))).unwrap();
/// assert_eq!(map, TreeValue::from(json!({"a": 1, "b": 3, "c": 4})));
///
/// assert!(merge(&TreeValue::from(json!([])), &TreeValue::from(json!({}))).is_err());
/// ```
pub fn merge(base: &TreeValue, patch: &TreeValue) -> Result<TreeValue, KeyPathError> {
    match (base, patch) {
        (TreeValue::List(items), TreeValue::List(more)) => {
            let mut list = Vec::with_capacity(items.len() + more.len());
            list.extend(items.iter().cloned());
            list.extend(more.iter().cloned());
            Ok(TreeValue::List(Arc::new(list)))
        }
        (TreeValue::Map(fields), TreeValue::Map(overrides)) => {
            let mut map = (**fields).clone();
            for (key, value) in overrides.iter() {
                map.insert(key.clone(), value.clone());
            }
            Ok(TreeValue::Map(Arc::new(map)))
        }
        (TreeValue::List(_), other) => Err(KeyPathError::TypeMismatch {
            expected: "list",
            found: other.kind(),
        }),
        (TreeValue::Map(_), other) => Err(KeyPathError::TypeMismatch {
            expected: "map",
            found: other.kind(),
        }),
        (scalar, _) => Err(KeyPathError::TypeMismatch {
            expected: "map or list",
            found: scalar.kind(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get::get;
    use crate::value::NodeKind;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TreeValue {
        TreeValue::from(value)
    }

    fn items() -> TreeValue {
        tree(json!({"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}))
    }

    #[test]
    fn test_set_replaces_root_on_empty_path() {
        let next = set(&items(), "", tree(json!({"reset": true}))).unwrap();
        assert_eq!(next, tree(json!({"reset": true})));
    }

    #[test]
    fn test_set_through_predicate() {
        let root = items();
        let next = set(&root, "items.id=2.name", TreeValue::from("x")).unwrap();
        assert_eq!(
            next,
            tree(json!({"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "x"}]}))
        );
        let before = &root.as_map().unwrap()["items"].as_list().unwrap()[0];
        let after = &next.as_map().unwrap()["items"].as_list().unwrap()[0];
        assert!(TreeValue::ptr_eq(before, after));
    }

    #[test]
    fn test_set_creates_final_key() {
        let next = set(&items(), "items.0.tag", TreeValue::from("new")).unwrap();
        assert_eq!(get(&next, "items.0.tag").unwrap(), Some(&TreeValue::from("new")));
        let keys: Vec<&String> = get(&next, "items.0").unwrap().unwrap().as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "name", "tag"]);
    }

    #[test]
    fn test_set_requires_intermediate_keys() {
        assert_eq!(
            set(&items(), "missing.tag", TreeValue::from(1i64)),
            Err(KeyPathError::MissingKey {
                key: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_set_does_not_create_list_elements() {
        assert_eq!(
            set(&items(), "items.2", TreeValue::from(1i64)),
            Err(KeyPathError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            set(&items(), "items.id=3", TreeValue::from(1i64)),
            Err(KeyPathError::PredicateNotFound {
                attr: "id".to_string(),
                value: "3".to_string()
            })
        );
    }

    #[test]
    fn test_set_through_scalar_fails() {
        assert_eq!(
            set(&items(), "items.0.name.first", TreeValue::from("x")),
            Err(KeyPathError::TypeMismatch {
                expected: "map or list",
                found: NodeKind::String
            })
        );
    }

    #[test]
    fn test_set_leaves_input_untouched() {
        let root = items();
        let snapshot = serde_json::Value::from(&root);
        let _ = set(&root, "items.id=1.name", TreeValue::from("z")).unwrap();
        assert_eq!(serde_json::Value::from(&root), snapshot);
    }

    #[test]
    fn test_delete_by_predicate() {
        let next = delete(&items(), "items.id=1").unwrap();
        assert_eq!(next, tree(json!({"items": [{"id": 2, "name": "b"}]})));
    }

    #[test]
    fn test_delete_map_key() {
        let next = delete(&items(), "items.1.name").unwrap();
        assert_eq!(
            next,
            tree(json!({"items": [{"id": 1, "name": "a"}, {"id": 2}]}))
        );
    }

    #[test]
    fn test_delete_requires_existing_target() {
        assert_eq!(
            delete(&items(), "items.0.missing"),
            Err(KeyPathError::MissingKey {
                key: "missing".to_string()
            })
        );
        assert_eq!(
            delete(&items(), "items.9"),
            Err(KeyPathError::IndexOutOfRange { index: 9, len: 2 })
        );
    }

    #[test]
    fn test_delete_root_is_error() {
        assert_eq!(delete(&items(), ""), Err(KeyPathError::RootDelete));
    }

    #[test]
    fn test_extend_map_element() {
        let root = items();
        let next = extend(&root, "items.id=1", tree(json!({"tag": "new"}))).unwrap();
        assert_eq!(
            get(&next, "items.0").unwrap(),
            Some(&tree(json!({"id": 1, "name": "a", "tag": "new"})))
        );
        assert!(TreeValue::ptr_eq(
            get(&root, "items.1").unwrap().unwrap(),
            get(&next, "items.1").unwrap().unwrap()
        ));
    }

    #[test]
    fn test_extend_list_appends() {
        let root = items();
        let next = extend(&root, "items", tree(json!([{"id": 3}]))).unwrap();
        assert_eq!(get(&next, "items.2.id").unwrap(), Some(&TreeValue::from(3i64)));
        assert_eq!(next.as_map().unwrap()["items"].as_list().unwrap().len(), 3);
    }

    #[test]
    fn test_extend_root() {
        let next = extend(&tree(json!({"a": 1})), "", tree(json!({"b": 2}))).unwrap();
        assert_eq!(next, tree(json!({"a": 1, "b": 2})));

        let next = extend(&tree(json!([1])), "", tree(json!([1]))).unwrap();
        assert_eq!(next, tree(json!([1, 1])));
    }

    #[test]
    fn test_extend_shape_mismatch() {
        assert_eq!(
            extend(&items(), "items", tree(json!({"a": 1}))),
            Err(KeyPathError::TypeMismatch {
                expected: "list",
                found: NodeKind::Map
            })
        );
        assert_eq!(
            extend(&items(), "items.0.name", tree(json!({"a": 1}))),
            Err(KeyPathError::TypeMismatch {
                expected: "map or list",
                found: NodeKind::String
            })
        );
    }

    #[test]
    fn test_extend_requires_existing_target() {
        assert_eq!(
            extend(&items(), "other", tree(json!({}))),
            Err(KeyPathError::MissingKey {
                key: "other".to_string()
            })
        );
    }

    #[test]
    fn test_merge_overlay_keeps_positions() {
        let merged = merge(&tree(json!({"a": 1, "b": 2})), &tree(json!({"c": 3, "a": 9}))).unwrap();
        let keys: Vec<&String> = merged.as_map().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged, tree(json!({"a": 9, "b": 2, "c": 3})));
    }
}
