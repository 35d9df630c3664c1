use crate::find::locate;
use crate::types::ToKeyPath;
use crate::util::format_key_path;
use crate::value::TreeValue;
use crate::KeyPathError;

/// Get a value from a tree by keypath.
///
/// Returns `Ok(None)` when the path doesn't exist: a missing key, an index
/// past the end, or a predicate with no match. Traversing a scalar, or
/// addressing a node with the wrong kind of segment, is an error.
///
/// `null` is the one scalar a read passes through: a `null` reached before
/// the last segment reads as an absent subtree and yields `Ok(None)`, not
/// [`KeyPathError::TypeMismatch`]. Edits get no such leniency; [`set`],
/// [`delete`] and [`extend`] through a `null` fail with `TypeMismatch`.
///
/// [`set`]: crate::set
/// [`delete`]: crate::delete
/// [`extend`]: crate::extend
///
/// # Example
///
/// ```
/// use keypath::{get, TreeValue};
/// use serde_json::json;
///
/// let root = TreeValue::from(json!({"items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]}));
/// assert_eq!(get(&root, "items.id=2.name").unwrap(), Some(&TreeValue::from("b")));
/// assert_eq!(get(&root, "items.id=9.name").unwrap(), None);
/// assert!(get(&root, "items.0.name.first").is_err());
/// ```
pub fn get<'a, P>(root: &'a TreeValue, path: &P) -> Result<Option<&'a TreeValue>, KeyPathError>
where
    P: ToKeyPath + ?Sized,
{
    let segments = path.to_segments()?;
    tracing::trace!(
        target: "keypath::engine",
        op = "get",
        path = %format_key_path(&segments),
        "resolving keypath"
    );

    let mut current = root;
    for segment in segments.iter() {
        if current.is_null() {
            return Ok(None);
        }
        match locate(current, segment) {
            Ok((_, child)) => current = child,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => {
                tracing::debug!(
                    target: "keypath::engine",
                    op = "get",
                    path = %format_key_path(&segments),
                    error = %err,
                    "keypath traversal failed"
                );
                return Err(err);
            }
        }
    }
    Ok(Some(current))
}
