//! Segment resolution and path rebuilding shared by every operation.

use std::sync::Arc;

use crate::types::Segment;
use crate::util::is_valid_index;
use crate::value::TreeValue;
use crate::KeyPathError;

/// Where a child sits inside its container, once a segment is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Slot {
    Key(String),
    Index(usize),
}

/// A container on the way down and the slot that was taken out of it.
pub(crate) struct Step<'a> {
    pub node: &'a TreeValue,
    pub slot: Slot,
}

/// Resolve one segment against `node`.
///
/// Misses are reported as `MissingKey`, `IndexOutOfRange` or
/// `PredicateNotFound`; addressing a node with the wrong kind of segment is
/// a `TypeMismatch`.
pub(crate) fn locate<'a>(
    node: &'a TreeValue,
    segment: &Segment,
) -> Result<(Slot, &'a TreeValue), KeyPathError> {
    match node {
        TreeValue::Map(map) => {
            let key = match segment {
                Segment::Key(key) => key.clone(),
                Segment::Index(index) => index.to_string(),
                Segment::Match { .. } => {
                    return Err(KeyPathError::TypeMismatch {
                        expected: "list",
                        found: node.kind(),
                    })
                }
            };
            match map.get(&key) {
                Some(child) => Ok((Slot::Key(key), child)),
                None => Err(KeyPathError::MissingKey { key }),
            }
        }
        TreeValue::List(list) => {
            let index = match segment {
                Segment::Index(index) => *index,
                Segment::Key(key) => match key.parse::<usize>() {
                    Ok(index) if is_valid_index(key) => index,
                    _ => {
                        return Err(KeyPathError::TypeMismatch {
                            expected: "map",
                            found: node.kind(),
                        })
                    }
                },
                Segment::Match { attr, value } => list
                    .iter()
                    .position(|element| attr_matches(element, attr, value))
                    .ok_or_else(|| KeyPathError::PredicateNotFound {
                        attr: attr.clone(),
                        value: value.clone(),
                    })?,
            };
            match list.get(index) {
                Some(child) => Ok((Slot::Index(index), child)),
                None => Err(KeyPathError::IndexOutOfRange {
                    index,
                    len: list.len(),
                }),
            }
        }
        TreeValue::Scalar(_) => Err(KeyPathError::TypeMismatch {
            expected: "map or list",
            found: node.kind(),
        }),
    }
}

/// `true` when `element` is a map whose `attr` field stringifies to `value`.
fn attr_matches(element: &TreeValue, attr: &str, value: &str) -> bool {
    element
        .as_map()
        .and_then(|fields| fields.get(attr))
        .and_then(TreeValue::stringify)
        .is_some_and(|text| text == value)
}

/// Walk every segment from `root`, failing on the first one that doesn't
/// resolve. Returns the containers visited with their slots, and the node
/// the last segment reached.
pub(crate) fn descend<'a>(
    root: &'a TreeValue,
    segments: &[Segment],
) -> Result<(Vec<Step<'a>>, &'a TreeValue), KeyPathError> {
    let mut steps = Vec::with_capacity(segments.len());
    let mut current = root;
    for segment in segments {
        let (slot, child) = locate(current, segment)?;
        steps.push(Step {
            node: current,
            slot,
        });
        current = child;
    }
    Ok((steps, current))
}

/// Shallow clone of `node` with `child` installed at `slot`.
///
/// A new map key is appended; an existing one keeps its position.
pub(crate) fn with_child(
    node: &TreeValue,
    slot: Slot,
    child: TreeValue,
) -> Result<TreeValue, KeyPathError> {
    match (node, slot) {
        (TreeValue::Map(map), Slot::Key(key)) => {
            let mut map = (**map).clone();
            map.insert(key, child);
            Ok(TreeValue::Map(Arc::new(map)))
        }
        (TreeValue::List(list), Slot::Index(index)) => {
            let mut list = (**list).clone();
            let len = list.len();
            let entry = list
                .get_mut(index)
                .ok_or(KeyPathError::IndexOutOfRange { index, len })?;
            *entry = child;
            Ok(TreeValue::List(Arc::new(list)))
        }
        (node, slot) => Err(slot_mismatch(node, &slot)),
    }
}

/// Shallow clone of `node` with the child at `slot` removed. Remaining map
/// keys keep their order.
pub(crate) fn without_child(node: &TreeValue, slot: Slot) -> Result<TreeValue, KeyPathError> {
    match (node, slot) {
        (TreeValue::Map(map), Slot::Key(key)) => {
            let mut map = (**map).clone();
            if map.shift_remove(&key).is_none() {
                return Err(KeyPathError::MissingKey { key });
            }
            Ok(TreeValue::Map(Arc::new(map)))
        }
        (TreeValue::List(list), Slot::Index(index)) => {
            if index >= list.len() {
                return Err(KeyPathError::IndexOutOfRange {
                    index,
                    len: list.len(),
                });
            }
            let mut list = (**list).clone();
            list.remove(index);
            Ok(TreeValue::List(Arc::new(list)))
        }
        (node, slot) => Err(slot_mismatch(node, &slot)),
    }
}

fn slot_mismatch(node: &TreeValue, slot: &Slot) -> KeyPathError {
    let expected = match (node, slot) {
        (TreeValue::Scalar(_), _) => "map or list",
        (_, Slot::Key(_)) => "map",
        (_, Slot::Index(_)) => "list",
    };
    KeyPathError::TypeMismatch {
        expected,
        found: node.kind(),
    }
}

/// Rebuild the ancestors in `steps` bottom-up around a new `leaf`.
pub(crate) fn rebuild(steps: Vec<Step<'_>>, leaf: TreeValue) -> Result<TreeValue, KeyPathError> {
    steps
        .into_iter()
        .rev()
        .try_fold(leaf, |child, step| with_child(step.node, step.slot, child))
}
