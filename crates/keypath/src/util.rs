//! Keypath parsing, formatting and path relationships.

use crate::types::{KeyPath, Segment};
use crate::validate::{validate_key_path, validate_segments, Limits};
use crate::KeyPathError;

/// Parse a dotted keypath with the default [`Limits`].
///
/// Whitespace anywhere in the input is dropped first. The empty string is
/// the root. There is no escaping: a field name can't contain `.` or `=`.
///
/// # Example
///
/// ```
/// use keypath::{parse_key_path, Segment};
///
/// let path = parse_key_path("joints.name=header.value").unwrap();
/// assert_eq!(
///     path.segments(),
///     &[
///         Segment::key("joints"),
///         Segment::matching("name", "header"),
///         Segment::key("value"),
///     ]
/// );
/// assert!(parse_key_path(" ").unwrap().is_empty());
/// assert!(parse_key_path("items.id=").is_err());
/// ```
pub fn parse_key_path(input: &str) -> Result<KeyPath, KeyPathError> {
    parse_key_path_with(input, &Limits::default())
}

pub fn parse_key_path_with(input: &str, limits: &Limits) -> Result<KeyPath, KeyPathError> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    validate_key_path(&compact, limits)?;
    if compact.is_empty() {
        return Ok(KeyPath::root());
    }

    let segments = compact
        .split('.')
        .enumerate()
        .map(|(position, raw)| parse_segment(raw, position))
        .collect::<Result<Vec<_>, _>>()?;
    validate_segments(&segments, limits)?;
    Ok(KeyPath::new(segments))
}

fn parse_segment(raw: &str, position: usize) -> Result<Segment, KeyPathError> {
    if raw.is_empty() {
        return Err(KeyPathError::EmptySegment { position });
    }
    let Some((attr, value)) = raw.split_once('=') else {
        // Digit strings too large for usize stay field names.
        if is_valid_index(raw) {
            if let Ok(index) = raw.parse() {
                return Ok(Segment::Index(index));
            }
        }
        return Ok(Segment::Key(raw.to_string()));
    };
    if value.contains('=') {
        return Err(KeyPathError::InvalidSegment {
            segment: raw.to_string(),
        });
    }
    if attr.is_empty() {
        return Err(KeyPathError::EmptyPredicateAttribute {
            segment: raw.to_string(),
        });
    }
    if value.is_empty() {
        return Err(KeyPathError::EmptyPredicateValue {
            segment: raw.to_string(),
        });
    }
    Ok(Segment::matching(attr, value))
}

/// Format segments back into the dotted form.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use keypath::{format_key_path, Segment};
///
/// assert_eq!(format_key_path(&[]), "");
/// assert_eq!(
///     format_key_path(&[Segment::key("items"), Segment::matching("id", "2"), Segment::Index(0)]),
///     "items.id=2.0"
/// );
/// ```
pub fn format_key_path(path: &[Segment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(&segment.to_string());
    }
    out
}

/// Check if a path points to the root value.
pub fn is_root(path: &[Segment]) -> bool {
    path.is_empty()
}

/// Check if `parent` path is a strict prefix of the `child` path.
///
/// # Example
///
/// ```
/// use keypath::{is_child, parse_key_path};
///
/// let parent = parse_key_path("items").unwrap();
/// let child = parse_key_path("items.id=1").unwrap();
/// assert!(is_child(parent.segments(), child.segments()));
/// assert!(!is_child(child.segments(), parent.segments()));
/// ```
pub fn is_child(parent: &[Segment], child: &[Segment]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

/// Get the parent path of a given path.
///
/// # Errors
///
/// Returns [`KeyPathError::NoParent`] for the root path.
pub fn parent(path: &[Segment]) -> Result<KeyPath, KeyPathError> {
    match path.split_last() {
        Some((_, init)) => Ok(KeyPath::new(init.to_vec())),
        None => Err(KeyPathError::NoParent),
    }
}

/// Check if a string is a non-negative decimal integer without leading
/// zeros.
///
/// ```
/// use keypath::is_valid_index;
///
/// assert!(is_valid_index("0"));
/// assert!(is_valid_index("42"));
/// assert!(!is_valid_index("007"));
/// assert!(!is_valid_index("-1"));
/// assert!(!is_valid_index(""));
/// ```
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    match bytes {
        [] => false,
        [b'0', _, ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}
