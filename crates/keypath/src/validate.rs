//! Size limits for keypaths.

use crate::types::Segment;
use crate::KeyPathError;

/// Maximum allowed keypath string length, after whitespace is stripped.
pub const MAX_KEY_PATH_LENGTH: usize = 1024;

/// Maximum allowed number of segments.
pub const MAX_SEGMENTS: usize = 256;

/// Bounds applied while parsing keypath strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_key_path_len: usize,
    pub max_segments: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_key_path_len: MAX_KEY_PATH_LENGTH,
            max_segments: MAX_SEGMENTS,
        }
    }
}

impl Limits {
    pub fn unbounded() -> Self {
        Self {
            max_key_path_len: usize::MAX,
            max_segments: usize::MAX,
        }
    }
}

/// Validate the length of a keypath string.
///
/// # Example
///
/// ```
/// use keypath::{validate_key_path, Limits};
///
/// validate_key_path("items.id=1", &Limits::default()).unwrap();
/// validate_key_path(&"a".repeat(2000), &Limits::default()).unwrap_err();
/// ```
pub fn validate_key_path(key_path: &str, limits: &Limits) -> Result<(), KeyPathError> {
    if key_path.len() > limits.max_key_path_len {
        return Err(KeyPathError::KeyPathTooLong {
            len: key_path.len(),
            max: limits.max_key_path_len,
        });
    }
    Ok(())
}

/// Validate the depth of a segment sequence.
pub fn validate_segments(path: &[Segment], limits: &Limits) -> Result<(), KeyPathError> {
    if path.len() > limits.max_segments {
        return Err(KeyPathError::PathTooLong {
            len: path.len(),
            max: limits.max_segments,
        });
    }
    Ok(())
}

/// Validate a structured path against both limits.
///
/// The length is measured on the dotted form, so a path and the string it
/// formats to pass or fail together.
pub fn validate_path(path: &[Segment], limits: &Limits) -> Result<(), KeyPathError> {
    let len = formatted_len(path);
    if len > limits.max_key_path_len {
        return Err(KeyPathError::KeyPathTooLong {
            len,
            max: limits.max_key_path_len,
        });
    }
    validate_segments(path, limits)
}

fn formatted_len(path: &[Segment]) -> usize {
    let text: usize = path
        .iter()
        .map(|segment| match segment {
            Segment::Key(name) => name.len(),
            Segment::Index(index) => index.to_string().len(),
            Segment::Match { attr, value } => attr.len() + 1 + value.len(),
        })
        .sum();
    text + path.len().saturating_sub(1)
}
