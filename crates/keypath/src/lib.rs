//! Keypath-addressed edits on immutable trees.
//!
//! A [`TreeValue`] is a JSON-like tree of maps, lists and scalar leaves. The
//! four operations address a node with a dotted keypath and never modify
//! their input: [`get`] reads, while [`set`], [`delete`] and [`extend`]
//! return a new root that shares every untouched subtree with the old one.
//!
//! List elements can be addressed by position (`items.0`) or by the first
//! element whose field stringifies to a value (`items.id=2`).
//!
//! # Example
//!
//! ```
//! use keypath::{delete, get, set, TreeValue};
//! use serde_json::json;
//!
//! let root = TreeValue::from(json!({
//!     "items": [{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]
//! }));
//!
//! let next = set(&root, "items.id=2.name", TreeValue::from("x")).unwrap();
//! assert_eq!(get(&next, "items.1.name").unwrap(), Some(&TreeValue::from("x")));
//!
//! // The untouched element is the same allocation in both trees.
//! assert!(TreeValue::ptr_eq(
//!     get(&root, "items.0").unwrap().unwrap(),
//!     get(&next, "items.0").unwrap().unwrap(),
//! ));
//!
//! let pruned = delete(&next, "items.id=1").unwrap();
//! assert_eq!(pruned, TreeValue::from(json!({"items": [{"id": 2, "name": "x"}]})));
//! ```

use thiserror::Error;

mod edit;
mod find;
mod get;
pub mod types;
pub mod util;
pub mod validate;
pub mod value;

pub use edit::{delete, extend, merge, set};
pub use get::get;
pub use types::{KeyPath, Segment, ToKeyPath};
pub use util::{
    format_key_path, is_child, is_root, is_valid_index, parent, parse_key_path,
    parse_key_path_with,
};
pub use validate::{validate_key_path, validate_path, validate_segments, Limits};
pub use value::{NodeKind, Opaque, Scalar, TreeList, TreeMap, TreeValue};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyPathError {
    #[error("missing key `{key}`")]
    MissingKey { key: String },
    #[error("index {index} out of range for a list of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("no element with {attr}={value}")]
    PredicateNotFound { attr: String, value: String },
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: NodeKind,
    },
    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },
    #[error("segment `{segment}` has no attribute before `=`")]
    EmptyPredicateAttribute { segment: String },
    #[error("segment `{segment}` has no value after `=`")]
    EmptyPredicateValue { segment: String },
    #[error("invalid segment `{segment}`")]
    InvalidSegment { segment: String },
    #[error("keypath is {len} characters long, the limit is {max}")]
    KeyPathTooLong { len: usize, max: usize },
    #[error("keypath has {len} segments, the limit is {max}")]
    PathTooLong { len: usize, max: usize },
    #[error("cannot delete the root")]
    RootDelete,
    #[error("the root keypath has no parent")]
    NoParent,
}

impl KeyPathError {
    /// `true` for the errors [`get`] reports as an absent value.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            KeyPathError::MissingKey { .. }
                | KeyPathError::IndexOutOfRange { .. }
                | KeyPathError::PredicateNotFound { .. }
        )
    }

    /// `true` for errors raised while parsing or validating a keypath,
    /// before any tree is touched.
    pub fn is_malformed_path(&self) -> bool {
        matches!(
            self,
            KeyPathError::EmptySegment { .. }
                | KeyPathError::EmptyPredicateAttribute { .. }
                | KeyPathError::EmptyPredicateValue { .. }
                | KeyPathError::InvalidSegment { .. }
                | KeyPathError::KeyPathTooLong { .. }
                | KeyPathError::PathTooLong { .. }
        )
    }
}
