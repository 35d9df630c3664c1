//! Type definitions for keypaths.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::util::{format_key_path, parse_key_path, parse_key_path_with};
use crate::validate::{validate_path, Limits};
use crate::KeyPathError;

/// A step in a keypath.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A map field name.
    Key(String),
    /// A list position.
    Index(usize),
    /// The first list element whose `attr` field stringifies to `value`.
    Match { attr: String, value: String },
}

impl Segment {
    pub fn key(name: impl Into<String>) -> Self {
        Segment::Key(name.into())
    }

    pub fn matching(attr: impl Into<String>, value: impl Into<String>) -> Self {
        Segment::Match {
            attr: attr.into(),
            value: value.into(),
        }
    }

    /// `true` for segments that only address lists.
    pub fn is_array_locator(&self) -> bool {
        matches!(self, Segment::Index(_) | Segment::Match { .. })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(name) => f.write_str(name),
            Segment::Index(index) => write!(f, "{index}"),
            Segment::Match { attr, value } => write!(f, "{attr}={value}"),
        }
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

/// Taken verbatim as a field name, without parsing.
impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Segment::Key(name.to_string())
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Segment::Key(name)
    }
}

/// An ordered sequence of segments. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<Segment>);

impl KeyPath {
    pub fn root() -> Self {
        KeyPath(Vec::new())
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        KeyPath(segments)
    }

    /// Parse the dotted string form with the default [`Limits`].
    pub fn parse(input: &str) -> Result<Self, KeyPathError> {
        parse_key_path(input)
    }

    pub fn parse_with(input: &str, limits: &Limits) -> Result<Self, KeyPathError> {
        parse_key_path_with(input, limits)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<Segment>) {
        self.0.push(segment.into());
    }

    /// A new path made of `self` followed by `tail`.
    pub fn join(&self, tail: &KeyPath) -> KeyPath {
        let mut segments = Vec::with_capacity(self.len() + tail.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(&tail.0);
        KeyPath(segments)
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_key_path(&self.0))
    }
}

impl FromStr for KeyPath {
    type Err = KeyPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_key_path(s)
    }
}

impl From<Vec<Segment>> for KeyPath {
    fn from(segments: Vec<Segment>) -> Self {
        KeyPath(segments)
    }
}

impl FromIterator<Segment> for KeyPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        KeyPath(iter.into_iter().collect())
    }
}

impl AsRef<[Segment]> for KeyPath {
    fn as_ref(&self) -> &[Segment] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a KeyPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Anything an operation accepts as a keypath.
///
/// Strings are parsed on every call. Structured forms are borrowed after
/// the same default [`Limits`] checks a string gets.
pub trait ToKeyPath {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError>;
}

fn borrow_checked(segments: &[Segment]) -> Result<Cow<'_, [Segment]>, KeyPathError> {
    validate_path(segments, &Limits::default())?;
    Ok(Cow::Borrowed(segments))
}

impl ToKeyPath for str {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        parse_key_path(self).map(|path| Cow::Owned(path.into_segments()))
    }
}

impl ToKeyPath for String {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        self.as_str().to_segments()
    }
}

impl ToKeyPath for KeyPath {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        borrow_checked(&self.0)
    }
}

impl ToKeyPath for [Segment] {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        borrow_checked(self)
    }
}

impl<const N: usize> ToKeyPath for [Segment; N] {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        borrow_checked(self.as_slice())
    }
}

impl ToKeyPath for Vec<Segment> {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        borrow_checked(self.as_slice())
    }
}

impl<T: ToKeyPath + ?Sized> ToKeyPath for &T {
    fn to_segments(&self) -> Result<Cow<'_, [Segment]>, KeyPathError> {
        (**self).to_segments()
    }
}
