//! The tree value the engine reads and rewrites.
//!
//! Containers hold their children behind an [`Arc`], so cloning a
//! [`TreeValue`] is a reference-count bump and two trees can share any
//! number of subtrees. Edits clone one container level at a time and reuse
//! every other child as is.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};

/// Children of a map node, in insertion order.
pub type TreeMap = IndexMap<String, TreeValue>;

/// Children of a list node.
pub type TreeList = Vec<TreeValue>;

/// A JSON-like tree: a map, a list, or a scalar leaf.
#[derive(Clone, PartialEq)]
pub enum TreeValue {
    Map(Arc<TreeMap>),
    List(Arc<TreeList>),
    Scalar(Scalar),
}

/// Leaf values.
#[derive(Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Opaque(Opaque),
}

/// A leaf payload the engine carries around without inspecting.
///
/// Two opaque leaves are equal only when they are the same allocation.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(payload: T) -> Self {
        Self(Arc::new(payload))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        Opaque::ptr_eq(self, other)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

/// The shape of a node, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Map,
    List,
    Null,
    Bool,
    Number,
    String,
    Opaque,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Map => "map",
            NodeKind::List => "list",
            NodeKind::Null => "null",
            NodeKind::Bool => "boolean",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Opaque => "opaque value",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TreeValue {
    pub fn null() -> Self {
        TreeValue::Scalar(Scalar::Null)
    }

    pub fn from_map(map: TreeMap) -> Self {
        TreeValue::Map(Arc::new(map))
    }

    pub fn from_list(list: TreeList) -> Self {
        TreeValue::List(Arc::new(list))
    }

    pub fn opaque<T: Any + Send + Sync>(payload: T) -> Self {
        TreeValue::Scalar(Scalar::Opaque(Opaque::new(payload)))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TreeValue::Map(_) => NodeKind::Map,
            TreeValue::List(_) => NodeKind::List,
            TreeValue::Scalar(scalar) => scalar.kind(),
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, TreeValue::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TreeValue::List(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, TreeValue::Scalar(Scalar::Null))
    }

    pub fn as_map(&self) -> Option<&TreeMap> {
        match self {
            TreeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[TreeValue]> {
        match self {
            TreeValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            TreeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TreeValue::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` when both values are the same allocation.
    ///
    /// Containers and strings compare by pointer. Inline scalars (null,
    /// booleans, numbers) have no allocation and compare by value.
    pub fn ptr_eq(a: &TreeValue, b: &TreeValue) -> bool {
        match (a, b) {
            (TreeValue::Map(x), TreeValue::Map(y)) => Arc::ptr_eq(x, y),
            (TreeValue::List(x), TreeValue::List(y)) => Arc::ptr_eq(x, y),
            (TreeValue::Scalar(Scalar::String(x)), TreeValue::Scalar(Scalar::String(y))) => {
                Arc::ptr_eq(x, y)
            }
            (TreeValue::Scalar(x), TreeValue::Scalar(y)) => x == y,
            _ => false,
        }
    }

    /// Canonical text used when a predicate segment compares an attribute.
    ///
    /// Containers and opaque leaves have no text form.
    pub fn stringify(&self) -> Option<Cow<'_, str>> {
        match self {
            TreeValue::Scalar(scalar) => scalar.stringify(),
            _ => None,
        }
    }
}

impl Default for TreeValue {
    fn default() -> Self {
        TreeValue::null()
    }
}

impl Scalar {
    pub fn kind(&self) -> NodeKind {
        match self {
            Scalar::Null => NodeKind::Null,
            Scalar::Bool(_) => NodeKind::Bool,
            Scalar::Number(_) => NodeKind::Number,
            Scalar::String(_) => NodeKind::String,
            Scalar::Opaque(_) => NodeKind::Opaque,
        }
    }

    /// Canonical text form: integers in decimal, floats in their shortest
    /// round-trip form with integral floats printed as integers, booleans as
    /// `true`/`false`, `null` as `null`.
    ///
    /// Floats at or above `1e21` in magnitude, or below `1e-6`, use exponent
    /// form with a signed exponent (`1e+21`, `1.5e-7`).
    pub fn stringify(&self) -> Option<Cow<'_, str>> {
        match self {
            Scalar::Null => Some(Cow::Borrowed("null")),
            Scalar::Bool(true) => Some(Cow::Borrowed("true")),
            Scalar::Bool(false) => Some(Cow::Borrowed("false")),
            Scalar::Number(n) => Some(Cow::Owned(canonical_number(n))),
            Scalar::String(s) => Some(Cow::Borrowed(s)),
            Scalar::Opaque(_) => None,
        }
    }
}

fn canonical_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // -0.0 prints as "-0"
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => exponent_form(f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Shortest digits with an explicit exponent sign, e.g. `1e+21`, `1.5e-7`.
fn exponent_form(f: f64) -> String {
    let text = format!("{f:e}");
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => text,
    }
}

impl fmt::Debug for TreeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeValue::Map(map) => f.debug_map().entries(map.iter()).finish(),
            TreeValue::List(list) => f.debug_list().entries(list.iter()).finish(),
            TreeValue::Scalar(scalar) => fmt::Debug::fmt(scalar, f),
        }
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s:?}"),
            Scalar::Opaque(o) => fmt::Debug::fmt(o, f),
        }
    }
}

// ── Conversions ───────────────────────────────────────────────────────────

impl From<Value> for TreeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TreeValue::null(),
            Value::Bool(b) => TreeValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => TreeValue::Scalar(Scalar::Number(n)),
            Value::String(s) => TreeValue::Scalar(Scalar::String(s.into())),
            Value::Array(items) => items.into_iter().map(TreeValue::from).collect(),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, TreeValue::from(v)))
                .collect(),
        }
    }
}

impl From<&TreeValue> for Value {
    fn from(value: &TreeValue) -> Self {
        match value {
            TreeValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
            TreeValue::List(list) => Value::Array(list.iter().map(Value::from).collect()),
            TreeValue::Scalar(Scalar::Null) | TreeValue::Scalar(Scalar::Opaque(_)) => Value::Null,
            TreeValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            TreeValue::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            TreeValue::Scalar(Scalar::String(s)) => Value::String(s.to_string()),
        }
    }
}

impl From<TreeValue> for Value {
    fn from(value: TreeValue) -> Self {
        Value::from(&value)
    }
}

impl From<Scalar> for TreeValue {
    fn from(scalar: Scalar) -> Self {
        TreeValue::Scalar(scalar)
    }
}

impl From<bool> for TreeValue {
    fn from(b: bool) -> Self {
        TreeValue::Scalar(Scalar::Bool(b))
    }
}

impl From<i64> for TreeValue {
    fn from(n: i64) -> Self {
        TreeValue::Scalar(Scalar::Number(n.into()))
    }
}

impl From<u64> for TreeValue {
    fn from(n: u64) -> Self {
        TreeValue::Scalar(Scalar::Number(n.into()))
    }
}

/// Non-finite floats have no JSON form and become `null`.
impl From<f64> for TreeValue {
    fn from(f: f64) -> Self {
        Number::from_f64(f)
            .map(|n| TreeValue::Scalar(Scalar::Number(n)))
            .unwrap_or_else(TreeValue::null)
    }
}

impl From<&str> for TreeValue {
    fn from(s: &str) -> Self {
        TreeValue::Scalar(Scalar::String(s.into()))
    }
}

impl From<String> for TreeValue {
    fn from(s: String) -> Self {
        TreeValue::Scalar(Scalar::String(s.into()))
    }
}

impl From<TreeMap> for TreeValue {
    fn from(map: TreeMap) -> Self {
        TreeValue::from_map(map)
    }
}

impl From<TreeList> for TreeValue {
    fn from(list: TreeList) -> Self {
        TreeValue::from_list(list)
    }
}

impl FromIterator<TreeValue> for TreeValue {
    fn from_iter<I: IntoIterator<Item = TreeValue>>(iter: I) -> Self {
        TreeValue::from_list(iter.into_iter().collect())
    }
}

impl FromIterator<(String, TreeValue)> for TreeValue {
    fn from_iter<I: IntoIterator<Item = (String, TreeValue)>>(iter: I) -> Self {
        TreeValue::from_map(iter.into_iter().collect())
    }
}

impl Serialize for TreeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TreeValue::Map(map) => serializer.collect_map(map.iter()),
            TreeValue::List(list) => serializer.collect_seq(list.iter()),
            TreeValue::Scalar(scalar) => scalar.serialize(serializer),
        }
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::Null | Scalar::Opaque(_) => serializer.serialize_unit(),
            Scalar::Bool(b) => serializer.serialize_bool(*b),
            Scalar::Number(n) => n.serialize(serializer),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for TreeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(TreeValue::from)
    }
}
