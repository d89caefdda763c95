//! The `Value` tree TOON documents decode into and encode from.
//!
//! Mirrors JSON's data model but keeps integers and floats distinct (TOON preserves that
//! distinction on the wire) and uses an insertion-ordered map for objects so that encoding
//! the same value twice always produces the same field order.

use indexmap::IndexMap;

/// Insertion-ordered mapping from object keys to values.
///
/// A thin wrapper around [`IndexMap`] rather than a bare `Vec<(String, Value)>` — both are
/// acceptable representations of "ordered map" and this crate follows the convention of the
/// other TOON implementations in its lineage, which reach for `indexmap` for the same
/// reason: deterministic iteration order without hand-rolling one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToonObject(IndexMap<String, Value>);

impl ToonObject {
    /// Creates an empty object.
    pub fn new() -> Self {
        ToonObject(IndexMap::new())
    }

    /// Inserts a key-value pair, returning the previous value if the key was present.
    ///
    /// Re-inserting an existing key updates its value in place without moving it to the
    /// end — this matches `IndexMap::insert`'s behaviour and keeps the first-seen position
    /// of a key stable, which is what "insertion order" means for TOON's purposes.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value for `key`, if present.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if the object has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ToonObject {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ToonObject(IndexMap::from_iter(iter))
    }
}

impl IntoIterator for ToonObject {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ToonObject {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A TOON document value.
///
/// Separates `Int` from `Float` (TOON round-trips the distinction) and carries objects in
/// an order-preserving map. There is no cyclic variant and no sharing: a `Value` is built
/// bottom-up by the decoder and consumed top-down by the encoder, never mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(ToonObject),
}

impl Value {
    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` for any primitive (Null, Bool, Int, Float, String) — the kinds allowed as
    /// inline-array elements and tabular-row cells.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Array(_) | Value::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ToonObject> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

impl From<ToonObject> for Value {
    fn from(obj: ToonObject) -> Self {
        Value::Object(obj)
    }
}
