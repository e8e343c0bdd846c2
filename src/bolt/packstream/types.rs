//! PackStream value types.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::mem;

use serde::Serialize;

/// A PackStream value that can be serialized/deserialized.
///
/// Values are totally ordered and hashable so that any value can be used as
/// a map key. Floats compare by `f64::total_cmp`.
///
/// Comparison and drop walk nested values with an explicit work list, so
/// nesting depth is bounded by the heap rather than the thread stack. Use the
/// `into_*` methods to take the contents of a composite value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point (cannot be encoded)
    Float(f64),
    /// Byte array
    Bytes(Vec<u8>),
    /// UTF-8 text
    Text(String),
    /// List of values
    List(Vec<Value>),
    /// Map of values to values
    Map(BTreeMap<Value, Value>),
    /// Structure (tag + fields)
    Structure(Structure),
}

/// A PackStream structure with a tag and fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Structure {
    /// Structure tag (identifies the type)
    pub tag: u8,
    /// Structure fields
    pub fields: Vec<Value>,
}

impl Structure {
    /// Create a new structure with given tag and fields.
    pub fn new(tag: u8, fields: Vec<Value>) -> Self {
        Self { tag, fields }
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Try to get as boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as text reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as bytes reference.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Try to get as list reference.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Try to get as map reference.
    pub fn as_map(&self) -> Option<&BTreeMap<Value, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Try to get as structure reference.
    pub fn as_structure(&self) -> Option<&Structure> {
        match self {
            Value::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Take the text, if this is text.
    pub fn into_text(mut self) -> Option<String> {
        match &mut self {
            Value::Text(s) => Some(mem::take(s)),
            _ => None,
        }
    }

    /// Take the items, if this is a list.
    pub fn into_list(mut self) -> Option<Vec<Value>> {
        match &mut self {
            Value::List(l) => Some(mem::take(l)),
            _ => None,
        }
    }

    /// Take the entries, if this is a map.
    pub fn into_map(mut self) -> Option<BTreeMap<Value, Value>> {
        match &mut self {
            Value::Map(m) => Some(mem::take(m)),
            _ => None,
        }
    }

    /// Take the structure, if this is one.
    pub fn into_structure(mut self) -> Option<Structure> {
        match &mut self {
            Value::Structure(s) => Some(mem::take(s)),
            _ => None,
        }
    }

    /// Look up a text key in a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map()
            .and_then(|m| m.get(&Value::Text(key.to_string())))
    }

    /// Get the type name for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::Bytes(_) => "Bytes",
            Value::Text(_) => "Text",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Structure(_) => "Structure",
        }
    }

    // Cross-variant ordering.
    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::Bytes(_) => 4,
            Value::Text(_) => 5,
            Value::List(_) => 6,
            Value::Map(_) => 7,
            Value::Structure(_) => 8,
        }
    }

    // Moves nested values into `out`, leaving this one shallow.
    fn take_children(&mut self, out: &mut Vec<Value>) {
        match self {
            Value::List(items) => out.append(items),
            Value::Structure(s) => out.append(&mut s.fields),
            Value::Map(map) => {
                for (k, v) in mem::take(map) {
                    out.push(k);
                    out.push(v);
                }
            }
            _ => {}
        }
    }

    // Ordering that does not look inside same-kind composites.
    fn cmp_shallow(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Pending step of an ordering walk.
enum Compare<'a> {
    Values(&'a Value, &'a Value),
    Lengths(usize, usize),
}

impl Drop for Value {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_children(&mut pending);
        while let Some(mut value) = pending.pop() {
            value.take_children(&mut pending);
        }
    }
}

impl Ord for Value {
    /// Lexicographic within lists, maps and structures, matching the order of
    /// `Vec` and `BTreeMap`; structures compare by tag first.
    fn cmp(&self, other: &Self) -> Ordering {
        let mut pending = vec![Compare::Values(self, other)];
        while let Some(step) = pending.pop() {
            let ordering = match step {
                Compare::Lengths(a, b) => a.cmp(&b),
                Compare::Values(Value::List(a), Value::List(b)) => {
                    pending.push(Compare::Lengths(a.len(), b.len()));
                    pending.extend(a.iter().zip(b.iter()).rev().map(|(x, y)| Compare::Values(x, y)));
                    Ordering::Equal
                }
                Compare::Values(Value::Map(a), Value::Map(b)) => {
                    pending.push(Compare::Lengths(a.len(), b.len()));
                    for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()).rev() {
                        pending.push(Compare::Values(va, vb));
                        pending.push(Compare::Values(ka, kb));
                    }
                    Ordering::Equal
                }
                Compare::Values(Value::Structure(a), Value::Structure(b)) => {
                    pending.push(Compare::Lengths(a.fields.len(), b.fields.len()));
                    pending.extend(
                        a.fields
                            .iter()
                            .zip(b.fields.iter())
                            .rev()
                            .map(|(x, y)| Compare::Values(x, y)),
                    );
                    a.tag.cmp(&b.tag)
                }
                Compare::Values(a, b) => a.cmp_shallow(b),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Text(s) => s.hash(state),
            Value::List(l) => l.hash(state),
            Value::Map(m) => m.hash(state),
            Value::Structure(s) => s.hash(state),
        }
    }
}

// Conversion traits
impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<Value, Value>> for Value {
    fn from(v: BTreeMap<Value, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v.into_iter().map(|(k, v)| (Value::Text(k), v)).collect())
    }
}

impl From<Structure> for Value {
    fn from(v: Structure) -> Self {
        Value::Structure(v)
    }
}
