//! Record - one row of a query result

use std::collections::{BTreeMap, HashMap};

use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

use super::error::{DriverError, DriverResult};
use crate::bolt::packstream::{NODE_TAG, PATH_TAG, RELATIONSHIP_TAG};
use crate::bolt::{Node, Value};

// ============================================================================
// Field - one interpreted value
// ============================================================================

/// A result value after structure interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Plain value, including structures with uninterpreted tags
    Value(Value),
    /// Graph node (structure tag 0x01)
    Node(Node),
}

impl Field {
    /// Interpret a raw row value.
    ///
    /// Only the value itself is inspected; structures nested inside lists or
    /// maps are left as they are.
    pub fn interpret(value: Value) -> DriverResult<Self> {
        let tag = value.as_structure().map(|s| s.tag);
        match tag {
            Some(NODE_TAG) => Node::from_value(value)
                .map(Field::Node)
                .map_err(|e| DriverError::InvalidRecord(e.to_string())),
            Some(tag @ (RELATIONSHIP_TAG | PATH_TAG)) => {
                Err(DriverError::UnsupportedStructureTag(tag))
            }
            _ => Ok(Field::Value(value)),
        }
    }

    /// The plain value, if this is not a node.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(v) => Some(v),
            Field::Node(_) => None,
        }
    }

    /// The node, if this is one.
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Field::Node(n) => Some(n),
            Field::Value(_) => None,
        }
    }

    /// Back to a wire value.
    pub fn into_value(self) -> Value {
        match self {
            Field::Value(v) => v,
            Field::Node(n) => n.to_value(),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Value(value)
    }
}

impl PartialEq<Value> for Field {
    fn eq(&self, other: &Value) -> bool {
        self.as_value() == Some(other)
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Value(v) => v.serialize(serializer),
            Field::Node(n) => {
                let mut s = serializer.serialize_struct("Node", 4)?;
                s.serialize_field("type", "node")?;
                s.serialize_field("identity", &n.identity)?;
                s.serialize_field("labels", &n.labels)?;
                s.serialize_field("properties", &n.properties)?;
                s.end()
            }
        }
    }
}

// ============================================================================
// Record - one row
// ============================================================================

/// Query result record: field names zipped with one row of values.
#[derive(Debug, Clone)]
pub struct Record {
    /// Field names
    keys: Vec<String>,
    /// Values
    values: Vec<Field>,
    /// Name to position
    key_index: HashMap<String, usize>,
}

impl Record {
    /// Create a record.
    pub fn new(keys: Vec<String>, values: Vec<Field>) -> Self {
        let key_index = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();

        Self {
            keys,
            values,
            key_index,
        }
    }

    /// Build a record from the raw values of a RECORD message.
    pub fn from_row(keys: &[String], row: Vec<Value>) -> DriverResult<Self> {
        if row.len() != keys.len() {
            return Err(DriverError::InvalidRecord(format!(
                "{} values for {} fields",
                row.len(),
                keys.len()
            )));
        }
        let values = row
            .into_iter()
            .map(Field::interpret)
            .collect::<DriverResult<Vec<_>>>()?;
        Ok(Self::new(keys.to_vec(), values))
    }

    /// Field names.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Values, in field order.
    pub fn values(&self) -> &[Field] {
        &self.values
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value by field name.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.key_index.get(key).and_then(|&i| self.values.get(i))
    }

    /// Value by position.
    pub fn get_by_index(&self, index: usize) -> Option<&Field> {
        self.values.get(index)
    }

    /// Whether the record has a field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.key_index.contains_key(key)
    }

    /// Name to value map.
    pub fn to_map(&self) -> BTreeMap<String, Field> {
        self.keys
            .iter()
            .cloned()
            .zip(self.values.iter().cloned())
            .collect()
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.values == other.values
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.keys.iter().zip(&self.values) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Tests
// ============================================================================
