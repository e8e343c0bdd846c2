//! Graph structures carried inside PackStream values.

use std::collections::BTreeMap;

use serde::Serialize;

use super::marker::NODE_TAG;
use super::types::{Structure, Value};
use super::PackStreamError;

/// A graph node: structure tag `0x01` with fields identity, labels and
/// properties, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Node identity
    pub identity: i64,
    /// Node labels
    pub labels: Vec<String>,
    /// Node properties
    pub properties: BTreeMap<String, Value>,
}

impl Node {
    /// Create a new node.
    pub fn new(identity: i64, labels: Vec<String>, properties: BTreeMap<String, Value>) -> Self {
        Self {
            identity,
            labels,
            properties,
        }
    }

    /// Get a property by name.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// Check whether the node carries a label.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Convert to a structure value.
    pub fn to_value(&self) -> Value {
        let labels = self.labels.iter().map(|l| Value::from(l.as_str())).collect();
        Value::Structure(Structure::new(
            NODE_TAG,
            vec![
                Value::Integer(self.identity),
                Value::List(labels),
                Value::from(self.properties.clone()),
            ],
        ))
    }

    /// Parse from a node structure, which must have exactly three fields.
    pub fn from_structure(s: Structure) -> Result<Self, PackStreamError> {
        if s.tag != NODE_TAG {
            return Err(PackStreamError::InvalidStructure(format!(
                "Expected node tag 0x{:02X}, got 0x{:02X}",
                NODE_TAG, s.tag
            )));
        }
        let [identity, labels, properties]: [Value; 3] =
            s.fields.try_into().map_err(|fields: Vec<Value>| {
                PackStreamError::InvalidStructure(format!(
                    "Node needs 3 fields, got {}",
                    fields.len()
                ))
            })?;

        let identity = identity
            .as_int()
            .ok_or_else(|| invalid("identity", identity.type_name()))?;

        let kind = labels.type_name();
        let labels = labels
            .into_list()
            .ok_or_else(|| invalid("labels", kind))?
            .into_iter()
            .map(|label| {
                let kind = label.type_name();
                label.into_text().ok_or_else(|| invalid("label", kind))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kind = properties.type_name();
        let properties = properties
            .into_map()
            .ok_or_else(|| invalid("properties", kind))?
            .into_iter()
            .map(|(k, v)| {
                let kind = k.type_name();
                k.into_text()
                    .map(|k| (k, v))
                    .ok_or_else(|| invalid("property key", kind))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self::new(identity, labels, properties))
    }

    /// Parse from a value, which must be a node structure.
    pub fn from_value(value: Value) -> Result<Self, PackStreamError> {
        let kind = value.type_name();
        match value.into_structure() {
            Some(s) => Self::from_structure(s),
            None => Err(invalid("node", kind)),
        }
    }
}

fn invalid(what: &str, got: &str) -> PackStreamError {
    PackStreamError::InvalidStructure(format!("Invalid node {}: {}", what, got))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Node {
        let mut props = BTreeMap::new();
        props.insert("name".to_string(), Value::from("Alice"));
        Node::new(7, vec!["Person".to_string()], props)
    }

    #[test]
    fn test_node_value_layout() {
        let value = alice().to_value();
        let s = value.as_structure().unwrap();
        assert_eq!(s.tag, 0x01);
        assert_eq!(s.fields[0], Value::Integer(7));
        assert_eq!(s.fields[1], Value::List(vec![Value::from("Person")]));
        assert_eq!(s.fields[2].get("name"), Some(&Value::from("Alice")));
    }

    #[test]
    fn test_node_from_value() {
        let node = Node::from_value(alice().to_value()).unwrap();
        assert_eq!(node, alice());
        assert!(node.has_label("Person"));
        assert_eq!(node.property("name").and_then(|v| v.as_str()), Some("Alice"));
    }

    #[test]
    fn test_node_wrong_tag() {
        let s = Structure::new(0x02, vec![]);
        assert!(matches!(
            Node::from_structure(s),
            Err(PackStreamError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_node_bad_fields() {
        let s = Structure::new(
            NODE_TAG,
            vec![Value::from("x"), Value::List(vec![]), Value::Map(BTreeMap::new())],
        );
        assert!(Node::from_structure(s).is_err());

        let s = Structure::new(NODE_TAG, vec![Value::Integer(1)]);
        assert!(Node::from_structure(s).is_err());
    }

    #[test]
    fn test_node_extra_fields_rejected() {
        let mut s = alice().to_value().into_structure().unwrap();
        s.fields.push(Value::Null);
        assert!(matches!(
            Node::from_structure(s),
            Err(PackStreamError::InvalidStructure(msg)) if msg.contains("got 4")
        ));
    }
}
