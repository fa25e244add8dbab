//! Caller-supplied attribute tree

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Three-state lookup result.
///
/// An unset key is distinct from a key explicitly set to null: defaults fill
/// the former, the latter means "intentionally absent".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attr<'a> {
    Unset,
    Null,
    Set(&'a Value),
}

impl Attr<'_> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Attr::Unset)
    }
}

/// Nested attribute mapping owned by the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeTree {
    root: Map<String, Value>,
}

impl AttributeTree {
    /// Empty tree; every attribute takes its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a parsed document.
    ///
    /// A document whose only top-level key is `rsyslog` is unwrapped so
    /// node-style attribute files load directly.
    pub fn from_value(value: Value) -> Result<Self> {
        let mut root = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::MalformedAttributes {
                    found: type_name(&other),
                });
            }
        };

        if root.len() == 1
            && matches!(root.get("rsyslog"), Some(Value::Object(_)))
            && let Some(Value::Object(inner)) = root.remove("rsyslog")
        {
            root = inner;
        }

        Ok(Self { root })
    }

    /// Set an attribute, creating intermediate mappings for dotted keys.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value.into());
        self
    }

    /// Set an attribute, creating intermediate mappings for dotted keys.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut segments: Vec<&str> = key.split('.').collect();
        let last = segments.pop().unwrap_or(key);

        let mut current = &mut self.root;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            let Value::Object(map) = entry else {
                return;
            };
            current = map;
        }
        current.insert(last.to_string(), value);
    }

    /// Look up an attribute by (optionally dotted) key.
    ///
    /// A null anywhere along the path makes the whole key null.
    pub fn get(&self, key: &str) -> Attr<'_> {
        let mut segments = key.split('.');
        let Some(first) = segments.next() else {
            return Attr::Unset;
        };

        let mut current = match self.root.get(first) {
            None => return Attr::Unset,
            Some(value) => value,
        };

        for segment in segments {
            current = match current {
                Value::Null => return Attr::Null,
                Value::Object(map) => match map.get(segment) {
                    None => return Attr::Unset,
                    Some(value) => value,
                },
                _ => return Attr::Unset,
            };
        }

        if current.is_null() {
            Attr::Null
        } else {
            Attr::Set(current)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }
}

/// JSON type name used in diagnostics.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}
