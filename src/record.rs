//! Configuration records: one typed value per schema field.

use crate::schema::{FieldKind, Schema};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::sync::Arc;

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(n) => Value::from(*n),
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::List(items) => Value::from(items.clone()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Int(n) => serializer.serialize_i64(*n),
            FieldValue::Str(s) => serializer.serialize_str(s),
            FieldValue::List(items) => items.serialize(serializer),
        }
    }
}

/// A fully populated record laid out in schema order.
///
/// `found` records whether the backing source existed. It is not a field and
/// is never serialized; profiles that expose it copy it into a control field
/// during finalization.
#[derive(Debug, Clone)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<FieldValue>,
    pub found: bool,
}

impl Record {
    pub(crate) fn from_parts(schema: Arc<Schema>, values: Vec<FieldValue>, found: bool) -> Self {
        debug_assert_eq!(schema.len(), values.len());
        Self {
            schema,
            values,
            found,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_int)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        self.get(name).and_then(FieldValue::as_list)
    }

    pub(crate) fn value(&self, index: usize) -> &FieldValue {
        &self.values[index]
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut FieldValue {
        &mut self.values[index]
    }

    /// Assign a field by name. Returns `false` without touching the record
    /// when the field is unknown or the value has the wrong kind.
    pub fn set(&mut self, name: &str, value: FieldValue) -> bool {
        match self.schema.index_of(name) {
            Some(i) if self.values[i].kind() == value.kind() => {
                self.values[i] = value;
                true
            }
            _ => false,
        }
    }

    /// Include reference carried by this record, if any.
    pub fn include(&self) -> Option<&str> {
        self.schema
            .include_index()
            .and_then(|i| self.values[i].as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn clear_include(&mut self) {
        if let Some(i) = self.schema.include_index() {
            self.values[i] = FieldValue::Str(String::new());
        }
    }

    /// Exposed fields as a JSON value. Use `serde_json::to_string` to keep
    /// schema order in text.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Iterate `(name, value)` pairs for exposed fields.
    pub fn exposed(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .zip(self.values.iter())
            .filter(|(spec, _)| spec.policy.is_exposed())
            .map(|(spec, value)| (spec.name, value))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.found == other.found
            && self.values == other.values
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.exposed() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
