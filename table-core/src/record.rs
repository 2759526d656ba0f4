//! Schema-less table records.
//!
//! # Design
//! A `Record` is an ordered mapping from field name to JSON value with no
//! compiled-in schema — the remote table defines the fields, and this crate
//! treats every field name as an opaque string. Typed accessors (`has`,
//! `text`) cover the two reads the client itself needs; everything else goes
//! through the underlying map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved field name holding a record's unique identifier.
pub const SYS_ID: &str = "sys_id";

/// One row of a remote table: field name to JSON value, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when `field` is present and not JSON null.
    pub fn has(&self, field: &str) -> bool {
        matches!(self.0.get(field), Some(v) if !v.is_null())
    }

    /// Textual form of a non-null scalar field.
    ///
    /// Strings come back as-is; numbers and booleans are rendered. Absent,
    /// null, and structured (object/array) fields give `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// The record's `sys_id`, when present and non-null.
    pub fn sys_id(&self) -> Option<String> {
        self.text(SYS_ID)
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Object(record.0)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Succeeds only for JSON objects; returns the value back otherwise.
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl<F: Into<String>, V: Into<Value>> FromIterator<(F, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (F, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(f, v)| (f.into(), v.into()))
                .collect(),
        )
    }
}
