use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row from the system of record.
///
/// Fields are untyped: each maps to a scalar or a list of scalars, exactly as
/// the source returned them. Records are read-only snapshots for the duration
/// of a sync pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Record identifier rendered as text, if any.
    pub fn id(&self) -> Option<String> {
        self.text("id")
    }

    /// Scalar field as text.
    ///
    /// Missing fields, nulls and empty strings are all absent, and so is a
    /// list with no non-null items. Numbers and booleans render as their JSON
    /// text; lists render comma-joined.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Array(_) => {
                let items = self.list(field);
                (!items.is_empty()).then(|| items.join(", "))
            }
            other => scalar_text(other),
        }
    }

    /// List field as text items. A lone scalar is a one-element list.
    pub fn list(&self, field: &str) -> Vec<String> {
        match self.0.get(field) {
            Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
            Some(other) => scalar_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
