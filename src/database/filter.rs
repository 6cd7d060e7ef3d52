use serde_json::{Map, Value};

/// Conjunction of top-level field equalities.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: uuid::Uuid) -> Self {
        Self::all().eq("id", id.to_string())
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.fields
            .iter()
            .all(|(field, expected)| doc.get(field) == Some(expected))
    }

    /// JSON object form, usable as a JSONB containment operand.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
