use super::error::SchemaViolation;
use crate::document::{Body, JsonObject, Value};

/// Typed access to the plain (unlabeled) fields of a block.
pub(crate) struct Fields<'a> {
    body: &'a Body,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(body: &'a Body) -> Self {
        Self { body }
    }

    /// Get a field's raw value.
    pub(crate) fn value(&self, name: &str) -> Option<&'a Value> {
        self.body.attribute(name).map(|item| item.value())
    }

    /// Whether a field is present.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Get a field that must be a string if present.
    pub(crate) fn string(&self, name: &'static str) -> Result<Option<String>, SchemaViolation> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(other) => Err(wrong_type(name, "string", other)),
        }
    }

    /// Get a field that must be an object if present.
    pub(crate) fn object(&self, name: &'static str) -> Result<Option<JsonObject>, SchemaViolation> {
        match self.value(name) {
            None => Ok(None),
            Some(Value::Object(body)) => Ok(Some(body.to_json())),
            Some(other) => Err(wrong_type(name, "object", other)),
        }
    }
}

pub(crate) fn wrong_type(field: &'static str, expected: &'static str, found: &Value) -> SchemaViolation {
    SchemaViolation::WrongType { field, expected, found: found.type_name() }
}
