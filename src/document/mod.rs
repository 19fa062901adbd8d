//! The generic document tree configuration files are parsed into.
//!
//! A document is an ordered list of items. Each item has a key path (its name followed by any
//! labels), a value and the position where it was declared. Repeated keys are preserved in
//! declaration order so that callers can enforce their own cardinality rules.

mod error;
mod lexer;
mod parser;

pub use error::{Position, SyntaxError, SyntaxErrorKind};
use serde_json::{Map, Number as JsonNumber};

/// A JSON object.
pub type JsonObject = Map<String, serde_json::Value>;

/// Parse a document.
pub fn parse(input: &str) -> Result<Body, SyntaxError> {
    parser::Parser::new(input)?.parse_document()
}

/// An ordered list of items.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Body {
    items: Vec<Item>,
}

impl Body {
    /// Construct a body out of a list of items.
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Get all the items in this body.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Get the items whose name is the given one, in declaration order.
    pub fn filter<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items.iter().filter(move |item| item.name() == name)
    }

    /// Get the last unlabeled item with the given name.
    pub fn attribute(&self, name: &str) -> Option<&Item> {
        self.items.iter().rev().find(|item| item.name() == name && item.labels().is_empty())
    }

    /// Convert this body into an opaque JSON object.
    ///
    /// Labels become nested objects, so `foo "bar" { a = 1 }` turns into `{"foo": {"bar": {"a": 1}}}`. When
    /// the same key is declared more than once, objects are merged and any other value is overwritten by the
    /// later declaration.
    pub fn to_json(&self) -> JsonObject {
        let mut output = JsonObject::new();
        for item in &self.items {
            let mut value = item.value.to_json();
            for label in item.labels().iter().rev() {
                let mut wrapper = JsonObject::new();
                wrapper.insert(label.clone(), value);
                value = serde_json::Value::Object(wrapper);
            }
            merge_into(&mut output, item.name(), value);
        }
        output
    }
}

fn merge_into(target: &mut JsonObject, key: &str, value: serde_json::Value) {
    match (target.get_mut(key), value) {
        (Some(serde_json::Value::Object(existing)), serde_json::Value::Object(incoming)) => {
            for (inner_key, inner_value) in incoming {
                merge_into(existing, &inner_key, inner_value);
            }
        }
        (_, value) => {
            target.insert(key.to_string(), value);
        }
    }
}

/// An item within a body.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    keys: Vec<String>,
    value: Value,
    position: Position,
}

impl Item {
    /// Construct a new item.
    ///
    /// `keys` must contain at least the item's name.
    pub fn new(keys: Vec<String>, value: Value, position: Position) -> Self {
        debug_assert!(!keys.is_empty(), "items need a name");
        Self { keys, value, position }
    }

    /// The item's name.
    pub fn name(&self) -> &str {
        self.keys.first().map(String::as_str).unwrap_or_default()
    }

    /// The labels that follow the item's name, if any.
    pub fn labels(&self) -> &[String] {
        self.keys.get(1..).unwrap_or_default()
    }

    /// The item's value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The position where this item was declared.
    pub fn position(&self) -> Position {
        self.position
    }
}

/// A value in a document.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Bool(bool),
    List(Vec<Value>),
    Object(Body),
}

impl Value {
    /// A human readable name for this value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }

    /// Convert this value into an opaque JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(value) => serde_json::Value::String(value.clone()),
            Self::Number(Number::Integer(value)) => serde_json::Value::Number((*value).into()),
            Self::Number(Number::Float(value)) => {
                JsonNumber::from_f64(*value).map(serde_json::Value::Number).unwrap_or(serde_json::Value::Null)
            }
            Self::Bool(value) => serde_json::Value::Bool(*value),
            Self::List(values) => serde_json::Value::Array(values.iter().map(Value::to_json).collect()),
            Self::Object(body) => serde_json::Value::Object(body.to_json()),
        }
    }
}

/// A numeric value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}
