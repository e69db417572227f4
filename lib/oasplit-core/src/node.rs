//! Classification of schema nodes.

use serde_json::{Map, Value};

/// Key holding a reference pointer.
pub const REF_KEY: &str = "$ref";

/// Key holding the children of an "all of these must hold" combinator.
pub const ALL_OF_KEY: &str = "allOf";

/// A borrowed view of a JSON value, classified once by inspecting its keys.
///
/// Any object with a string `$ref` is a [`Node::Reference`]: sibling keys
/// carry no semantic weight next to a reference. Otherwise an object with an
/// `allOf` array is a [`Node::Combinator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// `{"$ref": "#/..."}`
    Reference(&'a str),
    /// `{"allOf": [...], ...}` with the remaining keys as siblings.
    Combinator {
        /// The child schemas, in order.
        all_of: &'a [Value],
        /// The whole object, `allOf` included.
        object: &'a Map<String, Value>,
    },
    /// Any array.
    Array(&'a [Value]),
    /// Any other object.
    Plain(&'a Map<String, Value>),
    /// Strings, numbers, booleans and `null`.
    Leaf(&'a Value),
}

impl<'a> Node<'a> {
    /// Classifies a value.
    #[must_use]
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(object) => {
                if let Some(Value::String(pointer)) = object.get(REF_KEY) {
                    Self::Reference(pointer)
                } else if let Some(Value::Array(all_of)) = object.get(ALL_OF_KEY) {
                    Self::Combinator { all_of, object }
                } else {
                    Self::Plain(object)
                }
            }
            Value::Array(items) => Self::Array(items),
            _ => Self::Leaf(value),
        }
    }
}
