//! The input document and its operation map.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::error::SplitError;
use crate::flatten::{Flattener, Strategy};

/// HTTP methods allowed as keys of a path item.
///
/// Any other path item key (`parameters`, `summary`, `servers`...) is not an
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum Method {
    /// `get`
    #[display("get")]
    Get,
    /// `put`
    #[display("put")]
    Put,
    /// `post`
    #[display("post")]
    Post,
    /// `delete`
    #[display("delete")]
    Delete,
    /// `options`
    #[display("options")]
    Options,
    /// `head`
    #[display("head")]
    Head,
    /// `patch`
    #[display("patch")]
    Patch,
    /// `trace`
    #[display("trace")]
    Trace,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// The lowercase key used in path items.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

/// Error returned when a path item key is not an HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
#[display("'{key}' is not an HTTP method")]
pub struct NotAMethod {
    /// The rejected key.
    pub key: String,
}

impl FromStr for Method {
    type Err = NotAMethod;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == key)
            .ok_or_else(|| NotAMethod {
                key: key.to_string(),
            })
    }
}

/// One operation of the document, with its position.
#[derive(Debug, Clone, Copy)]
pub struct OperationEntry<'doc> {
    /// The path template, e.g. `/orders/{id}`.
    pub path: &'doc str,
    /// The HTTP method.
    pub method: Method,
    /// The operation object.
    pub operation: &'doc Value,
}

impl OperationEntry<'_> {
    /// The `operationId`, if any.
    #[must_use]
    pub fn operation_id(&self) -> Option<&str> {
        self.operation.get("operationId").and_then(Value::as_str)
    }

    /// The labels of the operation; `None` when absent or not an array.
    #[must_use]
    pub fn tags(&self) -> Option<Vec<&str>> {
        let tags = self.operation.get("tags")?.as_array()?;
        Some(tags.iter().filter_map(Value::as_str).collect())
    }

    /// Human readable location, used in diagnostics.
    #[must_use]
    pub fn location(&self) -> String {
        operation_location(self.path, self.method, self.operation)
    }
}

pub(crate) fn operation_location(path: &str, method: Method, operation: &Value) -> String {
    let method = method.as_str().to_uppercase();
    match operation.get("operationId").and_then(Value::as_str) {
        Some(id) => format!("{method} {path} ({id})"),
        None => format!("{method} {path}"),
    }
}

/// A deserialized interface-description document.
///
/// The document is treated as the immutable source of truth: splitting
/// works on copies of its operations and never mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Wraps a deserialized document.
    ///
    /// # Errors
    ///
    /// Fails when the root is not an object, or when `paths` or
    /// `components` is missing or not an object.
    pub fn new(root: Value) -> Result<Self, SplitError> {
        Self::with_components_root(root, "components")
    }

    /// Wraps a deserialized document whose shared definitions live under
    /// `components_root` instead of `components`.
    ///
    /// # Errors
    ///
    /// Fails when the root is not an object, or when `paths` or
    /// `components_root` is missing or not an object.
    pub fn with_components_root(root: Value, components_root: &str) -> Result<Self, SplitError> {
        let Value::Object(object) = &root else {
            return Err(SplitError::NotAnObject);
        };
        for section in ["paths", components_root] {
            if !object.get(section).is_some_and(Value::is_object) {
                return Err(SplitError::MissingSection {
                    section: section.to_string(),
                });
            }
        }
        Ok(Self { root })
    }

    /// Parses a JSON document.
    ///
    /// # Errors
    ///
    /// Fails on invalid JSON, or for the reasons of [`Document::new`].
    pub fn from_json_str(input: &str) -> Result<Self, SplitError> {
        let root = serde_json::from_str(input)?;
        Self::new(root)
    }

    /// Parses a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on invalid YAML, or for the reasons of [`Document::new`].
    #[cfg(feature = "yaml")]
    pub fn from_yaml_str(input: &str) -> Result<Self, SplitError> {
        let root = serde_saphyr::from_str(input).map_err(|err| SplitError::YamlError {
            message: err.to_string(),
        })?;
        Self::new(root)
    }

    /// The whole document.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consumes the wrapper.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.root
    }

    /// A top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The `paths` map.
    #[must_use]
    pub fn paths(&self) -> &Map<String, Value> {
        static EMPTY: std::sync::LazyLock<Map<String, Value>> = std::sync::LazyLock::new(Map::new);
        self.root
            .get("paths")
            .and_then(Value::as_object)
            .unwrap_or(&EMPTY)
    }

    /// The ordered tag descriptors.
    #[must_use]
    pub fn tags(&self) -> &[Value] {
        self.root
            .get("tags")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Iterates over every operation, in document order.
    ///
    /// Path item keys that are not HTTP methods are skipped.
    pub fn operations(&self) -> impl Iterator<Item = OperationEntry<'_>> {
        self.paths().iter().flat_map(|(path, item)| {
            item.as_object()
                .into_iter()
                .flat_map(|item| item.iter())
                .filter_map(move |(key, operation)| {
                    let method = key.parse().ok()?;
                    operation.is_object().then_some(OperationEntry {
                        path: path.as_str(),
                        method,
                        operation,
                    })
                })
        })
    }

    /// Replaces every reference with its target, breaking cycles with
    /// placeholders.
    ///
    /// The result is no longer a valid [`Document`] for splitting purposes
    /// (references are gone), hence the raw [`Value`].
    #[must_use]
    pub fn dereference(&self) -> (Value, Diagnostics) {
        let mut flattener = Flattener::new(&self.root, Strategy::CycleSafe);
        let flat = flattener.flatten(&self.root);
        (flat, flattener.into_diagnostics())
    }
}

impl TryFrom<Value> for Document {
    type Error = SplitError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(feature = "utoipa")]
impl TryFrom<utoipa::openapi::OpenApi> for Document {
    type Error = SplitError;

    fn try_from(spec: utoipa::openapi::OpenApi) -> Result<Self, Self::Error> {
        let mut root = serde_json::to_value(spec)?;
        // utoipa omits empty components
        if let Value::Object(object) = &mut root {
            object
                .entry("components")
                .or_insert_with(|| Value::Object(Map::new()));
        }
        Self::new(root)
    }
}
