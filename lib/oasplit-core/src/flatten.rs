//! Reference substitution over schema subtrees.
//!
//! Two strategies share one walker and the [`pointer::resolve`] primitive:
//!
//! * [`Strategy::CycleSafe`] substitutes every `$ref` with its target and
//!   keeps the rest of the tree as is. It is meant for whole-document
//!   preprocessing, before tools that cannot bundle self-referential documents.
//! * [`Strategy::MergeAllOf`] additionally folds `allOf` combinators into a
//!   single object, for consumers that cannot follow references at all.
//!
//! Both strategies track the chain of pointers followed on the current path.
//! Reaching a pointer already in the chain yields a [`circular_placeholder`];
//! the same pointer reached through two independent paths is expanded twice.
//! Unresolvable pointers yield an [`unresolved_placeholder`]. Both cases are
//! recorded as [`Diagnostic`]s, never raised.

use serde_json::{Map, Value, json};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::node::{ALL_OF_KEY, Node};
use crate::pointer;

/// The schema replacing a reference met again on its own resolution path.
#[must_use]
pub fn circular_placeholder(pointer: &str) -> Value {
    json!({
        "type": "string",
        "example": format!("Circular reference to {pointer}"),
    })
}

/// The schema replacing a reference that cannot be resolved.
#[must_use]
pub fn unresolved_placeholder(pointer: &str) -> Value {
    json!({
        "type": "string",
        "example": format!("Failed to resolve reference: {pointer}"),
    })
}

/// How combinators are handled while substituting references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Substitute references, leave combinators untouched.
    #[default]
    CycleSafe,
    /// Substitute references and shallow-merge `allOf` children.
    MergeAllOf,
}

/// Reference-substituting walker over a document.
///
/// # Example
///
/// ```rust
/// use oasplit_core::flatten::{Flattener, Strategy};
/// use serde_json::json;
///
/// let root = json!({
///     "components": {"schemas": {"Id": {"type": "integer"}}}
/// });
/// let schema = json!({"allOf": [{"$ref": "#/components/schemas/Id"}, {"minimum": 1}]});
///
/// let mut flattener = Flattener::new(&root, Strategy::MergeAllOf);
/// let flat = flattener.flatten(&schema);
///
/// assert_eq!(flat, json!({"type": "integer", "minimum": 1}));
/// assert!(flattener.diagnostics().is_empty());
/// ```
#[derive(Debug)]
pub struct Flattener<'doc> {
    root: &'doc Value,
    strategy: Strategy,
    location: String,
    chain: Vec<String>,
    diagnostics: Diagnostics,
}

impl<'doc> Flattener<'doc> {
    /// Creates a flattener resolving pointers against `root`.
    #[must_use]
    pub fn new(root: &'doc Value, strategy: Strategy) -> Self {
        Self {
            root,
            strategy,
            location: "document".to_string(),
            chain: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Sets the location reported in diagnostics.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Changes the location reported in subsequent diagnostics.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// The diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Consumes the flattener, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Diagnostics {
        self.diagnostics
    }

    /// Returns a copy of `node` with references substituted.
    ///
    /// Pointers in `node` are resolved against the root given to
    /// [`Flattener::new`]; `node` does not need to belong to that root.
    pub fn flatten(&mut self, node: &Value) -> Value {
        match Node::classify(node) {
            Node::Leaf(value) => value.clone(),
            Node::Array(items) => Value::Array(items.iter().map(|item| self.flatten(item)).collect()),
            Node::Plain(object) => Value::Object(self.flatten_object(object)),
            Node::Combinator { all_of, object } => match self.strategy {
                Strategy::CycleSafe => Value::Object(self.flatten_object(object)),
                Strategy::MergeAllOf => Value::Object(self.merge_all_of(all_of, object)),
            },
            Node::Reference(reference) => self.follow(reference),
        }
    }

    fn flatten_object(&mut self, object: &Map<String, Value>) -> Map<String, Value> {
        object
            .iter()
            .map(|(key, value)| (key.clone(), self.flatten(value)))
            .collect()
    }

    // Later children win on key conflicts, the combinator's own keys win last.
    fn merge_all_of(&mut self, all_of: &[Value], object: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = Map::new();
        for child in all_of {
            if let Value::Object(fields) = self.flatten(child) {
                merged.extend(fields);
            }
        }
        for (key, value) in object {
            if key != ALL_OF_KEY {
                let value = self.flatten(value);
                merged.insert(key.clone(), value);
            }
        }
        merged
    }

    fn follow(&mut self, reference: &str) -> Value {
        if self.chain.iter().any(|seen| seen == reference) {
            self.diagnostics
                .push(Diagnostic::circular(reference, &self.location));
            return circular_placeholder(reference);
        }

        match pointer::resolve(reference, self.root) {
            Ok(target) => {
                self.chain.push(reference.to_string());
                let flat = self.flatten(target);
                self.chain.pop();
                flat
            }
            Err(error) => {
                self.diagnostics
                    .push(Diagnostic::unresolved(&error, &self.location));
                unresolved_placeholder(reference)
            }
        }
    }
}

/// Flattens `node` with [`Strategy::CycleSafe`].
#[must_use]
pub fn flatten_cycle_safe(node: &Value, root: &Value) -> (Value, Diagnostics) {
    let mut flattener = Flattener::new(root, Strategy::CycleSafe);
    let flat = flattener.flatten(node);
    (flat, flattener.into_diagnostics())
}

/// Flattens `schema` with [`Strategy::MergeAllOf`].
#[must_use]
pub fn flatten_merge(schema: &Value, root: &Value) -> (Value, Diagnostics) {
    let mut flattener = Flattener::new(root, Strategy::MergeAllOf);
    let flat = flattener.flatten(schema);
    (flat, flattener.into_diagnostics())
}
