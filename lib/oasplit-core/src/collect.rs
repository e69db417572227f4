//! Transitive closure of the shared definitions used by a set of operations.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::flatten::unresolved_placeholder;
use crate::node::Node;
use crate::pointer::{self, ComponentRef};

/// Component kind holding security scheme definitions.
pub const SECURITY_SCHEMES: &str = "securitySchemes";

/// The shared definitions reached from a category's operations.
///
/// Maps a component kind to its entries. A `(kind, name)` pair is inserted
/// at most once: inserting it again is a no-op. Entries are the original
/// definitions, not flattened ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentClosure {
    kinds: IndexMap<String, IndexMap<String, Value>>,
}

impl ComponentClosure {
    /// Returns `true` if `(kind, name)` is already in the closure.
    #[must_use]
    pub fn contains(&self, kind: &str, name: &str) -> bool {
        self.kinds
            .get(kind)
            .is_some_and(|entries| entries.contains_key(name))
    }

    /// Inserts an entry unless present; returns `true` on insertion.
    pub fn insert(&mut self, kind: &str, name: &str, value: Value) -> bool {
        let entries = self.kinds.entry(kind.to_string()).or_default();
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(name.to_string(), value);
        true
    }

    /// An entry of the closure.
    #[must_use]
    pub fn get(&self, kind: &str, name: &str) -> Option<&Value> {
        self.kinds.get(kind)?.get(name)
    }

    /// Names of the entries of one kind, in discovery order.
    pub fn names(&self, kind: &str) -> impl Iterator<Item = &str> {
        self.kinds
            .get(kind)
            .into_iter()
            .flat_map(|entries| entries.keys().map(String::as_str))
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.values().map(IndexMap::len).sum()
    }

    /// Returns `true` when the closure has no entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Builds the `components` object, omitting empty kinds.
    #[must_use]
    pub fn into_components(self) -> Value {
        let components: Map<String, Value> = self
            .kinds
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(kind, entries)| (kind, Value::Object(entries.into_iter().collect())))
            .collect();
        Value::Object(components)
    }
}

/// Walks operation subtrees and accumulates their [`ComponentClosure`].
///
/// One collector is used per category and never shared. Each newly reached
/// definition is inserted *before* being walked, so self and mutual
/// references terminate.
///
/// Unresolvable shared references do not abort the walk: the placeholder
/// schema is inserted under their name (so the output document stays
/// self-contained) and a diagnostic is recorded.
///
/// # Example
///
/// ```rust
/// use oasplit_core::collect::DependencyCollector;
/// use serde_json::json;
///
/// let root = json!({
///     "components": {
///         "schemas": {
///             "Order": {"properties": {"ship_to": {"$ref": "#/components/schemas/Address"}}},
///             "Address": {"type": "object"},
///             "Unused": {"type": "object"}
///         }
///     }
/// });
///
/// let mut collector = DependencyCollector::new(&root);
/// collector.collect(&json!({"schema": {"$ref": "#/components/schemas/Order"}}));
/// let (closure, diagnostics) = collector.finish();
///
/// let names: Vec<_> = closure.names("schemas").collect();
/// assert_eq!(names, vec!["Order", "Address"]);
/// assert!(diagnostics.is_empty());
/// ```
#[derive(Debug)]
pub struct DependencyCollector<'doc> {
    root: &'doc Value,
    components_root: String,
    location: String,
    closure: ComponentClosure,
    diagnostics: Diagnostics,
}

impl<'doc> DependencyCollector<'doc> {
    /// Creates a collector for the `components` section of `root`.
    #[must_use]
    pub fn new(root: &'doc Value) -> Self {
        Self::with_components_root(root, "components")
    }

    /// Creates a collector for a differently named shared-definitions section.
    #[must_use]
    pub fn with_components_root(root: &'doc Value, components_root: &str) -> Self {
        Self {
            root,
            components_root: components_root.to_string(),
            location: "document".to_string(),
            closure: ComponentClosure::default(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Changes the location reported in subsequent diagnostics.
    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    /// The closure accumulated so far.
    #[must_use]
    pub fn closure(&self) -> &ComponentClosure {
        &self.closure
    }

    /// Adds every shared definition reachable from `node`.
    pub fn collect(&mut self, node: &Value) {
        match Node::classify(node) {
            Node::Leaf(_) => {}
            Node::Array(items) => {
                for item in items {
                    self.collect(item);
                }
            }
            Node::Plain(object) | Node::Combinator { object, .. } => {
                for value in object.values() {
                    self.collect(value);
                }
            }
            Node::Reference(reference) => self.collect_reference(reference),
        }
    }

    fn collect_reference(&mut self, reference: &str) {
        let component = match ComponentRef::parse(reference, &self.components_root) {
            Ok(Some(component)) => component,
            Ok(None) => return,
            Err(error) => {
                self.diagnostics
                    .push(Diagnostic::unresolved(&error, &self.location));
                return;
            }
        };
        if self.closure.contains(&component.kind, &component.name) {
            return;
        }

        let root = self.root;
        match component.lookup(root, &self.components_root) {
            Some(definition) => {
                debug!(%component, "collecting shared definition");
                self.closure
                    .insert(&component.kind, &component.name, definition.clone());
                // Deep pointers must still land inside the copied entry
                if let Err(error) = pointer::resolve(reference, root) {
                    self.diagnostics
                        .push(Diagnostic::unresolved(&error, &self.location));
                }
                self.collect(definition);
            }
            None => {
                if let Err(error) = pointer::resolve(reference, root) {
                    self.diagnostics
                        .push(Diagnostic::unresolved(&error, &self.location));
                }
                self.closure.insert(
                    &component.kind,
                    &component.name,
                    unresolved_placeholder(reference),
                );
            }
        }
    }

    /// Adds the security schemes named by a security requirement object.
    ///
    /// Requirements name schemes instead of pointing at them:
    /// `{"bearerAuth": []}` pulls `components.securitySchemes.bearerAuth`.
    pub fn collect_security_requirement(&mut self, requirement: &Value) {
        let Some(requirement) = requirement.as_object() else {
            return;
        };
        let root = self.root;
        let schemes = root
            .get(&self.components_root)
            .and_then(|components| components.get(SECURITY_SCHEMES));

        for name in requirement.keys() {
            if self.closure.contains(SECURITY_SCHEMES, name) {
                continue;
            }
            match schemes.and_then(|schemes| schemes.get(name)) {
                Some(scheme) => {
                    self.closure
                        .insert(SECURITY_SCHEMES, name, scheme.clone());
                    self.collect(scheme);
                }
                None => self
                    .diagnostics
                    .push(Diagnostic::unknown_security_scheme(name, &self.location)),
            }
        }
    }

    /// Consumes the collector.
    #[must_use]
    pub fn finish(self) -> (ComponentClosure, Diagnostics) {
        (self.closure, self.diagnostics)
    }
}
