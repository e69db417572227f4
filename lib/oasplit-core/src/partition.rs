//! Grouping of operations into per-category buckets.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{Document, Method};

/// Default delimiter between the primary category and the secondary key.
pub const DEFAULT_DELIMITER: char = '|';

/// Default category for operations without labels.
pub const DEFAULT_CATEGORY: &str = "Untagged";

/// Top-level fields copied verbatim into every bucket.
const GLOBAL_FIELDS: [&str; 6] = [
    "openapi",
    "jsonSchemaDialect",
    "info",
    "servers",
    "security",
    "externalDocs",
];

/// Path item fields that are not operations but belong to every copy.
const PATH_ITEM_FIELDS: [&str; 4] = ["summary", "description", "servers", "parameters"];

/// A category label split into its primary category and secondary key.
///
/// # Example
///
/// ```rust
/// use oasplit_core::partition::CategoryLabel;
///
/// let label = CategoryLabel::parse("Orders|Refunds", '|', "Untagged");
/// assert_eq!(label.primary, "Orders");
/// assert_eq!(label.secondary.as_deref(), Some("Refunds"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryLabel {
    /// Selects the bucket.
    pub primary: String,
    /// Presentation-only grouping key.
    pub secondary: Option<String>,
}

impl CategoryLabel {
    /// Splits a label on the first `delimiter`.
    ///
    /// Both parts are trimmed. An empty primary part maps to
    /// `default_category`; an empty secondary part is dropped.
    #[must_use]
    pub fn parse(label: &str, delimiter: char, default_category: &str) -> Self {
        let (primary, secondary) = match label.split_once(delimiter) {
            Some((primary, secondary)) => (primary, Some(secondary)),
            None => (label, None),
        };
        let primary = primary.trim();
        let primary = if primary.is_empty() {
            default_category
        } else {
            primary
        };
        let secondary = secondary
            .map(str::trim)
            .filter(|secondary| !secondary.is_empty())
            .map(str::to_string);

        Self {
            primary: primary.to_string(),
            secondary,
        }
    }
}

/// One path inside a bucket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketPath {
    /// Non-operation path item fields (`parameters`, `summary`...).
    pub shared: Map<String, Value>,
    /// Deep copies of the operations, by method.
    pub operations: IndexMap<Method, Value>,
}

impl BucketPath {
    /// Rebuilds the path item object.
    #[must_use]
    pub fn into_path_item(self) -> Value {
        let mut item = self.shared;
        for (method, operation) in self.operations {
            item.insert(method.as_str().to_string(), operation);
        }
        Value::Object(item)
    }
}

/// The in-progress output document of one category.
///
/// Buckets own their data: an operation listed under two categories is
/// copied into both buckets independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// The primary category.
    pub category: String,
    /// Global metadata, with `tags` narrowed to the category's descriptor.
    pub header: Map<String, Value>,
    /// Operations of the category, by path.
    pub paths: IndexMap<String, BucketPath>,
}

impl Bucket {
    fn new(category: &str, document: &Document) -> Self {
        let mut header = Map::new();
        for field in GLOBAL_FIELDS {
            if let Some(value) = document.get(field) {
                header.insert(field.to_string(), value.clone());
            }
        }
        let tags: Vec<Value> = document
            .tags()
            .iter()
            .filter(|tag| tag.get("name").and_then(Value::as_str) == Some(category))
            .cloned()
            .collect();
        if !tags.is_empty() {
            header.insert("tags".to_string(), Value::Array(tags));
        }

        Self {
            category: category.to_string(),
            header,
            paths: IndexMap::new(),
        }
    }

    /// Number of operations in the bucket.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|path| path.operations.len()).sum()
    }
}

/// Groups operations by primary category.
#[derive(Debug, Clone)]
pub struct Partitioner {
    delimiter: char,
    default_category: String,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl Partitioner {
    /// Creates a partitioner with the default delimiter and category.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the category of operations without labels.
    #[must_use]
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }

    /// Parses one label with this partitioner's settings.
    #[must_use]
    pub fn label(&self, label: &str) -> CategoryLabel {
        CategoryLabel::parse(label, self.delimiter, &self.default_category)
    }

    /// The labels of an operation; the default category when it has none.
    #[must_use]
    pub fn labels(&self, operation: &Value) -> Vec<CategoryLabel> {
        let labels: Vec<CategoryLabel> = operation
            .get("tags")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(|label| self.label(label))
            .collect();
        if labels.is_empty() {
            vec![self.label(&self.default_category)]
        } else {
            labels
        }
    }

    /// Buckets every operation of the document by primary category.
    ///
    /// Buckets appear in the order their category is first met.
    #[must_use]
    pub fn partition(&self, document: &Document) -> IndexMap<String, Bucket> {
        let mut buckets: IndexMap<String, Bucket> = IndexMap::new();

        for entry in document.operations() {
            let mut primaries: Vec<String> = Vec::new();
            for label in self.labels(entry.operation) {
                if !primaries.contains(&label.primary) {
                    primaries.push(label.primary);
                }
            }

            for primary in primaries {
                let bucket = buckets.entry(primary.clone()).or_insert_with(|| {
                    debug!(category = %primary, "new category");
                    Bucket::new(&primary, document)
                });
                let path = bucket
                    .paths
                    .entry(entry.path.to_string())
                    .or_insert_with(|| BucketPath {
                        shared: shared_fields(document, entry.path),
                        operations: IndexMap::new(),
                    });
                path.operations
                    .insert(entry.method, entry.operation.clone());
            }
        }

        buckets
    }
}

fn shared_fields(document: &Document, path: &str) -> Map<String, Value> {
    let mut shared = Map::new();
    if let Some(item) = document.paths().get(path) {
        for field in PATH_ITEM_FIELDS {
            if let Some(value) = item.get(field) {
                shared.insert(field.to_string(), value.clone());
            }
        }
    }
    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Document {
        Document::new(json!({
            "openapi": "3.1.0",
            "info": { "title": "Shop", "version": "1.0.0" },
            "servers": [ { "url": "https://shop.example.com" } ],
            "tags": [
                { "name": "Orders", "description": "Order management" },
                { "name": "Users" }
            ],
            "paths": {
                "/orders": {
                    "parameters": [ { "name": "tenant", "in": "header" } ],
                    "get": { "operationId": "listOrders", "tags": ["Orders"] },
                    "post": { "operationId": "createOrder", "tags": ["Orders|Checkout"] }
                },
                "/orders/{id}/refunds": {
                    "post": { "operationId": "refundOrder", "tags": ["Orders|Refunds", "Payments"] }
                },
                "/health": {
                    "get": { "operationId": "health" }
                },
                "/users": {
                    "get": { "operationId": "listUsers", "tags": ["Users", "Users|Admin"] }
                }
            },
            "components": {}
        }))
        .expect("valid document")
    }

    #[test]
    fn should_bucket_by_primary_category() {
        let buckets = Partitioner::new().partition(&document());

        let categories: Vec<_> = buckets.keys().map(String::as_str).collect();
        assert_eq!(categories, vec!["Orders", "Payments", "Untagged", "Users"]);

        let orders = buckets.get("Orders").expect("Orders bucket");
        assert_eq!(orders.operation_count(), 3);
    }

    #[test]
    fn should_duplicate_operations_with_several_categories() {
        let mut buckets = Partitioner::new().partition(&document());

        let payments = buckets.get_mut("Payments").expect("Payments bucket");
        let refund = payments
            .paths
            .get_mut("/orders/{id}/refunds")
            .and_then(|path| path.operations.get_mut(&Method::Post))
            .expect("refund operation");
        refund["summary"] = json!("changed");

        let orders = buckets.get("Orders").expect("Orders bucket");
        let original = orders
            .paths
            .get("/orders/{id}/refunds")
            .and_then(|path| path.operations.get(&Method::Post))
            .expect("refund operation");
        assert_eq!(original.get("summary"), None);
    }

    #[test]
    fn should_add_operation_once_per_category() {
        let buckets = Partitioner::new().partition(&document());

        let users = buckets.get("Users").expect("Users bucket");

        assert_eq!(users.operation_count(), 1);
    }

    #[test]
    fn should_copy_global_metadata_and_matching_tag() {
        let buckets = Partitioner::new().partition(&document());

        let orders = buckets.get("Orders").expect("Orders bucket");
        let untagged = buckets.get("Untagged").expect("Untagged bucket");

        assert_eq!(orders.header.get("openapi"), Some(&json!("3.1.0")));
        assert_eq!(
            orders.header.get("info"),
            Some(&json!({ "title": "Shop", "version": "1.0.0" }))
        );
        assert_eq!(
            orders.header.get("tags"),
            Some(&json!([{ "name": "Orders", "description": "Order management" }]))
        );
        assert_eq!(orders.header.get("security"), None);
        assert_eq!(untagged.header.get("tags"), None);
    }

    #[test]
    fn should_copy_shared_path_fields() {
        let buckets = Partitioner::new().partition(&document());

        let orders = buckets.get("Orders").expect("Orders bucket");
        let path = orders.paths.get("/orders").expect("/orders path");

        assert_eq!(
            path.shared.get("parameters"),
            Some(&json!([{ "name": "tenant", "in": "header" }]))
        );
        assert_eq!(
            path.clone().into_path_item(),
            json!({
                "parameters": [ { "name": "tenant", "in": "header" } ],
                "get": { "operationId": "listOrders", "tags": ["Orders"] },
                "post": { "operationId": "createOrder", "tags": ["Orders|Checkout"] }
            })
        );
    }

    #[test]
    fn should_use_custom_delimiter_and_default_category() {
        let partitioner = Partitioner::new()
            .with_delimiter('/')
            .with_default_category("Misc");

        let buckets = partitioner.partition(&document());

        assert!(buckets.contains_key("Misc"));
        assert!(buckets.contains_key("Orders|Checkout"));
    }

    #[test]
    fn should_treat_empty_tag_list_as_untagged() {
        let partitioner = Partitioner::new();

        let labels = partitioner.labels(&json!({"tags": []}));

        assert_eq!(
            labels,
            vec![CategoryLabel {
                primary: "Untagged".to_string(),
                secondary: None
            }]
        );
    }
}
