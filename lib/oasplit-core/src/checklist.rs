//! Markdown review checklist of a document's operations.

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use crate::document::Document;
use crate::partition::{CategoryLabel, DEFAULT_CATEGORY, DEFAULT_DELIMITER};

/// Characters escaped in a link segment: everything but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Rendering settings of a [`Checklist`].
#[derive(Debug, Clone)]
pub struct ChecklistOptions {
    base_url: Option<String>,
    delimiter: char,
    default_category: String,
}

impl Default for ChecklistOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            delimiter: DEFAULT_DELIMITER,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl ChecklistOptions {
    /// Creates the default options: no links, `|` delimiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Links every operation to its page in an interactive viewer at `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = Some(base_url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the label delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the label of operations without labels.
    #[must_use]
    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = category.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Item {
    method: String,
    path: String,
    link: String,
    summary: String,
    responses: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq)]
struct Group {
    label: CategoryLabel,
    items: Vec<Item>,
}

/// A rendered-on-display checklist, one group per full label.
///
/// # Example
///
/// ```rust
/// use oasplit_core::Document;
/// use oasplit_core::checklist::{Checklist, ChecklistOptions};
/// use serde_json::json;
///
/// let document = Document::new(json!({
///     "paths": {"/health": {"get": {"responses": {"200": {"description": "up"}}}}},
///     "components": {}
/// }))?;
///
/// let checklist = Checklist::from_document(&document, &ChecklistOptions::new());
///
/// assert_eq!(
///     checklist.to_string(),
///     "# API Checklist\n\n## Untagged\n\n- [ ] GET [/health](`/health`) - No summary\n  - [ ] 200 Response: up\n\n\n"
/// );
/// # Ok::<(), oasplit_core::SplitError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    groups: Vec<Group>,
}

impl Checklist {
    /// Lists every operation of `document` under each of its labels.
    #[must_use]
    pub fn from_document(document: &Document, options: &ChecklistOptions) -> Self {
        let mut grouped: BTreeMap<String, Vec<Item>> = BTreeMap::new();

        for entry in document.operations() {
            let labels = entry
                .tags()
                .filter(|tags| !tags.is_empty())
                .unwrap_or_else(|| vec![options.default_category.as_str()]);
            for label in labels {
                let item = Item {
                    method: entry.method.as_str().to_uppercase(),
                    path: entry.path.to_string(),
                    link: link(options, entry.path, label, entry.operation_id()),
                    summary: text(entry.operation, "summary", "No summary"),
                    responses: responses(entry.operation),
                };
                grouped.entry(label.to_string()).or_default().push(item);
            }
        }

        let groups = grouped
            .into_iter()
            .map(|(label, items)| Group {
                label: CategoryLabel::parse(&label, options.delimiter, &options.default_category),
                items,
            })
            .collect();
        Self { groups }
    }

    /// Number of operation lines.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|group| group.items.len()).sum()
    }
}

fn link(options: &ChecklistOptions, path: &str, label: &str, operation_id: Option<&str>) -> String {
    match &options.base_url {
        Some(base_url) => format!(
            "{base_url}/#/{}/{}",
            utf8_percent_encode(label, COMPONENT),
            utf8_percent_encode(operation_id.unwrap_or_default(), COMPONENT)
        ),
        None => format!("`{path}`"),
    }
}

fn text(value: &Value, key: &str, default: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn responses(operation: &Value) -> Vec<(String, String)> {
    operation
        .get("responses")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .map(|(code, response)| (code.clone(), text(response, "description", "No description")))
        .collect()
}

impl fmt::Display for Checklist {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(out, "# API Checklist")?;
        writeln!(out)?;
        for group in &self.groups {
            match &group.label.secondary {
                None => writeln!(out, "## {}", group.label.primary)?,
                Some(secondary) => writeln!(out, "### {secondary}")?,
            }
            writeln!(out)?;
            for item in &group.items {
                writeln!(
                    out,
                    "- [ ] {} [{}]({}) - {}",
                    item.method, item.path, item.link, item.summary
                )?;
                for (code, description) in &item.responses {
                    writeln!(out, "  - [ ] {code} Response: {description}")?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    fn document() -> Document {
        Document::new(json!({
            "paths": {
                "/orders": {
                    "get": {
                        "operationId": "listOrders",
                        "summary": "List orders",
                        "tags": ["Orders"],
                        "responses": {
                            "200": { "description": "the orders" },
                            "401": {}
                        }
                    }
                },
                "/orders/{id}/refunds": {
                    "post": {
                        "operationId": "refund order",
                        "tags": ["Orders|Refunds"],
                        "responses": { "201": { "description": "refunded" } }
                    }
                },
                "/health": {
                    "get": { "operationId": "health" }
                }
            },
            "components": {}
        }))
        .expect("valid document")
    }

    #[test]
    fn should_render_sorted_groups() {
        let checklist = Checklist::from_document(&document(), &ChecklistOptions::new());

        assert_eq!(checklist.item_count(), 3);
        assert_snapshot!(checklist.to_string().trim_end(), @r"
        # API Checklist

        ## Orders

        - [ ] GET [/orders](`/orders`) - List orders
          - [ ] 200 Response: the orders
          - [ ] 401 Response: No description


        ### Refunds

        - [ ] POST [/orders/{id}/refunds](`/orders/{id}/refunds`) - No summary
          - [ ] 201 Response: refunded


        ## Untagged

        - [ ] GET [/health](`/health`) - No summary
        ");
    }

    #[test]
    fn should_link_to_viewer() {
        let options = ChecklistOptions::new().with_base_url("https://api.example.com/");

        let checklist = Checklist::from_document(&document(), &options);
        let rendered = checklist.to_string();

        assert!(rendered.contains(
            "- [ ] POST [/orders/{id}/refunds](https://api.example.com/#/Orders%7CRefunds/refund%20order) - No summary"
        ));
        assert!(rendered.contains("(https://api.example.com/#/Untagged/health)"));
    }

    #[test]
    fn should_escape_like_uri_components() {
        let encoded = utf8_percent_encode("a b/c(d)~e'*!", COMPONENT).to_string();

        assert_eq!(encoded, "a%20b%2Fc(d)~e'*!");
    }
}
