//! Whole-document dereferencing and `allOf` merging.

use oasplit_core::flatten::{circular_placeholder, flatten_merge};
use oasplit_core::{DiagnosticKind, Document};
use rstest::rstest;
use serde_json::{Value, json};

mod common;
pub use self::common::*;

fn mutual() -> Document {
    Document::new(json!({
        "paths": {
            "/a": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "an A",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/A" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "A": { "type": "object", "properties": { "b": { "$ref": "#/components/schemas/B" } } },
                "B": { "type": "object", "properties": { "a": { "$ref": "#/components/schemas/A" } } }
            }
        }
    }))
    .expect("valid document")
}

#[test]
fn should_break_mutual_cycles_when_dereferencing() {
    init_tracing();
    let document = mutual();

    let (flat, diagnostics) = document.dereference();

    let schema = &flat["paths"]["/a"]["get"]["responses"]["200"]["content"]["application/json"]
        ["schema"];
    assert_eq!(
        schema,
        &json!({
            "type": "object",
            "properties": {
                "b": {
                    "type": "object",
                    "properties": { "a": circular_placeholder("#/components/schemas/A") }
                }
            }
        })
    );
    assert_eq!(
        flat["components"]["schemas"]["B"],
        json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "object",
                    "properties": {
                        "b": {
                            "type": "object",
                            "properties": { "a": circular_placeholder("#/components/schemas/A") }
                        }
                    }
                }
            }
        })
    );
    assert_eq!(diagnostics.count(DiagnosticKind::CircularReference), 3);
    assert_eq!(diagnostics.len(), 3);
}

#[test]
fn should_leave_source_untouched_when_dereferencing() {
    let document = mutual();
    let before = document.clone();

    let _ = document.dereference();

    assert_eq!(document, before);
}

#[rstest]
#[case::later_entries_win(
    json!({"allOf": [{"a": 1}, {"a": 2, "b": 3}]}),
    json!({"a": 2, "b": 3})
)]
#[case::siblings_win(
    json!({"allOf": [{"a": 1}], "a": 5, "description": "kept"}),
    json!({"a": 5, "description": "kept"})
)]
#[case::nested_combinators(
    json!({"allOf": [{"allOf": [{"a": 1}, {"b": 1}]}, {"b": 2}]}),
    json!({"a": 1, "b": 2})
)]
#[case::non_object_children_skipped(
    json!({"allOf": [true, {"a": 1}]}),
    json!({"a": 1})
)]
fn should_merge_combinators(#[case] schema: Value, #[case] expected: Value) {
    let root = json!({});

    let (flat, diagnostics) = flatten_merge(&schema, &root);

    assert_eq!(flat, expected);
    assert!(diagnostics.is_empty());
}

#[rstest]
fn should_merge_referenced_children(shop: Document) {
    let order = json!({ "$ref": "#/components/schemas/Order" });

    let (flat, diagnostics) = flatten_merge(&order, shop.as_value());

    assert_eq!(
        flat,
        json!({
            "type": "object",
            "properties": {
                "ship_to": { "type": "object", "properties": { "city": { "type": "string" } } },
                "lines": {
                    "type": "array",
                    "items": { "type": "object", "properties": { "sku": { "type": "string" } } }
                }
            }
        })
    );
    assert!(diagnostics.is_empty());
}
