#![allow(dead_code)]

use std::collections::BTreeSet;

use oasplit_core::Document;
use oasplit_core::node::Node;
use oasplit_core::pointer::ComponentRef;
use rstest::fixture;
use serde_json::{Value, json};
use tracing::info;

pub fn init_tracing() {
    // should be run once, fail otherwise, we skip that error
    let _ = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    info!("Tracing initialized");
}

/// A shop with three categories sharing some definitions.
#[fixture]
pub fn shop() -> Document {
    init_tracing();
    Document::new(json!({
        "openapi": "3.1.0",
        "info": { "title": "Shop", "version": "1.0.0" },
        "tags": [
            { "name": "Orders", "description": "Order management" },
            { "name": "Users", "description": "Accounts" }
        ],
        "paths": {
            "/orders": {
                "get": {
                    "operationId": "listOrders",
                    "tags": ["Orders"],
                    "responses": {
                        "200": {
                            "description": "orders",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Order" }
                                    }
                                }
                            }
                        },
                        "default": { "$ref": "#/components/responses/Problem" }
                    }
                }
            },
            "/orders/{id}/refunds": {
                "post": {
                    "operationId": "refundOrder",
                    "tags": ["Orders|Refunds"],
                    "requestBody": { "$ref": "#/components/requestBodies/Refund" },
                    "responses": { "202": { "description": "accepted" } }
                }
            },
            "/users/{id}": {
                "get": {
                    "operationId": "getUser",
                    "tags": ["Users"],
                    "responses": {
                        "200": {
                            "description": "the user",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/User" }
                                }
                            }
                        },
                        "default": { "$ref": "#/components/responses/Problem" }
                    }
                }
            },
            "/categories": {
                "get": {
                    "operationId": "listCategories",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": {
                            "description": "the category tree",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Category" }
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Order": {
                    "allOf": [
                        { "$ref": "#/components/schemas/Entity" },
                        {
                            "type": "object",
                            "properties": {
                                "ship_to": { "$ref": "#/components/schemas/Address" },
                                "lines": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Line" }
                                }
                            }
                        }
                    ]
                },
                "Entity": { "type": "object", "properties": { "id": { "type": "string" } } },
                "Address": { "type": "object", "properties": { "city": { "type": "string" } } },
                "Line": { "type": "object", "properties": { "sku": { "type": "string" } } },
                "Money": { "type": "object", "properties": { "amount": { "type": "number" } } },
                "User": {
                    "type": "object",
                    "properties": { "home": { "$ref": "#/components/schemas/Address" } }
                },
                "Category": {
                    "type": "object",
                    "properties": {
                        "parent": { "$ref": "#/components/schemas/Category" }
                    }
                },
                "Problem": { "type": "object", "properties": { "title": { "type": "string" } } },
                "Unused": { "type": "object" }
            },
            "responses": {
                "Problem": {
                    "description": "an error",
                    "content": {
                        "application/problem+json": {
                            "schema": { "$ref": "#/components/schemas/Problem" }
                        }
                    }
                }
            },
            "requestBodies": {
                "Refund": {
                    "content": {
                        "application/json": {
                            "schema": {
                                "type": "object",
                                "properties": { "amount": { "$ref": "#/components/schemas/Money" } }
                            }
                        }
                    }
                }
            }
        }
    }))
    .expect("valid document")
}

/// Every `$ref` string found in `value`.
pub fn references(value: &Value) -> Vec<String> {
    let mut found = Vec::new();
    walk(value, &mut found);
    found
}

fn walk(value: &Value, found: &mut Vec<String>) {
    match Node::classify(value) {
        Node::Reference(reference) => found.push(reference.to_string()),
        Node::Plain(object) | Node::Combinator { object, .. } => {
            for child in object.values() {
                walk(child, found);
            }
        }
        Node::Array(items) => {
            for item in items {
                walk(item, found);
            }
        }
        Node::Leaf(_) => {}
    }
}

/// The `kind/name` entries of a `components` object.
pub fn component_names(components: &Value) -> BTreeSet<String> {
    components
        .as_object()
        .into_iter()
        .flatten()
        .flat_map(|(kind, entries)| {
            entries
                .as_object()
                .into_iter()
                .flatten()
                .map(move |(name, _)| format!("{kind}/{name}"))
        })
        .collect()
}

/// Entries of the source document reached from `start`, computed by a plain
/// worklist over the source.
pub fn reachable(source: &Value, start: &Value) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut pending = references(start);

    while let Some(reference) = pending.pop() {
        let Ok(Some(component)) = ComponentRef::parse(&reference, "components") else {
            continue;
        };
        if !seen.insert(component.to_string()) {
            continue;
        }
        if let Some(definition) = component.lookup(source, "components") {
            pending.extend(references(definition));
        }
    }

    seen
}
