//! # Oasplit Core
//!
//! Resolve references and partition OpenAPI documents into self-contained
//! per-category documents.
//!
//! A large interface description is split along the primary part of the
//! operation tags (`Orders|Refunds` belongs to `Orders`). Each output keeps the
//! global metadata, the operations of its category and exactly the shared
//! definitions those operations reach. Operation bodies are rewritten with
//! references and `allOf` combinators inlined, for tools that cannot follow
//! references.
//!
//! ## Quick Start
//!
//! ```rust
//! use oasplit_core::Document;
//! use oasplit_core::split::{DocumentSplitExt, SplitByCategory};
//! use serde_json::json;
//!
//! let document = Document::from_json_str(r##"{
//!     "openapi": "3.1.0",
//!     "info": {"title": "Shop", "version": "1.0.0"},
//!     "paths": {
//!         "/orders": {
//!             "get": {
//!                 "tags": ["Orders"],
//!                 "responses": {
//!                     "200": {
//!                         "description": "orders",
//!                         "content": {"application/json": {
//!                             "schema": {"$ref": "#/components/schemas/Order"}
//!                         }}
//!                     }
//!                 }
//!             }
//!         }
//!     },
//!     "components": {"schemas": {"Order": {"type": "object"}}}
//! }"##)?;
//!
//! let result = document.split_with(SplitByCategory::new());
//!
//! let orders = result.fragment("Orders").expect("Orders document");
//! let schema = &orders.content["paths"]["/orders"]["get"]["responses"]["200"]
//!     ["content"]["application/json"]["schema"];
//! assert_eq!(schema, &json!({"type": "object"}));
//! # Ok::<(), oasplit_core::SplitError>(())
//! ```
//!
//! ## Building Blocks
//!
//! - [`pointer`] - resolution of local JSON Pointer references
//! - [`flatten`] - reference substitution, with or without `allOf` merging
//! - [`collect`] - transitive closure of the shared definitions a subtree uses
//! - [`partition`] - grouping of operations by primary category
//! - [`split`] - assembly of the per-category documents
//! - [`checklist`] - Markdown review checklist of the operations
//!
//! ## Error Handling
//!
//! Only loading a document can fail, with a [`SplitError`]. Broken or
//! circular references never abort a split: they are replaced with
//! placeholder schemas and reported as [`Diagnostic`]s.

pub mod checklist;
pub mod collect;
pub mod diagnostics;
pub mod document;
mod error;
pub mod flatten;
pub mod node;
pub mod partition;
pub mod pointer;
pub mod split;

#[cfg(feature = "yaml")]
mod yaml;

pub use self::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use self::document::{Document, Method};
pub use self::error::{ReferenceError, SplitError};

#[cfg(feature = "yaml")]
pub use self::yaml::{ToYaml, YamlError};
