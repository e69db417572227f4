//! Partitioning a document into self-contained per-category documents.
//!
//! # Overview
//!
//! Large interface descriptions are easier to review, publish and version
//! per domain. Splitting by category:
//! - groups operations by the primary part of their tags,
//! - keeps in each output exactly the shared definitions its operations
//!   reach, directly or transitively,
//! - inlines references and `allOf` combinators in operation bodies, for
//!   consumers that cannot follow references.
//!
//! This module provides the [`DocumentSplitter`] trait and the
//! [`SplitByCategory`] strategy.
//!
//! # Example
//!
//! ```rust
//! use oasplit_core::Document;
//! use oasplit_core::split::{DocumentSplitExt, SplitByCategory};
//! use serde_json::json;
//!
//! let document = Document::new(json!({
//!     "paths": {
//!         "/orders": {
//!             "get": {
//!                 "tags": ["Orders"],
//!                 "responses": {
//!                     "200": {"$ref": "#/components/responses/Orders"}
//!                 }
//!             }
//!         },
//!         "/users": {"get": {"tags": ["Users"]}}
//!     },
//!     "components": {
//!         "responses": {"Orders": {"description": "orders"}},
//!         "schemas": {"Unused": {"type": "object"}}
//!     }
//! }))?;
//!
//! let result = document.split_with(SplitByCategory::new());
//!
//! let orders = result.fragment("Orders").expect("Orders document");
//! assert_eq!(orders.path.to_string_lossy(), "Orders.json");
//! assert_eq!(
//!     orders.content["components"],
//!     json!({"responses": {"Orders": {"description": "orders"}}})
//! );
//! let users = result.fragment("Users").expect("Users document");
//! assert_eq!(users.content["components"], json!({}));
//! # Ok::<(), oasplit_core::SplitError>(())
//! ```

mod by_category;
mod fragment;
mod splitter;

pub use by_category::{OutputFormat, SplitByCategory};
pub use fragment::{Fragment, SplitResult};
pub use splitter::{DocumentSplitExt, DocumentSplitter};
