//! The `DocumentSplitter` trait for splitting interface descriptions.

use serde::Serialize;

use super::SplitResult;
use crate::document::Document;

/// Trait for splitting a document into several self-contained documents.
///
/// Implementations define how operations are grouped and what each output
/// carries. The source document is borrowed: it stays the single source of
/// truth for reference resolution while fragments are built.
///
/// # Implementing Custom Splitters
///
/// ```rust
/// use oasplit_core::Document;
/// use oasplit_core::split::{DocumentSplitter, Fragment, SplitResult};
///
/// /// Emits the whole document as a single fragment.
/// struct Unsplit;
///
/// impl DocumentSplitter for Unsplit {
///     type Fragment = serde_json::Value;
///
///     fn split(&self, document: &Document) -> SplitResult<Self::Fragment> {
///         let mut result = SplitResult::new();
///         result.add_fragment(Fragment::new("all", "openapi.json", document.as_value().clone()));
///         result
///     }
/// }
/// ```
///
/// # Built-in Implementations
///
/// * [`SplitByCategory`](super::SplitByCategory) - One document per primary tag
pub trait DocumentSplitter {
    /// The type of content of each fragment.
    type Fragment: Serialize;

    /// Splits the document into fragments.
    fn split(&self, document: &Document) -> SplitResult<Self::Fragment>;
}

/// Extension trait for convenient splitting of documents.
pub trait DocumentSplitExt {
    /// Splits this document using the provided splitter.
    ///
    /// This is a convenience method that calls `splitter.split(self)`.
    fn split_with<S: DocumentSplitter>(&self, splitter: S) -> SplitResult<S::Fragment>;
}

impl DocumentSplitExt for Document {
    fn split_with<S: DocumentSplitter>(&self, splitter: S) -> SplitResult<S::Fragment> {
        splitter.split(self)
    }
}
