//! Fragment types for split documents.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::Diagnostics;

/// One output document of a split.
///
/// # Type Parameters
///
/// * `T` - The content of the fragment, a JSON [`Value`] by default. Must
///   implement [`Serialize`] for file output.
///
/// # Example
///
/// ```rust
/// use oasplit_core::split::Fragment;
/// use std::path::PathBuf;
///
/// let fragment = Fragment::new("Orders", "Orders.json", serde_json::json!({}));
/// assert_eq!(fragment.path, PathBuf::from("Orders.json"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment<T: Serialize = Value> {
    /// The primary category this fragment was built for.
    pub category: String,

    /// Relative path where this fragment should be written.
    pub path: PathBuf,

    /// The content to serialize into the fragment file.
    pub content: T,
}

impl<T: Serialize> Fragment<T> {
    /// Creates a new fragment.
    pub fn new(category: impl Into<String>, path: impl Into<PathBuf>, content: T) -> Self {
        Self {
            category: category.into(),
            path: path.into(),
            content,
        }
    }
}

/// The result of splitting a document.
///
/// Holds one fragment per category, in the order categories were first met,
/// and the diagnostics recorded on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitResult<T: Serialize = Value> {
    /// Output documents.
    pub fragments: Vec<Fragment<T>>,

    /// Recoverable problems found while splitting.
    pub diagnostics: Diagnostics,
}

impl<T: Serialize> Default for SplitResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Serialize> SplitResult<T> {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Adds a fragment to the result.
    pub fn add_fragment(&mut self, fragment: Fragment<T>) {
        self.fragments.push(fragment);
    }

    /// Returns `true` if the document had no operation to split.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Returns the number of fragments.
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// The fragment of a category.
    #[must_use]
    pub fn fragment(&self, category: &str) -> Option<&Fragment<T>> {
        self.fragments
            .iter()
            .find(|fragment| fragment.category == category)
    }

    /// The categories, in output order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.fragments
            .iter()
            .map(|fragment| fragment.category.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_create_fragment() {
        let fragment = Fragment::new("Orders", "out/Orders.json", json!({}));

        assert_eq!(fragment.category, "Orders");
        assert_eq!(fragment.path, PathBuf::from("out/Orders.json"));
    }

    #[test]
    fn should_create_empty_result() {
        let result: SplitResult = SplitResult::new();

        assert!(result.is_empty());
        assert_eq!(result.fragment_count(), 0);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn should_find_fragments_by_category() {
        let mut result = SplitResult::new();

        result.add_fragment(Fragment::new("Orders", "Orders.json", json!({"a": 1})));
        result.add_fragment(Fragment::new("Users", "Users.json", json!({"b": 2})));

        assert!(!result.is_empty());
        assert_eq!(result.fragment_count(), 2);
        assert_eq!(result.categories().collect::<Vec<_>>(), vec!["Orders", "Users"]);
        assert_eq!(
            result.fragment("Users").map(|it| &it.content),
            Some(&json!({"b": 2}))
        );
        assert!(result.fragment("Missing").is_none());
    }
}
