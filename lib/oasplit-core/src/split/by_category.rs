//! One self-contained document per primary category.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::debug;

use super::{DocumentSplitter, Fragment, SplitResult};
use crate::collect::DependencyCollector;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::document::{Document, operation_location};
use crate::error::SplitError;
use crate::flatten::{Flattener, Strategy};
use crate::partition::{Bucket, DEFAULT_CATEGORY, DEFAULT_DELIMITER, Partitioner};
#[cfg(feature = "yaml")]
use crate::yaml::ToYaml;

/// Serialization format of the output documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON, `.json` files.
    #[default]
    Json,
    /// YAML, `.yaml` files.
    #[cfg(feature = "yaml")]
    Yaml,
}

impl OutputFormat {
    /// File extension, without the dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
        }
    }

    /// Serializes a document in this format.
    ///
    /// # Errors
    ///
    /// Returns a [`SplitError`] if serialization fails.
    pub fn render(self, content: &Value) -> Result<String, SplitError> {
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(content)?),
            #[cfg(feature = "yaml")]
            Self::Yaml => content.to_yaml().map_err(|err| SplitError::YamlError {
                message: err.to_string(),
            }),
        }
    }
}

/// Splits a document into one document per primary category.
///
/// For every category, in this order:
/// 1. the operations tagged with it are copied (see [`Partitioner`]),
/// 2. the shared definitions reached from their request bodies, responses,
///    parameters, security requirements and callbacks are collected against
///    the *original* document,
/// 3. request bodies, responses, parameters and callbacks are rewritten with
///    references and `allOf` combinators inlined,
/// 4. `components` (or the configured shared-definitions root) is set to the
///    collected closure.
///
/// Fragment files are named `<category>.<ext>`, with `/` and `\` replaced by
/// `-`. Categories that would end up with the same file name get a numeric
/// suffix and a [`DiagnosticKind::FileNameCollision`](crate::DiagnosticKind).
///
/// # Example
///
/// ```rust
/// use oasplit_core::split::{OutputFormat, SplitByCategory};
///
/// let splitter = SplitByCategory::new()
///     .with_delimiter('|')
///     .with_default_category("Misc")
///     .with_format(OutputFormat::Json);
/// ```
#[derive(Debug, Clone)]
pub struct SplitByCategory {
    delimiter: char,
    default_category: String,
    format: OutputFormat,
    components_root: String,
    flatten_parameters: bool,
}

impl Default for SplitByCategory {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            default_category: DEFAULT_CATEGORY.to_string(),
            format: OutputFormat::default(),
            components_root: "components".to_string(),
            flatten_parameters: true,
        }
    }
}

impl SplitByCategory {
    /// Creates a splitter with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delimiter between primary category and secondary key.
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

    /// Sets the output format, which drives the fragment file extension.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the name of the shared-definitions section.
    #[must_use]
    pub fn with_components_root(mut self, components_root: impl Into<String>) -> Self {
        self.components_root = components_root.into();
        self
    }

    /// Whether parameters are inlined like bodies and responses.
    ///
    /// When disabled, parameters keep their references.
    #[must_use]
    pub fn with_flatten_parameters(mut self, flatten_parameters: bool) -> Self {
        self.flatten_parameters = flatten_parameters;
        self
    }

    /// The configured output format.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn partitioner(&self) -> Partitioner {
        Partitioner::new()
            .with_delimiter(self.delimiter)
            .with_default_category(self.default_category.as_str())
    }

    fn file_name(&self, category: &str) -> String {
        let stem = category.replace(['/', '\\'], "-");
        format!("{stem}.{}", self.format.extension())
    }

    /// The file name of a category, suffixed with `-2`, `-3`... when an
    /// earlier category already took it (compared case-insensitively).
    fn unique_file_name(
        &self,
        category: &str,
        taken: &mut HashSet<String>,
        diagnostics: &mut Diagnostics,
    ) -> String {
        let wanted = self.file_name(category);
        if taken.insert(wanted.to_lowercase()) {
            return wanted;
        }

        let stem = category.replace(['/', '\\'], "-");
        let extension = self.format.extension();
        let mut suffix = 2_usize;
        let renamed = loop {
            let candidate = format!("{stem}-{suffix}.{extension}");
            if taken.insert(candidate.to_lowercase()) {
                break candidate;
            }
            suffix += 1;
        };
        diagnostics.push(Diagnostic::file_name_collision(category, &wanted, &renamed));
        renamed
    }

    /// Builds the output document of one bucket.
    fn assemble(&self, document: &Document, bucket: Bucket) -> (Value, Diagnostics) {
        let root = document.as_value();

        let mut collector = DependencyCollector::with_components_root(root, &self.components_root);
        collector.set_location(format!("category {}", bucket.category));
        if let Some(Value::Array(requirements)) = bucket.header.get("security") {
            for requirement in requirements {
                collector.collect_security_requirement(requirement);
            }
        }
        for (path, item) in &bucket.paths {
            if let Some(parameters) = item.shared.get("parameters") {
                collector.set_location(format!("path {path}"));
                collector.collect(parameters);
            }
            for (method, operation) in &item.operations {
                collector.set_location(operation_location(path, *method, operation));
                collect_operation(&mut collector, operation);
            }
        }
        let (closure, mut diagnostics) = collector.finish();

        let mut flattener = Flattener::new(root, Strategy::MergeAllOf);
        let mut paths = Map::new();
        for (path, mut item) in bucket.paths {
            if self.flatten_parameters
                && let Some(parameters) = item.shared.get_mut("parameters")
            {
                flattener.set_location(format!("path {path}"));
                let flat = flattener.flatten(parameters);
                *parameters = flat;
            }
            for (method, operation) in &mut item.operations {
                flattener.set_location(operation_location(&path, *method, operation));
                self.flatten_operation(&mut flattener, operation);
            }
            paths.insert(path, item.into_path_item());
        }
        diagnostics.merge(flattener.into_diagnostics());

        debug!(
            category = %bucket.category,
            paths = paths.len(),
            components = closure.len(),
            "category assembled"
        );

        let mut content = bucket.header;
        content.insert("paths".to_string(), Value::Object(paths));
        content.insert(self.components_root.clone(), closure.into_components());
        (Value::Object(content), diagnostics)
    }

    fn flatten_operation(&self, flattener: &mut Flattener<'_>, operation: &mut Value) {
        if let Some(body) = operation.get_mut("requestBody") {
            let flat = flattener.flatten(body);
            *body = flat;
        }
        if let Some(Value::Object(responses)) = operation.get_mut("responses") {
            for response in responses.values_mut() {
                let flat = flattener.flatten(response);
                *response = flat;
            }
        }
        if self.flatten_parameters
            && let Some(Value::Array(parameters)) = operation.get_mut("parameters")
        {
            for parameter in parameters {
                let flat = flattener.flatten(parameter);
                *parameter = flat;
            }
        }
        if let Some(Value::Object(callbacks)) = operation.get_mut("callbacks") {
            for callback in callbacks.values_mut() {
                let flat = flattener.flatten(callback);
                *callback = flat;
            }
        }
    }
}

fn collect_operation(collector: &mut DependencyCollector<'_>, operation: &Value) {
    if let Some(body) = operation.get("requestBody") {
        collector.collect(body);
    }
    if let Some(Value::Object(responses)) = operation.get("responses") {
        for response in responses.values() {
            collector.collect(response);
        }
    }
    if let Some(Value::Array(parameters)) = operation.get("parameters") {
        for parameter in parameters {
            collector.collect(parameter);
        }
    }
    if let Some(Value::Array(requirements)) = operation.get("security") {
        for requirement in requirements {
            collector.collect_security_requirement(requirement);
        }
    }
    if let Some(Value::Object(callbacks)) = operation.get("callbacks") {
        for callback in callbacks.values() {
            collector.collect(callback);
        }
    }
}

impl DocumentSplitter for SplitByCategory {
    type Fragment = Value;

    fn split(&self, document: &Document) -> SplitResult<Self::Fragment> {
        let mut result = SplitResult::new();
        let mut taken = HashSet::new();

        for (category, bucket) in self.partitioner().partition(document) {
            let (content, diagnostics) = self.assemble(document, bucket);
            result.diagnostics.merge(diagnostics);
            let path = self.unique_file_name(&category, &mut taken, &mut result.diagnostics);
            result.add_fragment(Fragment::new(category, path, content));
        }

        result
    }
}
