//! YAML serialization of documents and split results, using serde-saphyr.
//!
//! Only available with the `yaml` feature.
//!
//! # Example
//!
//! ```rust
//! use oasplit_core::ToYaml;
//! use serde_json::json;
//!
//! let yaml = json!({"openapi": "3.1.0"}).to_yaml()?;
//! assert_eq!(yaml.trim_end(), "openapi: 3.1.0");
//! # Ok::<(), oasplit_core::YamlError>(())
//! ```

use serde::Serialize;

/// Error type for YAML serialization.
pub type YamlError = serde_saphyr::ser_error::Error;

/// Extension trait for serializing to YAML.
///
/// Implemented for every [`Serialize`] type.
pub trait ToYaml: Serialize + Sized {
    /// Serializes this value to a YAML string.
    ///
    /// # Errors
    ///
    /// Returns a [`YamlError`] if serialization fails.
    fn to_yaml(&self) -> Result<String, YamlError> {
        serde_saphyr::to_string(self)
    }
}

impl<T: Serialize + Sized> ToYaml for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Document;
    use crate::split::{DocumentSplitExt, SplitByCategory};
    use serde_json::json;

    #[test]
    fn should_serialize_fragment_to_yaml() {
        let document = Document::new(json!({
            "openapi": "3.1.0",
            "info": { "title": "Shop", "version": "1.0.0" },
            "paths": {
                "/orders": {
                    "get": {
                        "tags": ["Orders"],
                        "responses": { "default": { "description": "no content" } }
                    }
                }
            },
            "components": {}
        }))
        .expect("valid document");

        let result = document.split_with(SplitByCategory::new());
        let orders = result.fragment("Orders").expect("Orders document");

        let yaml = orders.content.to_yaml().expect("should serialize to YAML");

        assert!(yaml.starts_with("openapi: 3.1.0\n"));
        let parsed = Document::from_yaml_str(&yaml).expect("should parse back");
        assert_eq!(parsed.as_value(), &orders.content);
    }

    #[test]
    fn should_read_yaml_document() {
        let yaml = "paths: {}\ncomponents: {}\n";

        let document = Document::from_yaml_str(yaml).expect("should parse YAML");

        assert_eq!(document.as_value(), &json!({"paths": {}, "components": {}}));
    }
}
