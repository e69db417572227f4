/// Errors raised while resolving a single `$ref` pointer.
///
/// These are never fatal for a split run: the flatteners and the dependency
/// collector turn them into placeholder schemas and [`Diagnostic`](crate::Diagnostic)s.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Error, derive_more::Display)]
pub enum ReferenceError {
    /// The reference points outside the current document.
    #[display("external reference '{pointer}' is not supported")]
    External {
        /// The raw `$ref` value.
        pointer: String,
    },

    /// The pointer could not be decoded.
    ///
    /// Occurs for invalid percent-encoding, invalid `~` escapes, or a
    /// fragment that does not start with `/`.
    #[display("malformed pointer '{pointer}': {message}")]
    Malformed {
        /// The raw `$ref` value.
        pointer: String,
        /// Why decoding failed.
        message: String,
    },

    /// A path segment has no matching entry in the document.
    #[display("unresolvable pointer '{pointer}': no entry for segment '{segment}'")]
    Unresolvable {
        /// The raw `$ref` value.
        pointer: String,
        /// The decoded segment that missed.
        segment: String,
    },
}

impl ReferenceError {
    /// The raw pointer this error is about.
    #[must_use]
    pub fn pointer(&self) -> &str {
        match self {
            Self::External { pointer }
            | Self::Malformed { pointer, .. }
            | Self::Unresolvable { pointer, .. } => pointer,
        }
    }
}

/// Document-level errors that abort a split run.
#[derive(Debug, derive_more::Error, derive_more::Display, derive_more::From)]
pub enum SplitError {
    /// The document root is not a JSON object.
    #[display("document root must be an object")]
    #[from(skip)]
    NotAnObject,

    /// A mandatory top-level section is missing or is not an object.
    #[display("document has no '{section}' object")]
    #[from(skip)]
    MissingSection {
        /// Name of the missing section (`paths` or the shared-definitions root).
        section: String,
    },

    /// The document could not be parsed or serialized as JSON.
    JsonError(serde_json::Error),

    /// The document could not be parsed or serialized as YAML.
    #[display("YAML error: {message}")]
    #[from(skip)]
    YamlError {
        /// The underlying parser message.
        message: String,
    },
}
