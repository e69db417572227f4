//! Recoverable problems found while splitting or flattening.

use serde::Serialize;
use tracing::warn;

use crate::error::ReferenceError;

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A reference was reached again on its own resolution path.
    #[display("circular reference")]
    CircularReference,
    /// A reference could not be resolved.
    #[display("unresolved reference")]
    UnresolvedReference,
    /// A security requirement names a scheme missing from `components`.
    #[display("unknown security scheme")]
    UnknownSecurityScheme,
    /// Two categories map to the same output file name.
    #[display("file name collision")]
    FileNameCollision,
}

/// A recorded, non-fatal problem.
///
/// Every diagnostic is also emitted as a `tracing` warning when recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, derive_more::Display)]
#[display("{kind} '{pointer}' in {location}: {message}")]
pub struct Diagnostic {
    /// The kind of problem.
    pub kind: DiagnosticKind,
    /// The pointer, security scheme name or file name involved.
    pub pointer: String,
    /// Where it was found, e.g. `GET /orders (listOrders)`.
    pub location: String,
    /// Human readable detail.
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn circular(pointer: &str, location: &str) -> Self {
        Self {
            kind: DiagnosticKind::CircularReference,
            pointer: pointer.to_string(),
            location: location.to_string(),
            message: "replaced with a placeholder".to_string(),
        }
    }

    pub(crate) fn unresolved(error: &ReferenceError, location: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnresolvedReference,
            pointer: error.pointer().to_string(),
            location: location.to_string(),
            message: error.to_string(),
        }
    }

    pub(crate) fn unknown_security_scheme(name: &str, location: &str) -> Self {
        Self {
            kind: DiagnosticKind::UnknownSecurityScheme,
            pointer: name.to_string(),
            location: location.to_string(),
            message: "no matching entry in securitySchemes".to_string(),
        }
    }

    pub(crate) fn file_name_collision(category: &str, wanted: &str, renamed: &str) -> Self {
        Self {
            kind: DiagnosticKind::FileNameCollision,
            pointer: wanted.to_string(),
            location: format!("category {category}"),
            message: format!("already taken, written as {renamed}"),
        }
    }
}

/// An ordered collection of [`Diagnostic`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, derive_more::Deref)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Records a diagnostic and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            kind = %diagnostic.kind,
            pointer = %diagnostic.pointer,
            location = %diagnostic.location,
            "{}",
            diagnostic.message
        );
        self.0.push(diagnostic);
    }

    /// Moves every diagnostic of `other` into `self`, without logging them again.
    pub fn merge(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Number of diagnostics of the given kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.0.iter().filter(|it| it.kind == kind).count()
    }

    /// Consumes the collection.
    #[must_use]
    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.0
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
