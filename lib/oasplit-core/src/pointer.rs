//! Internal `$ref` pointer resolution.
//!
//! References are URI fragments holding a JSON Pointer (RFC 6901), such as
//! `#/components/schemas/Order`. The fragment is percent-decoded first, then
//! each segment is unescaped (`~1` to `/`, then `~0` to `~`) and looked up
//! in turn. Both flattening strategies and the dependency collector go
//! through [`resolve`], so decoding rules are defined in one place only.

use std::borrow::Cow;

use jsonptr::Pointer;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::error::ReferenceError;

/// Decodes a `$ref` value into its unescaped pointer segments.
///
/// # Errors
///
/// Returns [`ReferenceError::External`] when the reference does not start
/// with `#`, and [`ReferenceError::Malformed`] when decoding fails.
///
/// # Example
///
/// ```rust
/// use oasplit_core::pointer::segments;
///
/// let segments = segments("#/paths/~1users~1{id}/get").expect("valid pointer");
/// assert_eq!(segments, vec!["paths", "/users/{id}", "get"]);
/// ```
pub fn segments(reference: &str) -> Result<Vec<String>, ReferenceError> {
    let Some(fragment) = reference.strip_prefix('#') else {
        return Err(ReferenceError::External {
            pointer: reference.to_string(),
        });
    };

    let decoded: Cow<'_, str> = percent_decode_str(fragment)
        .decode_utf8()
        .map_err(|err| ReferenceError::Malformed {
            pointer: reference.to_string(),
            message: err.to_string(),
        })?;

    let pointer = Pointer::parse(&*decoded).map_err(|err| ReferenceError::Malformed {
        pointer: reference.to_string(),
        message: err.to_string(),
    })?;

    Ok(pointer
        .tokens()
        .map(|token| token.decoded().into_owned())
        .collect())
}

/// Resolves a `$ref` value against the document root.
///
/// Objects are walked by key and arrays by index. No caching is done: the
/// cost is linear in the pointer depth.
///
/// # Errors
///
/// Fails with [`ReferenceError::Unresolvable`] as soon as one segment has no
/// matching entry, or with the decoding errors of [`segments`].
///
/// # Example
///
/// ```rust
/// use oasplit_core::pointer::resolve;
/// use serde_json::json;
///
/// let root = json!({"components": {"schemas": {"Order": {"type": "object"}}}});
/// let node = resolve("#/components/schemas/Order", &root).expect("should resolve");
/// assert_eq!(node, &json!({"type": "object"}));
/// ```
pub fn resolve<'doc>(reference: &str, root: &'doc Value) -> Result<&'doc Value, ReferenceError> {
    let mut current = root;
    for segment in segments(reference)? {
        let next = match current {
            Value::Object(map) => map.get(&segment),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        };
        current = next.ok_or_else(|| ReferenceError::Unresolvable {
            pointer: reference.to_string(),
            segment,
        })?;
    }
    Ok(current)
}

/// A reference into the shared-definitions section: `(kind, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{kind}/{name}")]
pub struct ComponentRef {
    /// The component kind (`schemas`, `responses`, `parameters`...).
    pub kind: String,
    /// The entry name inside that kind.
    pub name: String,
}

impl ComponentRef {
    /// Extracts the component targeted by a reference.
    ///
    /// Returns `Ok(None)` for internal pointers outside `components_root`
    /// and for pointers too short to name an entry. Deeper pointers
    /// (`#/components/schemas/Order/properties/id`) target their enclosing
    /// entry.
    ///
    /// # Errors
    ///
    /// Propagates decoding failures from [`segments`].
    pub fn parse(reference: &str, components_root: &str) -> Result<Option<Self>, ReferenceError> {
        let segments = segments(reference)?;
        let mut segments = segments.into_iter();
        if segments.next().as_deref() != Some(components_root) {
            return Ok(None);
        }
        let (Some(kind), Some(name)) = (segments.next(), segments.next()) else {
            return Ok(None);
        };
        Ok(Some(Self { kind, name }))
    }

    /// Looks the entry up in the document.
    #[must_use]
    pub fn lookup<'doc>(&self, root: &'doc Value, components_root: &str) -> Option<&'doc Value> {
        root.get(components_root)?.get(&self.kind)?.get(&self.name)
    }
}
