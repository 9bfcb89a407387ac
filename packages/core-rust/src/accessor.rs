//! Nullable-safe navigation over partially available item data.
//!
//! Item data arrives from the backend with per-field holes: a field may be
//! `null` because it is empty, or because the current user may not read it.
//! [`SafeAccessor`] lets consumers drill into arbitrarily deep structures
//! without null checks, while the sideband [`FieldError`] list tells them
//! which path was denied.
//!
//! The accessor is an immutable value: the root document and the error list
//! are shared behind `Arc`s, and each step only extends a key path.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AccessError;

static NULL: Value = Value::Null;

// ---------------------------------------------------------------------------
// Paths and errors
// ---------------------------------------------------------------------------

/// One step of a data path: an object key or an array index.
///
/// Untagged on the wire so that GraphQL-style paths (`["item", "tags", 0]`)
/// deserialize directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// An error reported by the backend for one nested value.
///
/// `path` is relative to the root of the accessor the error was attached to.
/// For an item accessor, a path of length 1 names a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Human-readable description (e.g. an access-control denial).
    pub message: String,
    /// Location of the value that failed to resolve. Empty for errors that
    /// apply to the whole response.
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

impl FieldError {
    /// Creates an error attached to the given path.
    #[must_use]
    pub fn new(message: impl Into<String>, path: Vec<PathSegment>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }

    /// Whether this error targets exactly one field of an item accessor.
    #[must_use]
    pub fn is_field_level(&self) -> bool {
        self.path.len() == 1
    }
}

fn render_path(path: &[PathSegment]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn same_segment(a: &PathSegment, b: &PathSegment) -> bool {
    match (a, b) {
        (PathSegment::Index(i), PathSegment::Key(k)) | (PathSegment::Key(k), PathSegment::Index(i)) => {
            k.parse::<usize>().is_ok_and(|n| n == *i)
        }
        _ => a == b,
    }
}

fn lookup<'v>(value: &'v Value, key: &PathSegment) -> Option<&'v Value> {
    match (value, key) {
        (Value::Object(map), PathSegment::Key(k)) => map.get(k),
        (Value::Array(items), PathSegment::Index(i)) => items.get(*i),
        (Value::Array(items), PathSegment::Key(k)) => {
            k.parse::<usize>().ok().and_then(|i| items.get(i))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// SafeAccessor
// ---------------------------------------------------------------------------

/// Read-only, never-failing view into a JSON document plus its field errors.
///
/// # Examples
///
/// ```
/// use fieldkit_core::SafeAccessor;
/// use serde_json::json;
///
/// let item = SafeAccessor::from_data(json!({ "name": "Zed" }));
/// assert_eq!(item.get("name").data(), &json!("Zed"));
/// assert!(item.get("missing").get("deeper").data().is_null());
/// ```
#[derive(Debug, Clone)]
pub struct SafeAccessor {
    root: Arc<Value>,
    path: Vec<PathSegment>,
    /// `false` once navigation stepped through an absent or non-record value;
    /// the accessor then resolves to `null` regardless of `path`.
    resolved: bool,
    errors: Arc<[FieldError]>,
}

impl SafeAccessor {
    /// Wraps a document and the errors reported alongside it.
    #[must_use]
    pub fn new(data: Value, errors: Vec<FieldError>) -> Self {
        Self {
            root: Arc::new(data),
            path: Vec::new(),
            resolved: true,
            errors: errors.into(),
        }
    }

    /// Wraps a document that arrived without errors.
    #[must_use]
    pub fn from_data(data: Value) -> Self {
        Self::new(data, Vec::new())
    }

    /// An accessor over `null` with no errors (e.g. a not-yet-created item).
    #[must_use]
    pub fn null() -> Self {
        Self::from_data(Value::Null)
    }

    /// Returns an accessor over `data[key]`.
    ///
    /// Yields an accessor over `null` (keeping the same errors) when the
    /// current value is not an object/array or lacks `key`. Never fails.
    #[must_use]
    pub fn get(&self, key: impl Into<PathSegment>) -> Self {
        let key = key.into();
        let resolved = self.resolved && lookup(self.data(), &key).is_some();
        let mut path = self.path.clone();
        path.push(key);
        Self {
            root: Arc::clone(&self.root),
            path,
            resolved,
            errors: Arc::clone(&self.errors),
        }
    }

    /// Shorthand for `get(i)` on arrays.
    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        self.get(PathSegment::Index(i))
    }

    /// Returns the raw value at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::MissingField`] when the current value is not
    /// record-like or does not contain `key`.
    pub fn get_or_throw(&self, key: impl Into<PathSegment>) -> Result<&Value, AccessError> {
        let key = key.into();
        lookup(self.data(), &key).ok_or_else(|| {
            let mut path = self.path.clone();
            path.push(key);
            AccessError::MissingField {
                path: render_path(&path),
            }
        })
    }

    /// The value this accessor points at (`null` when absent).
    #[must_use]
    pub fn data(&self) -> &Value {
        if !self.resolved {
            return &NULL;
        }
        self.path
            .iter()
            .try_fold(&*self.root, |value, key| lookup(value, key))
            .unwrap_or(&NULL)
    }

    /// All errors attached to the document, at any depth.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Errors whose path is exactly this accessor's path. Numeric keys match
    /// array indexes, so `get("0")` sees an error reported at `[0]`.
    pub fn errors_here(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(move |e| {
            e.path.len() == self.path.len()
                && e.path.iter().zip(&self.path).all(|(a, b)| same_segment(a, b))
        })
    }

    /// Whether the value is `null` and an error explains why.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.data().is_null() && self.errors_here().next().is_some()
    }

    /// Path from the document root to this accessor.
    #[must_use]
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Whether both accessors view the same document snapshot at the same path.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root, &other.root) && self.path == other.path
    }
}

impl Default for SafeAccessor {
    fn default() -> Self {
        Self::null()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn denied_item() -> SafeAccessor {
        SafeAccessor::new(
            json!({ "name": "Zed", "email": null, "tags": ["a", "b"] }),
            vec![FieldError::new("Access denied", vec!["email".into()])],
        )
    }

    #[test]
    fn get_resolves_nested_values() {
        let item = SafeAccessor::from_data(json!({ "logo": { "url": "/x.png" } }));
        assert_eq!(item.get("logo").get("url").data(), &json!("/x.png"));
    }

    #[test]
    fn get_through_missing_key_yields_null_and_keeps_errors() {
        let item = denied_item();
        let deep = item.get("missing").get("deeper");
        assert!(deep.data().is_null());
        assert_eq!(deep.errors().len(), 1);
    }

    #[test]
    fn get_through_scalar_yields_null() {
        let item = denied_item();
        assert!(item.get("name").get("first").data().is_null());
    }

    #[test]
    fn get_indexes_arrays() {
        let item = denied_item();
        assert_eq!(item.get("tags").get(1).data(), &json!("b"));
        assert_eq!(item.get("tags").get("0").data(), &json!("a"));
        assert!(item.get("tags").get(5).data().is_null());
    }

    #[test]
    fn null_root_never_fails() {
        let root = SafeAccessor::null();
        assert!(root.get("missing").get("deeper").data().is_null());
    }

    #[test]
    fn get_or_throw_returns_raw_value() {
        let item = denied_item();
        assert_eq!(item.get_or_throw("name").unwrap(), &json!("Zed"));
        // Present-but-null is still present.
        assert_eq!(item.get_or_throw("email").unwrap(), &Value::Null);
    }

    #[test]
    fn get_or_throw_reports_missing_path() {
        let item = denied_item();
        let err = item.get("logo").get_or_throw("url").unwrap_err();
        assert_eq!(
            err,
            AccessError::MissingField {
                path: "logo.url".to_string()
            }
        );
    }

    #[test]
    fn errors_here_matches_exact_path() {
        let item = denied_item();
        assert!(item.get("email").is_denied());
        assert!(!item.get("name").is_denied());
        assert_eq!(item.errors_here().count(), 0);
    }

    #[test]
    fn errors_here_matches_numeric_keys_against_indexes() {
        let item = SafeAccessor::new(
            json!({ "tags": ["a", null] }),
            vec![FieldError::new("Access denied", vec!["tags".into(), PathSegment::Index(1)])],
        );
        assert!(item.get("tags").get("1").is_denied());
        assert!(item.get("tags").index(1).is_denied());
        assert_eq!(item.get("tags").get("0").errors_here().count(), 0);

        let keyed = SafeAccessor::new(
            json!({ "tags": [null] }),
            vec![FieldError::new("Access denied", vec!["tags".into(), "0".into()])],
        );
        assert!(keyed.get("tags").index(0).is_denied());
    }

    #[test]
    fn field_error_path_deserializes_mixed_segments() {
        let err: FieldError =
            serde_json::from_value(json!({ "message": "nope", "path": ["item", "tags", 0] }))
                .unwrap();
        assert_eq!(
            err.path,
            vec![
                PathSegment::Key("item".to_string()),
                PathSegment::Key("tags".to_string()),
                PathSegment::Index(0),
            ]
        );
    }

    #[test]
    fn clones_share_the_snapshot() {
        let item = denied_item();
        let again = item.clone();
        assert!(item.ptr_eq(&again));
        assert!(!item.ptr_eq(&denied_item()));
    }

    proptest! {
        #[test]
        fn navigation_from_null_is_always_null(keys in prop::collection::vec("[a-z]{1,6}", 0..8)) {
            let mut accessor = SafeAccessor::null();
            for key in &keys {
                accessor = accessor.get(key.as_str());
            }
            prop_assert!(accessor.data().is_null());
        }
    }
}
