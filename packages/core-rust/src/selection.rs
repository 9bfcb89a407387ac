//! Backend field selections.
//!
//! Each field controller reports what it needs fetched to deserialize its
//! value: a scalar path, or a nested selection for structured values.

use std::fmt;

/// Sub-selection requested from the backend for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Scalar(String),
    Nested { path: String, fields: Vec<String> },
}

impl Selection {
    #[must_use]
    pub fn scalar(path: impl Into<String>) -> Self {
        Self::Scalar(path.into())
    }

    #[must_use]
    pub fn nested(path: impl Into<String>, fields: &[&str]) -> Self {
        Self::Nested {
            path: path.into(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Scalar(path) | Self::Nested { path, .. } => path,
        }
    }
}

/// Renders as a GraphQL selection fragment.
impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(path) => f.write_str(path),
            Self::Nested { path, fields } => write!(f, "{path} {{ {} }}", fields.join(" ")),
        }
    }
}
