//! In-progress, UI-shaped field values.
//!
//! An [`EditValue`] pairs the current [`FieldValue`] with the session kind:
//! a brand-new item (`Create`) or an edit of an existing one (`Update`,
//! which also remembers the value deserialized from the server).

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Mutable form state: field path -> edit value.
pub type ValueMap = BTreeMap<String, EditValue>;

// ---------------------------------------------------------------------------
// EditValue
// ---------------------------------------------------------------------------

/// One field's value during an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EditValue {
    /// The item does not exist on the server yet.
    Create { value: FieldValue },
    /// Editing an existing item; `initial` is the deserialized server value.
    Update { value: FieldValue, initial: FieldValue },
}

impl EditValue {
    #[must_use]
    pub fn create(value: FieldValue) -> Self {
        Self::Create { value }
    }

    /// An update value whose current value equals the server value.
    #[must_use]
    pub fn update(value: FieldValue) -> Self {
        Self::Update {
            initial: value.clone(),
            value,
        }
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        match self {
            Self::Create { value } | Self::Update { value, .. } => value,
        }
    }

    /// The server value, for `Update` only.
    #[must_use]
    pub fn initial(&self) -> Option<&FieldValue> {
        match self {
            Self::Create { .. } => None,
            Self::Update { initial, .. } => Some(initial),
        }
    }

    /// Replaces the current value, keeping the kind and initial value.
    #[must_use]
    pub fn with_value(&self, value: FieldValue) -> Self {
        match self {
            Self::Create { .. } => Self::Create { value },
            Self::Update { initial, .. } => Self::Update {
                value,
                initial: initial.clone(),
            },
        }
    }

    #[must_use]
    pub fn is_create(&self) -> bool {
        matches!(self, Self::Create { .. })
    }

    /// `true` for an update whose value is identical to the server value.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Update { value, initial } if value == initial)
    }

    /// `true` for an update where both the server value and the current
    /// value are null. The server may have returned null because the field
    /// is empty or because it is not readable by the current user.
    #[must_use]
    pub fn is_null_on_update(&self) -> bool {
        matches!(self, Self::Update { value, initial } if value.is_null() && initial.is_null())
    }
}

// ---------------------------------------------------------------------------
// FieldValue
// ---------------------------------------------------------------------------

/// The closed set of UI value shapes, one variant per field kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(TextValue),
    Integer(Option<i64>),
    BigInt(Option<i64>),
    Decimal(Option<Decimal>),
    Float(Option<f64>),
    Json(JsonValue),
    Select(Option<SelectOption>),
    Password(PasswordValue),
    Image(ImageValue),
}

impl FieldValue {
    /// Whether this value represents "nothing" for its kind.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Text(text) => matches!(text, TextValue::Null { .. }),
            Self::Integer(v) | Self::BigInt(v) => v.is_none(),
            Self::Decimal(v) => v.is_none(),
            Self::Float(v) => v.is_none(),
            Self::Json(json) => matches!(json, JsonValue::Parsed { value: Value::Null }),
            Self::Select(v) => v.is_none(),
            Self::Password(password) => {
                matches!(password, PasswordValue::Initial { is_set: None })
            }
            Self::Image(image) => matches!(image, ImageValue::Empty),
        }
    }
}

// ---------------------------------------------------------------------------
// Per-kind value shapes
// ---------------------------------------------------------------------------

/// Text value with an explicit null state.
///
/// `Null` keeps the text the user had typed so toggling back to a value
/// restores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TextValue {
    Null { previous: String },
    Value { value: String },
}

impl TextValue {
    #[must_use]
    pub fn value(text: impl Into<String>) -> Self {
        Self::Value { value: text.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Null { .. } => None,
            Self::Value { value } => Some(value),
        }
    }

    /// Switches to null, remembering the current text.
    #[must_use]
    pub fn into_null(self) -> Self {
        match self {
            Self::Value { value } => Self::Null { previous: value },
            null @ Self::Null { .. } => null,
        }
    }

    /// Switches back to a value, restoring the remembered text.
    #[must_use]
    pub fn into_value(self) -> Self {
        match self {
            Self::Null { previous } => Self::Value { value: previous },
            value @ Self::Value { .. } => value,
        }
    }
}

/// JSON field value. Unparsable text is kept as an explicit error state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum JsonValue {
    Parsed { value: Value },
    Invalid { text: String, message: String },
}

/// One configured choice of a select field. Values are always strings,
/// even when the field's semantic type is numeric.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Write-only password state. The secret never comes back from the server,
/// only whether one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PasswordValue {
    /// Locked: nothing will be sent. `is_set` is `None` when unreadable.
    #[serde(rename_all = "camelCase")]
    Initial { is_set: Option<bool> },
    /// The user chose to change the password.
    #[serde(rename_all = "camelCase")]
    Editing {
        is_set: Option<bool>,
        value: String,
        confirm: String,
    },
}

impl PasswordValue {
    #[must_use]
    pub fn is_set(&self) -> Option<bool> {
        match self {
            Self::Initial { is_set } | Self::Editing { is_set, .. } => *is_set,
        }
    }

    /// Unlocks the field with empty entries.
    #[must_use]
    pub fn start_editing(&self) -> Self {
        Self::Editing {
            is_set: self.is_set(),
            value: String::new(),
            confirm: String::new(),
        }
    }

    /// Locks the field again, discarding typed entries.
    #[must_use]
    pub fn cancel(&self) -> Self {
        Self::Initial {
            is_set: self.is_set(),
        }
    }
}

/// Stored image metadata as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub id: String,
    pub url: String,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub filesize: u64,
}

/// A file chosen by the user, not yet sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
}

/// Image field state. `Upload` and `Remove` keep the value they replaced so
/// the change can be undone locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ImageValue {
    Empty,
    FromServer { data: ImageData },
    Upload { upload: ImageUpload, previous: Box<ImageValue> },
    Remove { previous: Box<ImageValue> },
}

impl ImageValue {
    /// The value a pending change would restore (itself when nothing is pending).
    fn restore_point(self) -> Self {
        match self {
            Self::Upload { previous, .. } | Self::Remove { previous } => *previous,
            settled => settled,
        }
    }

    #[must_use]
    pub fn upload(self, upload: ImageUpload) -> Self {
        Self::Upload {
            upload,
            previous: Box::new(self.restore_point()),
        }
    }

    /// Marks the image for removal. Removing an empty value is a no-op.
    #[must_use]
    pub fn remove(self) -> Self {
        match self.restore_point() {
            Self::Empty => Self::Empty,
            previous => Self::Remove {
                previous: Box::new(previous),
            },
        }
    }

    /// Reverts a pending upload or removal.
    #[must_use]
    pub fn undo(self) -> Self {
        self.restore_point()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
