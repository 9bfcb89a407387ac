//! Schema-derived field descriptors.
//!
//! A [`ListSchema`] describes one list (content type) of the catalog: its
//! key and one [`FieldDescriptor`] per editable property. Descriptors are
//! immutable and dispatch to a field controller through their `type` tag.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::value::SelectOption;

// ---------------------------------------------------------------------------
// Lists and descriptors
// ---------------------------------------------------------------------------

/// Field descriptors for one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSchema {
    /// List key, e.g. `"Tool"`.
    pub key: String,
    /// Editable fields, in display order.
    pub fields: Vec<FieldDescriptor>,
    /// Paths of text fields searched by the `search` query parameter.
    #[serde(default)]
    pub search_fields: Vec<String>,
}

impl ListSchema {
    /// Looks up a field by path.
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.path == path)
    }
}

/// Static description of one editable property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Property path on the item (also the key in save payloads).
    pub path: String,
    /// Human-readable label used in validation messages.
    pub label: String,
    /// Kind tag plus kind-specific configuration.
    #[serde(flatten)]
    pub config: FieldConfig,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, label: impl Into<String>, config: FieldConfig) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
            config,
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.config.kind()
    }
}

/// Field type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Integer,
    BigInt,
    Decimal,
    Float,
    Json,
    Select,
    Password,
    Image,
}

impl FieldKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::BigInt => "big_int",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Json => "json",
            Self::Select => "select",
            Self::Password => "password",
            Self::Image => "image",
        }
    }
}

/// Per-kind configuration, tagged by `"type"` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldConfig {
    Text(TextConfig),
    Integer(IntegerConfig),
    BigInt(BigIntConfig),
    Decimal(DecimalConfig),
    Float(FloatConfig),
    Json(JsonConfig),
    Select(SelectConfig),
    Password(PasswordConfig),
    Image(ImageConfig),
}

impl FieldConfig {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Integer(_) => FieldKind::Integer,
            Self::BigInt(_) => FieldKind::BigInt,
            Self::Decimal(_) => FieldKind::Decimal,
            Self::Float(_) => FieldKind::Float,
            Self::Json(_) => FieldKind::Json,
            Self::Select(_) => FieldKind::Select,
            Self::Password(_) => FieldKind::Password,
            Self::Image(_) => FieldKind::Image,
        }
    }
}

// ---------------------------------------------------------------------------
// Shared rules
// ---------------------------------------------------------------------------

/// Inclusive character-length bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthRule {
    #[serde(default)]
    pub min: Option<usize>,
    #[serde(default)]
    pub max: Option<usize>,
}

/// Regex the value must match, with an optional user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub regex: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

// ---------------------------------------------------------------------------
// Per-kind configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextConfig {
    pub is_required: bool,
    /// Whether the field distinguishes null from the empty string.
    pub is_nullable: bool,
    pub length: LengthRule,
    #[serde(rename = "match")]
    pub pattern: Option<MatchRule>,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegerConfig {
    pub is_required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub default_value: Option<i64>,
    /// The backend assigns a value when none is sent on create.
    pub autoincrement: bool,
}

/// 64-bit integer whose wire form is a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BigIntConfig {
    pub is_required: bool,
    #[serde(deserialize_with = "lenient_i64")]
    pub min: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub max: Option<i64>,
    #[serde(deserialize_with = "lenient_i64")]
    pub default_value: Option<i64>,
    pub autoincrement: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecimalConfig {
    pub is_required: bool,
    /// Total number of significant digits.
    pub precision: u32,
    /// Digits after the decimal point.
    pub scale: u32,
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
    pub default_value: Option<Decimal>,
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self {
            is_required: false,
            precision: 18,
            scale: 4,
            min: None,
            max: None,
            default_value: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FloatConfig {
    pub is_required: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default_value: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonConfig {
    pub default_value: Option<Value>,
    /// The backend returns the document as serialized text rather than as
    /// a JSON value.
    pub stored_as_text: bool,
}

/// Semantic type of a select field's stored value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectValueKind {
    #[default]
    String,
    Integer,
    Enum,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectConfig {
    pub options: Vec<SelectOption>,
    pub value_kind: SelectValueKind,
    pub is_required: bool,
    #[serde(deserialize_with = "lenient_string")]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordConfig {
    pub is_required: bool,
    pub length: LengthRule,
    #[serde(rename = "match")]
    pub pattern: Option<MatchRule>,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            is_required: false,
            length: LengthRule {
                min: Some(8),
                max: None,
            },
            pattern: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageConfig {
    pub is_required: bool,
}

// ---------------------------------------------------------------------------
// Validation outcome
// ---------------------------------------------------------------------------

/// Result of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The value can be saved.
    Valid,
    /// The value violates one or more rules.
    Invalid {
        /// Human-readable descriptions of each failure.
        errors: Vec<String>,
    },
}

impl ValidationResult {
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            errors: vec![message.into()],
        }
    }

    /// `Valid` when `errors` is empty.
    #[must_use]
    pub fn from_errors(errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid { errors }
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Valid => &[],
            Self::Invalid { errors } => errors,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient scalar helpers
// ---------------------------------------------------------------------------

/// Accepts `123`, `"123"` or `null`.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("{n} is not a 64-bit integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("{s:?} is not a 64-bit integer"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected integer or string, got {other}"
        ))),
    }
}

/// Accepts strings or numbers and keeps the string form.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn descriptor_deserializes_with_type_tag() {
        let desc: FieldDescriptor = serde_json::from_value(json!({
            "path": "age",
            "label": "Age",
            "type": "integer",
            "isRequired": true,
            "min": 0,
            "max": 10
        }))
        .unwrap();
        assert_eq!(desc.kind(), FieldKind::Integer);
        let FieldConfig::Integer(config) = desc.config else {
            panic!("expected integer config");
        };
        assert!(config.is_required);
        assert_eq!(config.max, Some(10));
        assert!(!config.autoincrement);
    }

    #[test]
    fn bigint_bounds_accept_strings() {
        let config: BigIntConfig = serde_json::from_value(json!({
            "min": "-9223372036854775808",
            "max": 9_223_372_036_854_775_807_i64
        }))
        .unwrap();
        assert_eq!(config.min, Some(i64::MIN));
        assert_eq!(config.max, Some(i64::MAX));
    }

    #[test]
    fn select_default_accepts_numbers() {
        let config: SelectConfig = serde_json::from_value(json!({
            "valueKind": "integer",
            "options": [{ "label": "One", "value": "1" }],
            "defaultValue": 1
        }))
        .unwrap();
        assert_eq!(config.default_value.as_deref(), Some("1"));
        assert_eq!(config.value_kind, SelectValueKind::Integer);
    }

    #[test]
    fn decimal_and_password_defaults() {
        let decimal: DecimalConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!((decimal.precision, decimal.scale), (18, 4));
        let password: PasswordConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(password.length.min, Some(8));
    }

    #[test]
    fn text_match_rule_uses_match_key() {
        let config: TextConfig = serde_json::from_value(json!({
            "match": { "regex": "^[a-z]+$", "explanation": "lowercase only" }
        }))
        .unwrap();
        assert_eq!(config.pattern.unwrap().regex, "^[a-z]+$");
    }

    #[test]
    fn list_schema_field_lookup() {
        let schema: ListSchema = serde_json::from_value(json!({
            "key": "Tool",
            "fields": [{ "path": "name", "label": "Name", "type": "text" }],
            "searchFields": ["name"]
        }))
        .unwrap();
        assert_eq!(schema.field("name").map(FieldDescriptor::kind), Some(FieldKind::Text));
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn validation_result_from_errors() {
        assert!(ValidationResult::from_errors(Vec::new()).is_valid());
        let invalid = ValidationResult::invalid("Name is required");
        assert_eq!(invalid.errors(), ["Name is required".to_string()]);
    }

    #[test]
    fn select_config_carries_only_what_controllers_read() {
        let desc: FieldDescriptor = serde_json::from_value(json!({
            "path": "license",
            "label": "License",
            "type": "select",
            "displayMode": "radio",
            "options": [{ "label": "MIT", "value": "mit" }]
        }))
        .unwrap();
        let rendered = serde_json::to_value(&desc).unwrap();
        assert!(rendered.get("displayMode").is_none());
        assert_eq!(rendered["options"][0]["value"], "mit");
    }
}
