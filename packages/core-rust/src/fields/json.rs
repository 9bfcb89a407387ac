use serde_json::Value;

use super::{mismatch, single, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::schema::{FieldDescriptor, JsonConfig, ValidationResult};
use crate::value::{EditValue, FieldValue, JsonValue};

/// Free-form JSON document. Text that does not parse is kept as
/// [`JsonValue::Invalid`], never sent, and always fails validation.
#[derive(Debug, Clone)]
pub struct JsonController {
    descriptor: FieldDescriptor,
    config: JsonConfig,
}

impl JsonController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &JsonConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
        }
    }
}

fn parse_text(text: &str) -> JsonValue {
    match serde_json::from_str(text) {
        Ok(value) => JsonValue::Parsed { value },
        Err(err) => JsonValue::Invalid {
            text: text.to_string(),
            message: err.to_string(),
        },
    }
}

impl FieldController for JsonController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Json(JsonValue::Parsed {
            value: self.config.default_value.clone().unwrap_or(Value::Null),
        }))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let json = match item.get(self.path()).data() {
            Value::String(text) if self.config.stored_as_text => {
                let parsed = parse_text(text);
                if let JsonValue::Invalid { message, .. } = &parsed {
                    tracing::debug!(path = self.path(), error = %message, "stored JSON does not parse");
                }
                parsed
            }
            value => JsonValue::Parsed {
                value: value.clone(),
            },
        };
        EditValue::update(FieldValue::Json(json))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        let FieldValue::Json(JsonValue::Parsed { value }) = value.value() else {
            return Payload::new();
        };
        let wire = if self.config.stored_as_text && !value.is_null() {
            Value::String(value.to_string())
        } else {
            value.clone()
        };
        single(self.path(), wire)
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        match value.value() {
            FieldValue::Json(JsonValue::Parsed { .. }) => ValidationResult::Valid,
            FieldValue::Json(JsonValue::Invalid { message, .. }) => {
                ValidationResult::invalid(format!("{} must be valid JSON: {message}", self.label()))
            }
            _ => mismatch(self.label()),
        }
    }

    /// Blank input clears the document.
    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        let json = if input.trim().is_empty() {
            JsonValue::Parsed { value: Value::Null }
        } else {
            parse_text(input)
        };
        Some(FieldValue::Json(json))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::FieldConfig;

    fn controller(stored_as_text: bool) -> JsonController {
        let config = JsonConfig {
            stored_as_text,
            ..JsonConfig::default()
        };
        let descriptor = FieldDescriptor::new("meta", "Meta", FieldConfig::Json(config.clone()));
        JsonController::new(&descriptor, &config)
    }

    #[test]
    fn malformed_stored_text_becomes_invalid() {
        let meta = controller(true);
        let item = SafeAccessor::from_data(json!({ "meta": "{not json" }));
        let value = meta.deserialize(&item);
        assert!(matches!(
            value.value(),
            FieldValue::Json(JsonValue::Invalid { text, .. }) if text == "{not json"
        ));
        assert!(meta.serialize(&value).is_empty());
        // Untouched, so it does not block saving other fields.
        assert!(meta.validate(&value).is_valid());
        assert!(!meta.check(&value).is_valid());
    }

    #[test]
    fn invalid_input_blocks_save() {
        let meta = controller(false);
        let typed = meta.parse_input("[1, 2").unwrap();
        let edit = EditValue::update(FieldValue::Json(JsonValue::Parsed { value: Value::Null }))
            .with_value(typed);
        let result = meta.validate(&edit);
        assert!(result.errors()[0].starts_with("Meta must be valid JSON"));
        assert!(meta.serialize(&edit).is_empty());
    }

    #[test]
    fn text_storage_serializes_documents_as_strings() {
        let meta = controller(true);
        let edit = EditValue::create(meta.parse_input("{\"a\": 1}").unwrap());
        assert_eq!(Value::Object(meta.serialize(&edit)), json!({ "meta": "{\"a\":1}" }));
        let cleared = EditValue::create(meta.parse_input("  ").unwrap());
        assert_eq!(Value::Object(meta.serialize(&cleared)), json!({ "meta": null }));
    }
}
