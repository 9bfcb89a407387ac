use serde_json::Value;

use super::{mismatch, required_message, single, CompiledMatch, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::filter::FilterController;
use crate::schema::{FieldDescriptor, TextConfig, ValidationResult};
use crate::value::{EditValue, FieldValue, TextValue};

/// Single-line or multi-line text, optionally nullable.
#[derive(Debug, Clone)]
pub struct TextController {
    descriptor: FieldDescriptor,
    config: TextConfig,
    pattern: Option<CompiledMatch>,
    filter: Option<FilterController>,
}

impl TextController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &TextConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            pattern: CompiledMatch::compile(&descriptor.path, config.pattern.as_ref()),
            filter: FilterController::for_descriptor(descriptor),
        }
    }
}

impl FieldController for TextController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        let text = match &self.config.default_value {
            Some(text) => TextValue::value(text.as_str()),
            None if self.config.is_nullable => TextValue::Null {
                previous: String::new(),
            },
            None => TextValue::value(""),
        };
        EditValue::create(FieldValue::Text(text))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let text = match item.get(self.path()).data() {
            Value::String(s) => TextValue::value(s.as_str()),
            Value::Null => TextValue::Null {
                previous: String::new(),
            },
            other => {
                tracing::debug!(path = self.path(), value = %other, "text field holds a non-string value");
                TextValue::value(other.to_string())
            }
        };
        EditValue::update(FieldValue::Text(text))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Text(text) => single(
                self.path(),
                text.as_str().map_or(Value::Null, |s| Value::String(s.to_string())),
            ),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        let FieldValue::Text(text) = value.value() else {
            return mismatch(self.label());
        };
        let label = self.label();
        let Some(text) = text.as_str() else {
            return if self.config.is_required {
                ValidationResult::invalid(required_message(label))
            } else {
                ValidationResult::Valid
            };
        };
        if self.config.is_required && text.is_empty() {
            return ValidationResult::invalid(required_message(label));
        }

        let mut errors = Vec::new();
        let length = text.chars().count();
        match self.config.length.min {
            Some(1) if length == 0 => errors.push(format!("{label} must not be empty")),
            Some(min) if length < min => {
                errors.push(format!("{label} must be at least {min} characters long"));
            }
            _ => {}
        }
        if let Some(max) = self.config.length.max.filter(|max| length > *max) {
            errors.push(format!("{label} must be no longer than {max} characters"));
        }
        if let Some(pattern) = &self.pattern {
            pattern.check(label, text, &mut errors);
        }
        ValidationResult::from_errors(errors)
    }

    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        Some(FieldValue::Text(TextValue::value(input)))
    }

    fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{FieldConfig, LengthRule, MatchRule};

    fn controller(config: TextConfig) -> TextController {
        let descriptor = FieldDescriptor::new("name", "Name", FieldConfig::Text(config.clone()));
        TextController::new(&descriptor, &config)
    }

    fn edited(text: &str) -> EditValue {
        EditValue::update(FieldValue::Text(TextValue::value("original")))
            .with_value(FieldValue::Text(TextValue::value(text)))
    }

    #[test]
    fn length_messages() {
        let text = controller(TextConfig {
            length: LengthRule {
                min: Some(3),
                max: Some(5),
            },
            ..TextConfig::default()
        });
        assert_eq!(
            text.validate(&edited("ab")).errors(),
            ["Name must be at least 3 characters long".to_string()]
        );
        assert_eq!(
            text.validate(&edited("abcdef")).errors(),
            ["Name must be no longer than 5 characters".to_string()]
        );
        assert!(text.validate(&edited("abcd")).is_valid());
    }

    #[test]
    fn min_of_one_reads_as_not_empty() {
        let text = controller(TextConfig {
            length: LengthRule {
                min: Some(1),
                max: None,
            },
            ..TextConfig::default()
        });
        assert_eq!(
            text.validate(&edited("")).errors(),
            ["Name must not be empty".to_string()]
        );
    }

    #[test]
    fn required_rejects_null_and_empty() {
        let text = controller(TextConfig {
            is_required: true,
            is_nullable: true,
            ..TextConfig::default()
        });
        assert_eq!(
            text.validate(&text.default_value()).errors(),
            ["Name is required".to_string()]
        );
        assert_eq!(
            text.validate(&edited("")).errors(),
            ["Name is required".to_string()]
        );
    }

    #[test]
    fn match_rule_uses_explanation() {
        let text = controller(TextConfig {
            pattern: Some(MatchRule {
                regex: "^[a-z]+$".to_string(),
                explanation: Some("Name must be lowercase letters".to_string()),
            }),
            ..TextConfig::default()
        });
        assert_eq!(
            text.validate(&edited("Abc")).errors(),
            ["Name must be lowercase letters".to_string()]
        );
        assert!(text.validate(&edited("abc")).is_valid());
    }

    #[test]
    fn null_serializes_as_null() {
        let text = controller(TextConfig {
            is_nullable: true,
            ..TextConfig::default()
        });
        assert_eq!(text.default_value().value(), &FieldValue::Text(TextValue::Null { previous: String::new() }));
        assert_eq!(
            Value::Object(text.serialize(&text.default_value())),
            json!({ "name": null })
        );
    }

    #[test]
    fn invalid_regex_is_ignored() {
        let text = controller(TextConfig {
            pattern: Some(MatchRule {
                regex: "(".to_string(),
                explanation: None,
            }),
            ..TextConfig::default()
        });
        assert!(text.validate(&edited("anything")).is_valid());
    }
}
