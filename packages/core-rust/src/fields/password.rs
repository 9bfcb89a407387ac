use serde_json::Value;

use super::{mismatch, required_message, single, CompiledMatch, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::filter::FilterController;
use crate::schema::{FieldDescriptor, PasswordConfig, ValidationResult};
use crate::selection::Selection;
use crate::value::{EditValue, FieldValue, PasswordValue};

/// Write-only secret. Only `isSet` is ever read back; nothing is sent until
/// the user unlocks the field and types matching entries.
#[derive(Debug, Clone)]
pub struct PasswordController {
    descriptor: FieldDescriptor,
    config: PasswordConfig,
    pattern: Option<CompiledMatch>,
    filter: Option<FilterController>,
}

impl PasswordController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &PasswordConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            pattern: CompiledMatch::compile(&descriptor.path, config.pattern.as_ref()),
            filter: FilterController::for_descriptor(descriptor),
        }
    }
}

impl FieldController for PasswordController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Password(PasswordValue::Initial {
            is_set: Some(false),
        }))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let is_set = item.get(self.path()).get("isSet").data().as_bool();
        EditValue::update(FieldValue::Password(PasswordValue::Initial { is_set }))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Password(PasswordValue::Editing { value, .. }) => {
                single(self.path(), Value::String(value.clone()))
            }
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        let label = self.label();
        match value.value() {
            // Locked: nothing will be sent. Only a known-unset required
            // password blocks saving.
            FieldValue::Password(PasswordValue::Initial { is_set }) => {
                if self.config.is_required && *is_set == Some(false) {
                    ValidationResult::invalid(required_message(label))
                } else {
                    ValidationResult::Valid
                }
            }
            FieldValue::Password(PasswordValue::Editing { value, confirm, .. }) => {
                let mut errors = Vec::new();
                if value != confirm {
                    errors.push("The passwords do not match".to_string());
                }
                let length = value.chars().count();
                if let Some(min) = self.config.length.min.filter(|min| length < *min) {
                    errors.push(format!("{label} must be at least {min} characters long"));
                }
                if let Some(max) = self.config.length.max.filter(|max| length > *max) {
                    errors.push(format!("{label} must be no longer than {max} characters"));
                }
                if let Some(pattern) = &self.pattern {
                    pattern.check(label, value, &mut errors);
                }
                ValidationResult::from_errors(errors)
            }
            _ => mismatch(label),
        }
    }

    fn selection(&self) -> Selection {
        Selection::nested(self.path(), &["isSet"])
    }

    fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::FieldConfig;

    fn controller(config: PasswordConfig) -> PasswordController {
        let descriptor = FieldDescriptor::new("password", "Password", FieldConfig::Password(config.clone()));
        PasswordController::new(&descriptor, &config)
    }

    fn editing(value: &str, confirm: &str) -> EditValue {
        EditValue::update(FieldValue::Password(PasswordValue::Initial { is_set: Some(true) })).with_value(
            FieldValue::Password(PasswordValue::Editing {
                is_set: Some(true),
                value: value.to_string(),
                confirm: confirm.to_string(),
            }),
        )
    }

    #[test]
    fn deserialize_reads_only_is_set() {
        let password = controller(PasswordConfig::default());
        let item = SafeAccessor::from_data(json!({ "password": { "isSet": true } }));
        let value = password.deserialize(&item);
        assert_eq!(
            value.value(),
            &FieldValue::Password(PasswordValue::Initial { is_set: Some(true) })
        );
        assert!(password.serialize(&value).is_empty());
        assert_eq!(password.selection().to_string(), "password { isSet }");
    }

    #[test]
    fn editing_requires_matching_entries_and_length() {
        let password = controller(PasswordConfig::default());
        assert_eq!(
            password.validate(&editing("hunter22", "hunter23")).errors(),
            ["The passwords do not match".to_string()]
        );
        assert_eq!(
            password.validate(&editing("short", "short")).errors(),
            ["Password must be at least 8 characters long".to_string()]
        );
        let ok = editing("correct horse", "correct horse");
        assert!(password.validate(&ok).is_valid());
        assert_eq!(
            Value::Object(password.serialize(&ok)),
            json!({ "password": "correct horse" })
        );
    }

    #[test]
    fn required_blocks_only_a_known_unset_password() {
        let password = controller(PasswordConfig {
            is_required: true,
            ..PasswordConfig::default()
        });
        assert_eq!(
            password.validate(&password.default_value()).errors(),
            ["Password is required".to_string()]
        );
        let unreadable = EditValue::create(FieldValue::Password(PasswordValue::Initial { is_set: None }));
        assert!(password.validate(&unreadable).is_valid());
    }
}
