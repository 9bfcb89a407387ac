use serde_json::Value;

use super::{mismatch, required_message, single, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::filter::parse::{parse_i64, scalar_text};
use crate::filter::FilterController;
use crate::schema::{FieldDescriptor, SelectConfig, SelectValueKind, ValidationResult};
use crate::value::{EditValue, FieldValue, SelectOption};

/// One choice among configured options. Option values are strings; integer
/// selects convert to numbers only on the wire.
#[derive(Debug, Clone)]
pub struct SelectController {
    descriptor: FieldDescriptor,
    config: SelectConfig,
    filter: Option<FilterController>,
}

impl SelectController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &SelectConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            filter: FilterController::for_descriptor(descriptor),
        }
    }

    #[must_use]
    pub fn options(&self) -> &[SelectOption] {
        &self.config.options
    }

    /// The option whose value equals `value` as a string.
    #[must_use]
    pub fn option(&self, value: &str) -> Option<&SelectOption> {
        self.config.options.iter().find(|option| option.value == value)
    }

    fn wire_value(&self, option: &SelectOption) -> Value {
        match self.config.value_kind {
            SelectValueKind::Integer => match parse_i64(&option.value) {
                Some(n) => Value::from(n),
                None => {
                    tracing::debug!(path = self.path(), value = %option.value, "integer select option is not a number");
                    Value::Null
                }
            },
            SelectValueKind::String | SelectValueKind::Enum => Value::String(option.value.clone()),
        }
    }
}

impl FieldController for SelectController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        let option = self
            .config
            .default_value
            .as_deref()
            .and_then(|value| self.option(value))
            .cloned();
        EditValue::create(FieldValue::Select(option))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let stored = item.get(self.path());
        let option = scalar_text(stored.data()).and_then(|value| {
            let found = self.option(&value).cloned();
            if found.is_none() {
                tracing::debug!(path = self.path(), value = %value, "stored value matches no option");
            }
            found
        });
        EditValue::update(FieldValue::Select(option))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Select(option) => single(
                self.path(),
                option.as_ref().map_or(Value::Null, |o| self.wire_value(o)),
            ),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        match value.value() {
            FieldValue::Select(None) if self.config.is_required => {
                ValidationResult::invalid(required_message(self.label()))
            }
            FieldValue::Select(_) => ValidationResult::Valid,
            _ => mismatch(self.label()),
        }
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

    fn controller(config: SelectConfig) -> SelectController {
        let descriptor = FieldDescriptor::new("color", "Color", FieldConfig::Select(config.clone()));
        SelectController::new(&descriptor, &config)
    }

    #[test]
    fn default_resolves_by_string_equality() {
        let color = controller(SelectConfig {
            options: vec![SelectOption::new("Red", "red")],
            default_value: Some("red".to_string()),
            ..SelectConfig::default()
        });
        assert_eq!(
            color.default_value().value(),
            &FieldValue::Select(Some(SelectOption::new("Red", "red")))
        );
    }

    #[test]
    fn integer_kind_reads_and_writes_numbers() {
        let size = controller(SelectConfig {
            options: vec![SelectOption::new("Small", "1"), SelectOption::new("Large", "2")],
            value_kind: SelectValueKind::Integer,
            ..SelectConfig::default()
        });
        let value = size.deserialize(&SafeAccessor::from_data(json!({ "color": 2 })));
        assert_eq!(
            value.value(),
            &FieldValue::Select(Some(SelectOption::new("Large", "2")))
        );
        assert_eq!(Value::Object(size.serialize(&value)), json!({ "color": 2 }));
    }

    #[test]
    fn unknown_stored_values_read_as_none() {
        let color = controller(SelectConfig {
            options: vec![SelectOption::new("Red", "red")],
            is_required: true,
            ..SelectConfig::default()
        });
        let value = color.deserialize(&SafeAccessor::from_data(json!({ "color": "blue" })));
        assert_eq!(value.value(), &FieldValue::Select(None));
        assert_eq!(
            color.validate(&color.default_value()).errors(),
            ["Color is required".to_string()]
        );
    }
}
