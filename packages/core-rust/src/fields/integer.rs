//! 32/64-bit integers (JSON numbers) and bigints (strings on the wire).

use serde_json::Value;

use super::{check_bounds, mismatch, required_message, single, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::filter::parse::parse_i64;
use crate::filter::FilterController;
use crate::schema::{BigIntConfig, FieldDescriptor, IntegerConfig, ValidationResult};
use crate::value::{EditValue, FieldValue};

/// Reads an integer stored as a number or as numeric text.
fn read_i64(path: &str, value: &Value) -> Option<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_i64(s),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        tracing::debug!(path, value = %value, "stored value is not a 64-bit integer");
    }
    parsed
}

/// Rules shared by both integer kinds.
struct IntegerRules {
    is_required: bool,
    autoincrement: bool,
    min: Option<i64>,
    max: Option<i64>,
}

impl IntegerRules {
    fn check(&self, label: &str, edit: &EditValue, value: Option<i64>) -> ValidationResult {
        match value {
            None if self.autoincrement && edit.is_create() => ValidationResult::Valid,
            None if self.is_required => ValidationResult::invalid(required_message(label)),
            None => ValidationResult::Valid,
            Some(n) => {
                let mut errors = Vec::new();
                check_bounds(label, &n, self.min.as_ref(), self.max.as_ref(), &mut errors);
                ValidationResult::from_errors(errors)
            }
        }
    }
}

/// Empty input clears the value; anything that is not a whole number is
/// rejected as null.
fn parse_integer_input(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_i64(trimmed)
}

// ---------------------------------------------------------------------------
// Integer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct IntegerController {
    descriptor: FieldDescriptor,
    config: IntegerConfig,
    filter: Option<FilterController>,
}

impl IntegerController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &IntegerConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            filter: FilterController::for_descriptor(descriptor),
        }
    }

    fn rules(&self) -> IntegerRules {
        IntegerRules {
            is_required: self.config.is_required,
            autoincrement: self.config.autoincrement,
            min: self.config.min,
            max: self.config.max,
        }
    }
}

impl FieldController for IntegerController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Integer(self.config.default_value))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let value = read_i64(self.path(), item.get(self.path()).data());
        EditValue::update(FieldValue::Integer(value))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Integer(n) => single(self.path(), n.map_or(Value::Null, Value::from)),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        match value.value() {
            FieldValue::Integer(n) => self.rules().check(self.label(), value, *n),
            _ => mismatch(self.label()),
        }
    }

    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        Some(FieldValue::Integer(parse_integer_input(input)))
    }

    fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }
}

// ---------------------------------------------------------------------------
// BigInt
// ---------------------------------------------------------------------------

/// 64-bit integer carried as a string so no client loses precision.
#[derive(Debug, Clone)]
pub struct BigIntController {
    descriptor: FieldDescriptor,
    config: BigIntConfig,
    filter: Option<FilterController>,
}

impl BigIntController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &BigIntConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            filter: FilterController::for_descriptor(descriptor),
        }
    }
}

impl FieldController for BigIntController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::BigInt(self.config.default_value))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let value = read_i64(self.path(), item.get(self.path()).data());
        EditValue::update(FieldValue::BigInt(value))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::BigInt(n) => single(
                self.path(),
                n.map_or(Value::Null, |n| Value::String(n.to_string())),
            ),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        let FieldValue::BigInt(n) = value.value() else {
            return mismatch(self.label());
        };
        let rules = IntegerRules {
            is_required: self.config.is_required,
            autoincrement: self.config.autoincrement,
            min: self.config.min,
            max: self.config.max,
        };
        rules.check(self.label(), value, *n)
    }

    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        Some(FieldValue::BigInt(parse_integer_input(input)))
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

    fn integer(config: IntegerConfig) -> IntegerController {
        let descriptor = FieldDescriptor::new("age", "Age", FieldConfig::Integer(config.clone()));
        IntegerController::new(&descriptor, &config)
    }

    fn bigint(config: BigIntConfig) -> BigIntController {
        let descriptor = FieldDescriptor::new("views", "Views", FieldConfig::BigInt(config.clone()));
        BigIntController::new(&descriptor, &config)
    }

    #[test]
    fn parse_input_accepts_whole_numbers_only() {
        let age = integer(IntegerConfig::default());
        assert_eq!(age.parse_input("42"), Some(FieldValue::Integer(Some(42))));
        assert_eq!(age.parse_input("4.2"), Some(FieldValue::Integer(None)));
        assert_eq!(age.parse_input("  "), Some(FieldValue::Integer(None)));
    }

    #[test]
    fn parse_input_rejects_interior_separators() {
        let age = integer(IntegerConfig::default());
        for input in ["4 2", "1 000", "1_0"] {
            assert_eq!(age.parse_input(input), Some(FieldValue::Integer(None)), "{input}");
        }
    }

    #[test]
    fn range_messages() {
        let age = integer(IntegerConfig {
            min: Some(0),
            max: Some(10),
            ..IntegerConfig::default()
        });
        let too_big = EditValue::create(FieldValue::Integer(Some(15)));
        let errors = age.validate(&too_big);
        assert_eq!(errors.errors(), ["Age must be less than or equal to 10".to_string()]);
        let too_small = EditValue::create(FieldValue::Integer(Some(-1)));
        assert_eq!(
            age.validate(&too_small).errors(),
            ["Age must be greater than or equal to 0".to_string()]
        );
    }

    #[test]
    fn autoincrement_allows_null_on_create() {
        let required = IntegerConfig {
            is_required: true,
            ..IntegerConfig::default()
        };
        let null = EditValue::create(FieldValue::Integer(None));
        assert_eq!(
            integer(required.clone()).validate(&null).errors(),
            ["Age is required".to_string()]
        );
        let auto = integer(IntegerConfig {
            autoincrement: true,
            ..required
        });
        assert!(auto.validate(&null).is_valid());
        let cleared = EditValue::update(FieldValue::Integer(Some(3))).with_value(FieldValue::Integer(None));
        assert!(!auto.validate(&cleared).is_valid());
    }

    #[test]
    fn reads_numeric_strings() {
        let age = integer(IntegerConfig::default());
        let item = SafeAccessor::from_data(json!({ "age": "12" }));
        assert_eq!(age.deserialize(&item).value(), &FieldValue::Integer(Some(12)));
    }

    #[test]
    fn bigint_keeps_full_precision() {
        let views = bigint(BigIntConfig::default());
        let item = SafeAccessor::from_data(json!({ "views": "9223372036854775807" }));
        let value = views.deserialize(&item);
        assert_eq!(value.value(), &FieldValue::BigInt(Some(i64::MAX)));
        assert_eq!(
            Value::Object(views.serialize(&value)),
            json!({ "views": "9223372036854775807" })
        );
    }

    #[test]
    fn bigint_bounds_compare_numerically() {
        let views = bigint(BigIntConfig {
            max: Some(100),
            ..BigIntConfig::default()
        });
        let value = EditValue::create(FieldValue::BigInt(Some(99)));
        assert!(views.validate(&value).is_valid());
        let value = EditValue::create(FieldValue::BigInt(Some(101)));
        assert!(!views.validate(&value).is_valid());
    }
}
