//! Decimal and floating-point fields.

use rust_decimal::Decimal;
use serde_json::{Number, Value};

use super::{check_bounds, mismatch, required_message, single, FieldController, Payload};
use crate::accessor::SafeAccessor;
use crate::filter::parse::{parse_decimal, parse_f64};
use crate::filter::FilterController;
use crate::schema::{DecimalConfig, FieldDescriptor, FloatConfig, ValidationResult};
use crate::value::{EditValue, FieldValue};

// ---------------------------------------------------------------------------
// Decimal
// ---------------------------------------------------------------------------

/// Fixed-point decimal with configured precision and scale. Travels as a
/// string in both directions.
#[derive(Debug, Clone)]
pub struct DecimalController {
    descriptor: FieldDescriptor,
    config: DecimalConfig,
    filter: Option<FilterController>,
}

impl DecimalController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &DecimalConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            filter: FilterController::for_descriptor(descriptor),
        }
    }

    fn read(&self, value: &Value) -> Option<Decimal> {
        let parsed = match value {
            Value::String(s) => parse_decimal(s),
            Value::Number(n) => {
                let text = n.to_string();
                parse_decimal(&text).or_else(|| Decimal::from_scientific(&text).ok())
            }
            _ => None,
        };
        if parsed.is_none() && !value.is_null() {
            tracing::debug!(path = self.path(), value = %value, "stored value is not a decimal");
        }
        parsed
    }
}

/// Number of digits left of the decimal point (`0.5` has none).
fn integer_digits(value: Decimal) -> usize {
    let whole = value.trunc().abs();
    if whole.is_zero() {
        0
    } else {
        whole.to_string().len()
    }
}

impl FieldController for DecimalController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Decimal(self.config.default_value))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let value = self.read(item.get(self.path()).data());
        EditValue::update(FieldValue::Decimal(value))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Decimal(d) => single(
                self.path(),
                d.map_or(Value::Null, |d| Value::String(d.to_string())),
            ),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        let FieldValue::Decimal(decimal) = value.value() else {
            return mismatch(self.label());
        };
        let label = self.label();
        let Some(decimal) = decimal else {
            return if self.config.is_required {
                ValidationResult::invalid(required_message(label))
            } else {
                ValidationResult::Valid
            };
        };

        let mut errors = Vec::new();
        let scale = self.config.scale;
        if decimal.normalize().scale() > scale {
            errors.push(format!("{label} must have no more than {scale} decimal places"));
        }
        let whole_digits = self.config.precision.saturating_sub(scale) as usize;
        if integer_digits(*decimal) > whole_digits {
            errors.push(format!(
                "{label} must have no more than {whole_digits} digits before the decimal point"
            ));
        }
        check_bounds(
            label,
            decimal,
            self.config.min.as_ref(),
            self.config.max.as_ref(),
            &mut errors,
        );
        ValidationResult::from_errors(errors)
    }

    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        Some(FieldValue::Decimal(parse_decimal(input)))
    }

    fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }
}

// ---------------------------------------------------------------------------
// Float
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FloatController {
    descriptor: FieldDescriptor,
    config: FloatConfig,
    filter: Option<FilterController>,
}

impl FloatController {
    #[must_use]
    pub fn new(descriptor: &FieldDescriptor, config: &FloatConfig) -> Self {
        Self {
            descriptor: descriptor.clone(),
            config: config.clone(),
            filter: FilterController::for_descriptor(descriptor),
        }
    }
}

impl FieldController for FloatController {
    fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    fn default_value(&self) -> EditValue {
        EditValue::create(FieldValue::Float(self.config.default_value))
    }

    fn deserialize(&self, item: &SafeAccessor) -> EditValue {
        let value = match item.get(self.path()).data() {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_f64(s),
            _ => None,
        };
        EditValue::update(FieldValue::Float(value))
    }

    fn serialize(&self, value: &EditValue) -> Payload {
        match value.value() {
            FieldValue::Float(f) => single(
                self.path(),
                f.and_then(Number::from_f64).map_or(Value::Null, Value::Number),
            ),
            _ => Payload::new(),
        }
    }

    fn check(&self, value: &EditValue) -> ValidationResult {
        match value.value() {
            FieldValue::Float(None) if self.config.is_required => {
                ValidationResult::invalid(required_message(self.label()))
            }
            FieldValue::Float(None) => ValidationResult::Valid,
            FieldValue::Float(Some(f)) => {
                let mut errors = Vec::new();
                check_bounds(
                    self.label(),
                    f,
                    self.config.min.as_ref(),
                    self.config.max.as_ref(),
                    &mut errors,
                );
                ValidationResult::from_errors(errors)
            }
            _ => mismatch(self.label()),
        }
    }

    fn parse_input(&self, input: &str) -> Option<FieldValue> {
        Some(FieldValue::Float(parse_f64(input)))
    }

    fn filter(&self) -> Option<&FilterController> {
        self.filter.as_ref()
    }
}
