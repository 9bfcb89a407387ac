//! Field controllers: the per-kind contract driven by the form engine.
//!
//! Every field kind implements [`FieldController`]. A controller is built
//! from a [`FieldDescriptor`] and is pure: it converts between the server
//! shape (read through a [`SafeAccessor`]) and the edit shape
//! ([`EditValue`]), validates, and reports the selection it needs fetched.
//!
//! Policies shared by every kind live in the provided
//! [`FieldController::validate`] method; kinds only implement `check`.

mod image;
mod integer;
mod json;
mod number;
mod password;
mod select;
mod text;

use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::accessor::SafeAccessor;
use crate::filter::FilterController;
use crate::schema::{FieldConfig, FieldDescriptor, FieldKind, ListSchema, MatchRule, ValidationResult};
use crate::selection::Selection;
use crate::value::{EditValue, FieldValue};

pub use image::{ImageController, ACCEPTED_IMAGE_EXTENSIONS};
pub use integer::{BigIntController, IntegerController};
pub use json::JsonController;
pub use number::{DecimalController, FloatController};
pub use password::PasswordController;
pub use select::SelectController;
pub use text::TextController;

/// Partial save payload: field path -> server-ready value.
pub type Payload = Map<String, Value>;

// ---------------------------------------------------------------------------
// FieldController
// ---------------------------------------------------------------------------

/// Per-kind field logic.
pub trait FieldController: Send + Sync + fmt::Debug {
    /// The descriptor this controller was built from.
    fn descriptor(&self) -> &FieldDescriptor;

    fn kind(&self) -> FieldKind {
        self.descriptor().kind()
    }

    fn path(&self) -> &str {
        &self.descriptor().path
    }

    fn label(&self) -> &str {
        &self.descriptor().label
    }

    /// Starting value for a new item.
    fn default_value(&self) -> EditValue;

    /// Reads the server value from an item accessor into an `Update` value.
    fn deserialize(&self, item: &SafeAccessor) -> EditValue;

    /// Converts the current value into its save payload. May be empty.
    fn serialize(&self, value: &EditValue) -> Payload;

    /// Kind-specific validation, without the shared policies.
    fn check(&self, value: &EditValue) -> ValidationResult;

    /// Validates a value.
    ///
    /// Unchanged update values always pass, as do updates where both the
    /// server value and the current value are null (the server may have
    /// withheld a field the user cannot read).
    fn validate(&self, value: &EditValue) -> ValidationResult {
        if value.is_unchanged() || value.is_null_on_update() {
            return ValidationResult::Valid;
        }
        self.check(value)
    }

    /// What to request from the backend to deserialize this field.
    fn selection(&self) -> Selection {
        Selection::scalar(self.path())
    }

    /// Parses free-text user input. `None` for kinds that are not edited as
    /// text.
    fn parse_input(&self, _input: &str) -> Option<FieldValue> {
        None
    }

    /// Filter logic, for filterable kinds.
    fn filter(&self) -> Option<&FilterController> {
        None
    }
}

/// Builds the controller for a descriptor, dispatching on its type tag.
#[must_use]
pub fn controller_for(descriptor: &FieldDescriptor) -> Box<dyn FieldController> {
    match &descriptor.config {
        FieldConfig::Text(config) => Box::new(TextController::new(descriptor, config)),
        FieldConfig::Integer(config) => Box::new(IntegerController::new(descriptor, config)),
        FieldConfig::BigInt(config) => Box::new(BigIntController::new(descriptor, config)),
        FieldConfig::Decimal(config) => Box::new(DecimalController::new(descriptor, config)),
        FieldConfig::Float(config) => Box::new(FloatController::new(descriptor, config)),
        FieldConfig::Json(config) => Box::new(JsonController::new(descriptor, config)),
        FieldConfig::Select(config) => Box::new(SelectController::new(descriptor, config)),
        FieldConfig::Password(config) => Box::new(PasswordController::new(descriptor, config)),
        FieldConfig::Image(config) => Box::new(ImageController::new(descriptor, config)),
    }
}

impl FieldDescriptor {
    /// Shorthand for [`controller_for`].
    #[must_use]
    pub fn controller(&self) -> Box<dyn FieldController> {
        controller_for(self)
    }
}

// ---------------------------------------------------------------------------
// FieldSet
// ---------------------------------------------------------------------------

/// The ordered controllers of one list.
#[derive(Debug, Default)]
pub struct FieldSet {
    controllers: Vec<Box<dyn FieldController>>,
}

impl FieldSet {
    #[must_use]
    pub fn new(descriptors: &[FieldDescriptor]) -> Self {
        Self {
            controllers: descriptors.iter().map(controller_for).collect(),
        }
    }

    #[must_use]
    pub fn from_schema(schema: &ListSchema) -> Self {
        Self::new(&schema.fields)
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&dyn FieldController> {
        self.controllers
            .iter()
            .find(|c| c.path() == path)
            .map(AsRef::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn FieldController> {
        self.controllers.iter().map(AsRef::as_ref)
    }

    /// Selections for every field, in display order.
    #[must_use]
    pub fn selections(&self) -> Vec<Selection> {
        self.iter().map(FieldController::selection).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn single(path: &str, value: Value) -> Payload {
    let mut payload = Payload::new();
    payload.insert(path.to_string(), value);
    payload
}

fn required_message(label: &str) -> String {
    format!("{label} is required")
}

/// Message for a value whose variant does not belong to the field's kind.
fn mismatch(label: &str) -> ValidationResult {
    ValidationResult::invalid(format!("{label} has a value of the wrong type"))
}

fn check_bounds<T>(label: &str, value: &T, min: Option<&T>, max: Option<&T>, errors: &mut Vec<String>)
where
    T: PartialOrd + fmt::Display,
{
    if let Some(min) = min.filter(|min| value < *min) {
        errors.push(format!("{label} must be greater than or equal to {min}"));
    }
    if let Some(max) = max.filter(|max| value > *max) {
        errors.push(format!("{label} must be less than or equal to {max}"));
    }
}

/// A compiled match rule. Rules whose regex does not compile are dropped
/// with a warning rather than failing every save.
#[derive(Debug, Clone)]
struct CompiledMatch {
    regex: Regex,
    explanation: Option<String>,
}

impl CompiledMatch {
    fn compile(path: &str, rule: Option<&MatchRule>) -> Option<Self> {
        let rule = rule?;
        match Regex::new(&rule.regex) {
            Ok(regex) => Some(Self {
                regex,
                explanation: rule.explanation.clone(),
            }),
            Err(err) => {
                tracing::warn!(path, regex = %rule.regex, error = %err, "ignoring invalid match rule");
                None
            }
        }
    }

    fn check(&self, label: &str, text: &str, errors: &mut Vec<String>) {
        if !self.regex.is_match(text) {
            errors.push(
                self.explanation
                    .clone()
                    .unwrap_or_else(|| format!("{label} must match {}", self.regex.as_str())),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
