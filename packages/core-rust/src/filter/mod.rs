//! Filter catalog and query predicate construction.
//!
//! Every filterable field kind has one operator table. The table is the
//! single source for the operator catalog shown to users, the predicate
//! builder, and the label builder, and it is shared by the interactive
//! [`FilterController`] and the server-side query parameter translator.
//!
//! Predicates use the backend's structured `where` shape:
//!
//! ```text
//! { "age": { "gt": 18 } }
//! { "name": { "not": { "contains": "x" }, "mode": "insensitive" } }
//! { "AND": [ ... ] }
//! ```

mod numeric;
pub(crate) mod parse;
mod password;
mod select;
mod text;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{FieldConfig, FieldDescriptor, SelectValueKind};
use crate::value::SelectOption;

pub use numeric::NumericEncoding;

// ---------------------------------------------------------------------------
// QueryPredicate
// ---------------------------------------------------------------------------

/// A structured query fragment, combinable under `AND` / `OR`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryPredicate(Map<String, Value>);

impl QueryPredicate {
    /// `{path: condition}`.
    #[must_use]
    pub fn field(path: &str, condition: Value) -> Self {
        let mut map = Map::new();
        map.insert(path.to_string(), condition);
        Self(map)
    }

    /// `{"AND": [...]}`. An empty conjunction matches everything.
    #[must_use]
    pub fn and(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::combine("AND", predicates)
    }

    /// `{"OR": [...]}`.
    #[must_use]
    pub fn or(predicates: impl IntoIterator<Item = Self>) -> Self {
        Self::combine("OR", predicates)
    }

    fn combine(key: &str, predicates: impl IntoIterator<Item = Self>) -> Self {
        let items = predicates.into_iter().map(Value::from).collect();
        Self::field(key, Value::Array(items))
    }

    /// The operands of an `AND`, if this is a conjunction.
    #[must_use]
    pub fn conjuncts(&self) -> Option<&[Value]> {
        self.0.get("AND").and_then(Value::as_array).map(Vec::as_slice)
    }

    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<QueryPredicate> for Value {
    fn from(predicate: QueryPredicate) -> Self {
        Value::Object(predicate.0)
    }
}

pub(crate) fn object<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Shape of the value an operator takes from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorInput {
    /// Free text (numeric lists are typed as comma-separated text).
    Text,
    /// A list of chosen options.
    List,
    /// No value (`empty`, `is_set`, ...).
    None,
}

/// One entry of a kind's operator catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operator {
    pub tag: &'static str,
    pub label: &'static str,
    pub input: OperatorInput,
}

impl Operator {
    pub(crate) const fn new(tag: &'static str, label: &'static str, input: OperatorInput) -> Self {
        Self { tag, label, input }
    }

    /// Value the filter UI starts with when this operator is picked.
    #[must_use]
    pub fn initial_value(&self) -> Value {
        match self.input {
            OperatorInput::Text => Value::String(String::new()),
            OperatorInput::List => Value::Array(Vec::new()),
            OperatorInput::None => Value::Null,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterSpec
// ---------------------------------------------------------------------------

/// One user-chosen predicate request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub path: String,
    pub operator: String,
    pub value: Value,
}

impl FilterSpec {
    #[must_use]
    pub fn new(path: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            operator: operator.into(),
            value,
        }
    }
}

// ---------------------------------------------------------------------------
// FilterController
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum FilterFamily {
    Text,
    Numeric(NumericEncoding),
    Select {
        options: Vec<SelectOption>,
        value_kind: SelectValueKind,
    },
    Password,
}

/// Filter logic for one field: operator catalog, predicate builder and
/// label builder, all driven by the same table.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterController {
    path: String,
    family: FilterFamily,
}

impl FilterController {
    /// Builds the filter for a field, or `None` for kinds that cannot be
    /// filtered (json, image).
    #[must_use]
    pub fn for_descriptor(descriptor: &FieldDescriptor) -> Option<Self> {
        let family = match &descriptor.config {
            FieldConfig::Text(_) => FilterFamily::Text,
            FieldConfig::Integer(_) => FilterFamily::Numeric(NumericEncoding::Integer),
            FieldConfig::BigInt(_) => FilterFamily::Numeric(NumericEncoding::BigInt),
            FieldConfig::Decimal(_) => FilterFamily::Numeric(NumericEncoding::Decimal),
            FieldConfig::Float(_) => FilterFamily::Numeric(NumericEncoding::Float),
            FieldConfig::Select(config) => FilterFamily::Select {
                options: config.options.clone(),
                value_kind: config.value_kind,
            },
            FieldConfig::Password(_) => FilterFamily::Password,
            FieldConfig::Json(_) | FieldConfig::Image(_) => return None,
        };
        Some(Self {
            path: descriptor.path.clone(),
            family,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The operator catalog for this field's kind.
    #[must_use]
    pub fn operators(&self) -> &'static [Operator] {
        match &self.family {
            FilterFamily::Text => text::OPERATORS,
            FilterFamily::Numeric(_) => numeric::OPERATORS,
            FilterFamily::Select { .. } => select::OPERATORS,
            FilterFamily::Password => password::OPERATORS,
        }
    }

    #[must_use]
    pub fn operator(&self, tag: &str) -> Option<&'static Operator> {
        self.operators().iter().find(|op| op.tag == tag)
    }

    /// Builds the predicate for `operator` applied to `value`.
    ///
    /// Returns `None` for unknown operators or values that do not parse for
    /// this kind; callers treat that as "no filter".
    #[must_use]
    pub fn to_predicate(&self, operator: &str, value: &Value) -> Option<QueryPredicate> {
        let op = self.operator(operator)?;
        let condition = match &self.family {
            FilterFamily::Text => text::condition(op.tag, value),
            FilterFamily::Numeric(encoding) => numeric::condition(*encoding, op.tag, value),
            FilterFamily::Select { value_kind, .. } => {
                select::condition(*value_kind, op.tag, value)
            }
            FilterFamily::Password => password::condition(op.tag),
        }?;
        Some(QueryPredicate::field(&self.path, condition))
    }

    /// Human-readable description of `operator` applied to `value`,
    /// e.g. `is greater than 18`.
    #[must_use]
    pub fn to_label(&self, operator: &str, value: &Value) -> Option<String> {
        let op = self.operator(operator)?;
        Some(match &self.family {
            FilterFamily::Text => text::label(op, value),
            FilterFamily::Numeric(_) => numeric::label(op, value),
            FilterFamily::Select { options, .. } => select::label(options, op, value),
            FilterFamily::Password => password::label(op),
        })
    }

    /// Builds the predicate for a spec aimed at this field.
    #[must_use]
    pub fn predicate_for(&self, spec: &FilterSpec) -> Option<QueryPredicate> {
        if spec.path != self.path {
            return None;
        }
        self.to_predicate(&spec.operator, &spec.value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
