//! Operators shared by integer, bigint, decimal and float fields.
//!
//! The kinds differ only in how a parsed value is encoded into the
//! predicate: integers and floats as JSON numbers, bigints and decimals as
//! strings so no precision is lost in transit.

use serde_json::{Number, Value};

use super::parse::{list_items, parse_decimal, parse_f64, parse_i64, scalar_text};
use super::{object, Operator, OperatorInput};

pub(crate) const OPERATORS: &[Operator] = &[
    Operator::new("equals", "Is exactly", OperatorInput::Text),
    Operator::new("not", "Is not exactly", OperatorInput::Text),
    Operator::new("gt", "Is greater than", OperatorInput::Text),
    Operator::new("lt", "Is less than", OperatorInput::Text),
    Operator::new("gte", "Is greater than or equal to", OperatorInput::Text),
    Operator::new("lte", "Is less than or equal to", OperatorInput::Text),
    Operator::new("in", "Is one of", OperatorInput::Text),
    Operator::new("not_in", "Is not one of", OperatorInput::Text),
    Operator::new("empty", "Is empty", OperatorInput::None),
    Operator::new("not_empty", "Is not empty", OperatorInput::None),
];

/// How a numeric kind encodes values in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericEncoding {
    Integer,
    BigInt,
    Decimal,
    Float,
}

impl NumericEncoding {
    /// Parses `text` and encodes it for the backend, or `None` if it is not
    /// a valid value of this kind.
    #[must_use]
    pub fn encode(self, text: &str) -> Option<Value> {
        match self {
            Self::Integer => parse_i64(text).map(Value::from),
            Self::BigInt => parse_i64(text).map(|n| Value::String(n.to_string())),
            Self::Decimal => parse_decimal(text).map(|d| Value::String(d.to_string())),
            Self::Float => parse_f64(text).and_then(Number::from_f64).map(Value::Number),
        }
    }
}

pub(crate) fn condition(encoding: NumericEncoding, tag: &str, value: &Value) -> Option<Value> {
    match tag {
        "empty" => Some(object([("equals", Value::Null)])),
        "not_empty" => Some(object([("not", object([("equals", Value::Null)]))])),
        "in" | "not_in" => {
            let encoded = list_items(value)?
                .iter()
                .map(|item| encoding.encode(item))
                .collect::<Option<Vec<_>>>()?;
            let key = if tag == "in" { "in" } else { "notIn" };
            Some(object([(key, Value::Array(encoded))]))
        }
        "equals" | "gt" | "lt" | "gte" | "lte" => {
            let encoded = encoding.encode(&scalar_text(value)?)?;
            Some(object([(tag, encoded)]))
        }
        "not" => {
            let encoded = encoding.encode(&scalar_text(value)?)?;
            Some(object([("not", object([("equals", encoded)]))]))
        }
        _ => None,
    }
}

pub(crate) fn label(op: &Operator, value: &Value) -> String {
    let operator = op.label.to_lowercase();
    match op.tag {
        "empty" | "not_empty" => operator,
        "in" | "not_in" => {
            let items = list_items(value).unwrap_or_default();
            format!("{operator} [{}]", items.join(", "))
        }
        _ => format!("{operator} {}", scalar_text(value).unwrap_or_default()),
    }
}
