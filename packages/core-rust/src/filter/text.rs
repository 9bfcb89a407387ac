//! Case-insensitive text operators.

use serde_json::Value;

use super::{object, Operator, OperatorInput};

pub(crate) const OPERATORS: &[Operator] = &[
    Operator::new("contains_i", "Contains", OperatorInput::Text),
    Operator::new("not_contains_i", "Does not contain", OperatorInput::Text),
    Operator::new("is_i", "Is exactly", OperatorInput::Text),
    Operator::new("not_i", "Is not exactly", OperatorInput::Text),
    Operator::new("starts_with_i", "Starts with", OperatorInput::Text),
    Operator::new("not_starts_with_i", "Does not start with", OperatorInput::Text),
    Operator::new("ends_with_i", "Ends with", OperatorInput::Text),
    Operator::new("not_ends_with_i", "Does not end with", OperatorInput::Text),
];

/// Text filters compare the value as typed; numbers are accepted as text.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn condition(tag: &str, value: &Value) -> Option<Value> {
    let (negated, key) = match tag {
        "contains_i" => (false, "contains"),
        "not_contains_i" => (true, "contains"),
        "is_i" => (false, "equals"),
        "not_i" => (true, "equals"),
        "starts_with_i" => (false, "startsWith"),
        "not_starts_with_i" => (true, "startsWith"),
        "ends_with_i" => (false, "endsWith"),
        "not_ends_with_i" => (true, "endsWith"),
        _ => return None,
    };
    let text = Value::String(text_of(value)?);
    let mode = Value::String("insensitive".to_string());
    Some(if negated {
        object([("not", object([(key, text)])), ("mode", mode)])
    } else {
        object([(key, text), ("mode", mode)])
    })
}

pub(crate) fn label(op: &Operator, value: &Value) -> String {
    format!(
        "{} \"{}\"",
        op.label.to_lowercase(),
        text_of(value).unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn positive_operators_map_to_camel_case_keys() {
        assert_eq!(
            condition("starts_with_i", &json!("Ru")),
            Some(json!({ "startsWith": "Ru", "mode": "insensitive" }))
        );
        assert_eq!(
            condition("is_i", &json!("rust")),
            Some(json!({ "equals": "rust", "mode": "insensitive" }))
        );
    }

    #[test]
    fn negated_operators_keep_mode_beside_not() {
        assert_eq!(
            condition("not_contains_i", &json!("x")),
            Some(json!({ "not": { "contains": "x" }, "mode": "insensitive" }))
        );
        assert_eq!(
            condition("not_ends_with_i", &json!("rs")),
            Some(json!({ "not": { "endsWith": "rs" }, "mode": "insensitive" }))
        );
    }

    #[test]
    fn non_scalar_values_are_rejected() {
        assert_eq!(condition("contains_i", &json!(["x"])), None);
        assert_eq!(condition("contains_i", &Value::Null), None);
    }

    #[test]
    fn label_quotes_the_value() {
        assert_eq!(label(&OPERATORS[0], &json!("vim")), "contains \"vim\"");
    }
}
