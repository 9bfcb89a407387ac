//! Presence operators for password fields.

use serde_json::Value;

use super::{object, Operator, OperatorInput};

pub(crate) const OPERATORS: &[Operator] = &[
    Operator::new("is_set", "Is set", OperatorInput::None),
    Operator::new("not_set", "Is not set", OperatorInput::None),
];

pub(crate) fn condition(tag: &str) -> Option<Value> {
    let is_set = match tag {
        "is_set" => true,
        "not_set" => false,
        _ => return None,
    };
    Some(object([("isSet", Value::Bool(is_set))]))
}

pub(crate) fn label(op: &Operator) -> String {
    op.label.to_lowercase()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn presence_predicates() {
        assert_eq!(condition("is_set"), Some(json!({ "isSet": true })));
        assert_eq!(condition("not_set"), Some(json!({ "isSet": false })));
        assert_eq!(condition("equals"), None);
    }

    #[test]
    fn labels_are_lowercase_operator_labels() {
        assert_eq!(label(&OPERATORS[0]), "is set");
        assert_eq!(label(&OPERATORS[1]), "is not set");
    }
}
