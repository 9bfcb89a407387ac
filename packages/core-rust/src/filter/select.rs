//! Option-membership operators for select fields.

use serde_json::Value;

use super::parse::{list_items, parse_i64, scalar_text};
use super::{object, Operator, OperatorInput};
use crate::schema::SelectValueKind;
use crate::value::SelectOption;

pub(crate) const OPERATORS: &[Operator] = &[
    Operator::new("matches", "Matches", OperatorInput::List),
    Operator::new("not_matches", "Does not match", OperatorInput::List),
];

/// Extracts option values from `[{label, value}]`, `["a", "b"]` or `"a,b"`.
fn option_values(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(option) => option.get("value").and_then(scalar_text),
                other => scalar_text(other),
            })
            .collect(),
        other => list_items(other),
    }
}

pub(crate) fn condition(kind: SelectValueKind, tag: &str, value: &Value) -> Option<Value> {
    let key = match tag {
        "matches" => "in",
        "not_matches" => "notIn",
        _ => return None,
    };
    let values = option_values(value)?;
    let encoded = match kind {
        SelectValueKind::Integer => values
            .iter()
            .map(|v| parse_i64(v).map(Value::from))
            .collect::<Option<Vec<_>>>()?,
        SelectValueKind::String | SelectValueKind::Enum => {
            values.into_iter().map(Value::String).collect()
        }
    };
    Some(object([(key, Value::Array(encoded))]))
}

pub(crate) fn label(options: &[SelectOption], op: &Operator, value: &Value) -> String {
    let negated = op.tag == "not_matches";
    let labels: Vec<String> = option_values(value)
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            options
                .iter()
                .find(|option| option.value == v)
                .map_or(v, |option| option.label.clone())
        })
        .collect();
    match labels.as_slice() {
        [] if negated => "is set".to_string(),
        [] => "has no value".to_string(),
        [single] if negated => format!("is not {single}"),
        [single] => format!("is {single}"),
        many if negated => format!("is not in [{}]", many.join(", ")),
        many => format!("is in [{}]", many.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("Red", "red"),
            SelectOption::new("Green", "green"),
        ]
    }

    #[test]
    fn matches_accepts_option_objects_and_strings() {
        let expected = Some(json!({ "in": ["red", "green"] }));
        let objects = json!([{ "label": "Red", "value": "red" }, { "label": "Green", "value": "green" }]);
        assert_eq!(condition(SelectValueKind::String, "matches", &objects), expected);
        assert_eq!(
            condition(SelectValueKind::String, "matches", &json!(["red", "green"])),
            expected
        );
        assert_eq!(
            condition(SelectValueKind::Enum, "matches", &json!("red, green")),
            expected
        );
    }

    #[test]
    fn integer_selects_convert_values() {
        assert_eq!(
            condition(SelectValueKind::Integer, "not_matches", &json!(["1", "2"])),
            Some(json!({ "notIn": [1, 2] }))
        );
        assert_eq!(condition(SelectValueKind::Integer, "matches", &json!(["x"])), None);
    }

    #[test]
    fn labels_use_option_labels() {
        let matches = &OPERATORS[0];
        let not_matches = &OPERATORS[1];
        assert_eq!(label(&options(), matches, &json!(["red"])), "is Red");
        assert_eq!(label(&options(), not_matches, &json!(["red"])), "is not Red");
        assert_eq!(
            label(&options(), matches, &json!(["red", "green"])),
            "is in [Red, Green]"
        );
        assert_eq!(label(&options(), matches, &json!([])), "has no value");
        assert_eq!(label(&options(), matches, &json!(["blue"])), "is blue");
    }
}
