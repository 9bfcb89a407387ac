//! Lenient parsing of filter input values.

use rust_decimal::Decimal;
use serde_json::Value;

/// Renders a scalar filter value as trimmed text.
///
/// Strings are trimmed, numbers and booleans are printed. Arrays, objects
/// and `null` have no scalar text.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Splits a list-shaped filter value into trimmed entries.
///
/// Accepts a JSON array, a string holding a JSON array (`"[1, 2]"`), or a
/// comma-separated string (`"1, 2"`). Empty entries are dropped.
pub(crate) fn list_items(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.starts_with('[') {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return list_items(&parsed);
                }
            }
            Some(
                trimmed
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(str::to_string)
                    .collect(),
            )
        }
        Value::Number(_) | Value::Bool(_) => scalar_text(value).map(|item| vec![item]),
        Value::Null | Value::Object(_) => None,
    }
}

/// Parses a whole number. Only surrounding whitespace is ignored; `"1 000"`
/// or `"1_000"` do not parse.
pub(crate) fn parse_i64(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub(crate) fn parse_f64(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// `Decimal::from_str` tolerates `_` separators, so they are refused here.
pub(crate) fn parse_decimal(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.contains('_') {
        return None;
    }
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn list_items_accepts_arrays_json_text_and_comma_lists() {
        let expected = Some(vec!["1".to_string(), "2".to_string()]);
        assert_eq!(list_items(&json!([1, 2])), expected);
        assert_eq!(list_items(&json!(" [1, 2] ")), expected);
        assert_eq!(list_items(&json!("1, 2")), expected);
        assert_eq!(list_items(&json!(" 1 ,, 2 ,")), expected);
    }

    #[test]
    fn list_items_falls_back_when_bracketed_text_is_not_json() {
        assert_eq!(
            list_items(&json!("[a, b")),
            Some(vec!["[a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn list_items_rejects_objects_and_nested_lists() {
        assert_eq!(list_items(&json!({ "a": 1 })), None);
        assert_eq!(list_items(&json!([[1]])), None);
        assert_eq!(list_items(&Value::Null), None);
    }

    #[test]
    fn numeric_parsers_trim_but_keep_interior_text() {
        assert_eq!(parse_i64(" 1000 "), Some(1000));
        assert_eq!(parse_i64("4.2"), None);
        assert_eq!(parse_f64(" 4.5 "), Some(4.5));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_decimal(" 12.50 "), Some(Decimal::new(1250, 2)));
    }

    #[test]
    fn interior_separators_do_not_parse() {
        for text in ["4 2", "1 000", "1_0"] {
            assert_eq!(parse_i64(text), None, "{text}");
            assert_eq!(parse_f64(text), None, "{text}");
            assert_eq!(parse_decimal(text), None, "{text}");
        }
    }

    proptest! {
        #[test]
        fn comma_lists_round_trip(items in prop::collection::vec(-1000i64..1000, 1..10)) {
            let text = items.iter().map(ToString::to_string).collect::<Vec<_>>().join(" , ");
            let parsed = list_items(&Value::String(text)).unwrap();
            let numbers: Vec<i64> = parsed.iter().map(|s| parse_i64(s).unwrap()).collect();
            prop_assert_eq!(numbers, items);
        }
    }
}
