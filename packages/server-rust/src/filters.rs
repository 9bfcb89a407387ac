//! Query parameter -> predicate translation.
//!
//! List pages encode filters in the URL as `!{path}_{operator}=<json>`, e.g.
//! `!stars_gt=18` or `!license_matches=["mit"]`. This module turns those
//! parameters into the same predicates the interactive filter controller
//! builds, using the shared operator tables in [`fieldkit_core::filter`].
//!
//! Filtering is best effort: a parameter naming an unknown field or
//! operator, or carrying a value that does not parse, is dropped (logged at
//! debug) rather than failing the request.

use fieldkit_core::{FieldDescriptor, FieldKind, FilterController, FilterSpec, ListSchema, QueryPredicate};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Free-text search over the list's search fields.
pub const SEARCH_PARAM: &str = "search";
/// Sort field; a leading `-` sorts descending.
pub const SORT_PARAM: &str = "sortBy";

/// A translated list query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Always a conjunction, possibly empty.
    #[serde(rename = "where")]
    pub where_clause: QueryPredicate,
    pub order_by: Vec<Value>,
}

/// Builds the predicate for one field, operator and value.
#[must_use]
pub fn transform_filter(
    descriptor: &FieldDescriptor,
    operator: &str,
    value: &Value,
) -> Option<QueryPredicate> {
    FilterController::for_descriptor(descriptor)?.to_predicate(operator, value)
}

/// Like [`transform_filter`], for a JSON-encoded parameter value.
#[must_use]
pub fn transform_raw_filter(
    descriptor: &FieldDescriptor,
    operator: &str,
    raw: &str,
) -> Option<QueryPredicate> {
    let value: Value = serde_json::from_str(raw).ok()?;
    transform_filter(descriptor, operator, &value)
}

/// Splits a `!{path}_{operator}` key against the list's fields.
///
/// Paths and operators may both contain underscores, so every field whose
/// path prefixes the key is tried and the longest path naming a known
/// operator wins.
#[must_use]
pub fn parse_filter_key<'s>(
    schema: &'s ListSchema,
    key: &str,
) -> Option<(&'s FieldDescriptor, String)> {
    let rest = key.strip_prefix('!')?;
    schema
        .fields
        .iter()
        .filter_map(|field| {
            let operator = rest.strip_prefix(field.path.as_str())?.strip_prefix('_')?;
            let filter = FilterController::for_descriptor(field)?;
            filter.operator(operator)?;
            Some((field, operator.to_string()))
        })
        .max_by_key(|(field, _)| field.path.len())
}

/// Parses one query parameter into a filter spec.
#[must_use]
pub fn parse_filter_param(schema: &ListSchema, key: &str, raw: &str) -> Option<FilterSpec> {
    let (field, operator) = parse_filter_key(schema, key)?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(FilterSpec::new(field.path.as_str(), operator, value)),
        Err(err) => {
            debug!(key, raw, error = %err, "dropping filter with malformed JSON value");
            None
        }
    }
}

/// Builds `{"AND": [...]}` from the filter and search parameters.
pub fn build_where_clause<K, V>(
    schema: &ListSchema,
    params: impl IntoIterator<Item = (K, V)>,
) -> QueryPredicate
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut predicates = Vec::new();
    for (key, raw) in params {
        let (key, raw) = (key.as_ref(), raw.as_ref());
        if key == SEARCH_PARAM {
            predicates.extend(search_clause(schema, raw));
            continue;
        }
        if !key.starts_with('!') {
            continue;
        }
        let predicate = parse_filter_param(schema, key, raw).and_then(|spec| {
            let field = schema.field(&spec.path)?;
            FilterController::for_descriptor(field)?.predicate_for(&spec)
        });
        match predicate {
            Some(predicate) => predicates.push(predicate),
            None => debug!(key, raw, "dropping unusable filter parameter"),
        }
    }
    QueryPredicate::and(predicates)
}

/// `{"OR": [{field: {contains, mode: insensitive}}, ...]}` over the search
/// fields, or `None` for a blank term.
#[must_use]
pub fn search_clause(schema: &ListSchema, term: &str) -> Option<QueryPredicate> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let value = Value::String(term.to_string());
    let alternatives: Vec<QueryPredicate> = schema
        .search_fields
        .iter()
        .filter_map(|path| schema.field(path))
        .filter(|field| field.kind() == FieldKind::Text)
        .filter_map(|field| transform_filter(field, "contains_i", &value))
        .collect();
    if alternatives.is_empty() {
        None
    } else {
        Some(QueryPredicate::or(alternatives))
    }
}

/// Builds `orderBy` from the sort parameter. Unknown fields are ignored.
pub fn build_order_by<K, V>(schema: &ListSchema, params: impl IntoIterator<Item = (K, V)>) -> Vec<Value>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    params
        .into_iter()
        .filter(|(key, _)| key.as_ref() == SORT_PARAM)
        .filter_map(|(_, raw)| {
            let raw = raw.as_ref().trim();
            let (path, direction) = match raw.strip_prefix('-') {
                Some(path) => (path, "desc"),
                None => (raw, "asc"),
            };
            if schema.field(path).is_none() {
                debug!(sort = raw, "ignoring sort on unknown field");
                return None;
            }
            let mut order = Map::new();
            order.insert(path.to_string(), Value::String(direction.to_string()));
            Some(Value::Object(order))
        })
        .collect()
}

/// Translates a full parameter list.
#[must_use]
pub fn build_list_query(schema: &ListSchema, params: &[(String, String)]) -> ListQuery {
    ListQuery {
        where_clause: build_where_clause(schema, params.iter().map(|(k, v)| (k, v))),
        order_by: build_order_by(schema, params.iter().map(|(k, v)| (k, v))),
    }
}

#[cfg(test)]
mod tests {
    use fieldkit_core::FieldConfig;
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::schema::tests::TOOLS;
    use crate::schema::SchemaRegistry;

    fn tools() -> std::sync::Arc<ListSchema> {
        SchemaRegistry::from_json(TOOLS).unwrap().get("Tool").unwrap()
    }

    #[test]
    fn client_and_server_build_the_same_predicate() {
        let schema = tools();
        let stars = schema.field("stars").unwrap();
        let client = stars.controller().filter().unwrap().to_predicate("gt", &json!("18"));
        let server = transform_raw_filter(stars, "gt", "18");
        assert_eq!(client, server);
        assert_eq!(server.map(Value::from), Some(json!({ "stars": { "gt": 18 } })));
    }

    #[test]
    fn keys_split_on_known_operators() {
        let schema = tools();
        let (field, operator) = parse_filter_key(&schema, "!name_not_contains_i").unwrap();
        assert_eq!((field.path.as_str(), operator.as_str()), ("name", "not_contains_i"));
        assert!(parse_filter_key(&schema, "!name_bogus").is_none());
        assert!(parse_filter_key(&schema, "name_contains_i").is_none());
        assert!(parse_filter_key(&schema, "!logo_equals").is_none());
    }

    #[test]
    fn unparsable_parameters_are_dropped() {
        let schema = tools();
        let params = [
            ("!stars_gte", "3"),
            ("!license_matches", r#"["mit"]"#),
            ("!stars_lt", "{not json"),
            ("!missing_equals", "1"),
            ("page", "2"),
        ];
        let clause = build_where_clause(&schema, params);
        assert_eq!(
            Value::from(clause),
            json!({ "AND": [
                { "stars": { "gte": 3 } },
                { "license": { "in": ["mit"] } }
            ] })
        );
    }

    #[test]
    fn malformed_values_are_dropped() {
        let schema = tools();
        let clause = build_where_clause(&schema, [("!stars_in", r#""1, x""#), ("!views_equals", r#""12""#)]);
        assert_eq!(
            Value::from(clause),
            json!({ "AND": [{ "views": { "equals": "12" } }] })
        );
    }

    #[test]
    fn empty_params_yield_an_empty_conjunction() {
        let schema = tools();
        let clause = build_where_clause(&schema, std::iter::empty::<(&str, &str)>());
        assert_eq!(Value::from(clause), json!({ "AND": [] }));
    }

    #[test]
    fn search_covers_every_search_field() {
        let schema = tools();
        let clause = build_where_clause(&schema, [("search", " vim ")]);
        assert_eq!(
            Value::from(clause),
            json!({ "AND": [{ "OR": [
                { "name": { "contains": "vim", "mode": "insensitive" } },
                { "tagline": { "contains": "vim", "mode": "insensitive" } }
            ] }] })
        );
        assert!(search_clause(&schema, "  ").is_none());
    }

    #[test]
    fn sort_parameter_maps_to_order_by() {
        let schema = tools();
        let params = vec![
            ("sortBy".to_string(), "-stars".to_string()),
            ("sortBy".to_string(), "unknown".to_string()),
        ];
        let query = build_list_query(&schema, &params);
        assert_eq!(query.order_by, vec![json!({ "stars": "desc" })]);
        let rendered = serde_json::to_value(&query).unwrap();
        assert_eq!(rendered["where"], json!({ "AND": [] }));
        assert_eq!(rendered["orderBy"], json!([{ "stars": "desc" }]));
    }

    #[test]
    fn non_filterable_kinds_yield_nothing() {
        let metadata = FieldDescriptor::new("metadata", "Metadata", FieldConfig::Json(fieldkit_core::schema::JsonConfig::default()));
        assert!(transform_filter(&metadata, "equals", &json!(1)).is_none());
    }

    proptest! {
        #[test]
        fn integer_bounds_translate_exactly(n in any::<i64>()) {
            let schema = tools();
            let clause = build_where_clause(&schema, [("!stars_gt", n.to_string())]);
            prop_assert_eq!(Value::from(clause), json!({ "AND": [{ "stars": { "gt": n } }] }));
        }

        #[test]
        fn plain_parameters_never_filter(key in "[a-zA-Z_]{1,12}", raw in ".{0,16}") {
            prop_assume!(key != SEARCH_PARAM);
            let schema = tools();
            let clause = build_where_clause(&schema, [(key, raw)]);
            prop_assert_eq!(Value::from(clause), json!({ "AND": [] }));
        }
    }
}
