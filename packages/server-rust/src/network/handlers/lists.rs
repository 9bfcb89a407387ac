//! List endpoints: filter translation, filter catalog and item preview.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use fieldkit_core::{FieldSet, FilterController, FormEngine, ListSchema};
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

use super::AppState;
use crate::error::ApiError;
use crate::filters::{build_list_query, parse_filter_param, ListQuery};

type Params = Query<Vec<(String, String)>>;

async fn schema_for(state: &AppState, list: &str) -> Result<Arc<ListSchema>, ApiError> {
    state
        .schemas
        .get_schema(list)
        .await
        .ok_or_else(|| ApiError::UnknownList(list.to_string()))
}

/// `GET /api/lists/{list}/where`: translates URL filter, search and sort
/// parameters into a `where` predicate and `orderBy` list.
///
/// # Errors
///
/// [`ApiError::UnknownList`] when no schema is registered for `list`.
pub async fn where_handler(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Query(params): Params,
) -> Result<Json<ListQuery>, ApiError> {
    let schema = schema_for(&state, &list).await?;
    let query = build_list_query(&schema, &params);
    debug!(list, params = params.len(), "translated list query");
    Ok(Json(query))
}

/// `GET /api/lists/{list}/filters`: the operator catalog of every
/// filterable field, plus labels for any filters active in the query.
///
/// # Errors
///
/// [`ApiError::UnknownList`] when no schema is registered for `list`.
pub async fn filters_handler(
    State(state): State<AppState>,
    Path(list): Path<String>,
    Query(params): Params,
) -> Result<Json<Value>, ApiError> {
    let schema = schema_for(&state, &list).await?;

    let fields: Vec<Value> = schema
        .fields
        .iter()
        .filter_map(|field| {
            let filter = FilterController::for_descriptor(field)?;
            let operators: Vec<Value> = filter
                .operators()
                .iter()
                .map(|op| {
                    json!({
                        "tag": op.tag,
                        "label": op.label,
                        "input": op.input,
                        "initialValue": op.initial_value(),
                    })
                })
                .collect();
            Some(json!({
                "path": field.path,
                "label": field.label,
                "kind": field.kind().as_str(),
                "operators": operators,
            }))
        })
        .collect();

    let active: Vec<Value> = params
        .iter()
        .filter_map(|(key, raw)| {
            let spec = parse_filter_param(&schema, key, raw)?;
            let label = FilterController::for_descriptor(schema.field(&spec.path)?)?
                .to_label(&spec.operator, &spec.value)?;
            Some(json!({
                "path": spec.path,
                "operator": spec.operator,
                "label": label,
            }))
        })
        .collect();

    Ok(Json(json!({
        "list": schema.key,
        "fields": fields,
        "active": active,
    })))
}

/// `GET /api/lists/{list}/items/{id}`: loads an item through the backend
/// and reports its editable values plus the fields that fail validation.
///
/// # Errors
///
/// [`ApiError::UnknownList`] for an unregistered list,
/// [`ApiError::BackendUnavailable`] when no backend is configured, and
/// [`ApiError::Form`] when the backend fails or rejects the fetch.
pub async fn item_handler(
    State(state): State<AppState>,
    Path((list, id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let schema = schema_for(&state, &list).await?;
    let backend = state.backend.as_ref().ok_or(ApiError::BackendUnavailable)?;
    let fields = Arc::new(FieldSet::from_schema(&schema));

    let engine = FormEngine::load(backend.as_ref(), list.as_str(), fields, &id)
        .instrument(info_span!("load_item", list = %list, id = %id))
        .await?;

    Ok(Json(json!({
        "id": engine.item_id(),
        "values": engine.values(),
        "invalid": engine.invalid_fields(),
    })))
}
