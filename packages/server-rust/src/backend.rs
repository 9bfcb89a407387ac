//! [`ItemBackend`] over a GraphQL endpoint.
//!
//! Items are addressed with the conventional list API shape:
//!
//! ```graphql
//! query ($id: ID!) { item: tool(where: { id: $id }) { id name } }
//! mutation ($id: ID!, $data: ToolUpdateInput!) {
//!   item: updateTool(where: { id: $id }, data: $data) { id name }
//! }
//! ```
//!
//! The root field is aliased to `item`, so error paths arrive as
//! `["item", "<field>", ...]` and are made relative to the item before they
//! reach the form engine.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use fieldkit_core::{FieldError, ItemBackend, ItemResponse, PathSegment, Payload, Selection};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

const ITEM_ALIAS: &str = "item";

#[derive(Debug, Serialize)]
struct GraphqlRequest {
    query: String,
    variables: Value,
}

#[derive(Debug, Default, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// GraphQL client for item fetch, create and update.
#[derive(Debug, Clone)]
pub struct GraphqlBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlBackend {
    /// Creates a client for `endpoint` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn execute(&self, request: GraphqlRequest) -> anyhow::Result<ItemResponse> {
        debug!(endpoint = %self.endpoint, query = %request.query, "graphql request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?
            .error_for_status()?;
        let body: GraphqlResponse = response
            .json()
            .await
            .context("graphql response is not valid JSON")?;
        Ok(into_item_response(body))
    }
}

#[async_trait]
impl ItemBackend for GraphqlBackend {
    async fn fetch_item(
        &self,
        list: &str,
        id: &str,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse> {
        self.execute(GraphqlRequest {
            query: item_query(list, selections),
            variables: json!({ "id": id }),
        })
        .await
    }

    async fn create_item(
        &self,
        list: &str,
        payload: &Payload,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse> {
        self.execute(GraphqlRequest {
            query: create_mutation(list, selections),
            variables: json!({ "data": payload }),
        })
        .await
    }

    async fn update_item(
        &self,
        list: &str,
        id: &str,
        payload: &Payload,
        selections: &[Selection],
    ) -> anyhow::Result<ItemResponse> {
        self.execute(GraphqlRequest {
            query: update_mutation(list, selections),
            variables: json!({ "id": id, "data": payload }),
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// Document builders
// ---------------------------------------------------------------------------

fn lower_first(list: &str) -> String {
    let mut chars = list.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `id` plus each field's selection. `id` is always requested so the item
/// stays addressable after a save.
fn selection_set(selections: &[Selection]) -> String {
    let mut parts = vec!["id".to_string()];
    parts.extend(
        selections
            .iter()
            .filter(|s| s.path() != "id")
            .map(ToString::to_string),
    );
    parts.join(" ")
}

pub(crate) fn item_query(list: &str, selections: &[Selection]) -> String {
    format!(
        "query ($id: ID!) {{ {ITEM_ALIAS}: {}(where: {{ id: $id }}) {{ {} }} }}",
        lower_first(list),
        selection_set(selections)
    )
}

pub(crate) fn update_mutation(list: &str, selections: &[Selection]) -> String {
    format!(
        "mutation ($id: ID!, $data: {list}UpdateInput!) {{ {ITEM_ALIAS}: update{list}(where: {{ id: $id }}, data: $data) {{ {} }} }}",
        selection_set(selections)
    )
}

pub(crate) fn create_mutation(list: &str, selections: &[Selection]) -> String {
    format!(
        "mutation ($data: {list}CreateInput!) {{ {ITEM_ALIAS}: create{list}(data: $data) {{ {} }} }}",
        selection_set(selections)
    )
}

/// Unwraps the aliased item and rebases error paths onto it. Errors outside
/// the item, or on the item as a whole, become request-level errors.
fn into_item_response(body: GraphqlResponse) -> ItemResponse {
    let data = body
        .data
        .and_then(|mut data| data.get_mut(ITEM_ALIAS).map(Value::take))
        .filter(|item| !item.is_null());
    let errors = body
        .errors
        .into_iter()
        .map(|error| {
            let path = match error.path.split_first() {
                Some((PathSegment::Key(root), rest)) if root == ITEM_ALIAS => rest.to_vec(),
                _ => Vec::new(),
            };
            FieldError::new(error.message, path)
        })
        .collect();
    ItemResponse { data, errors }
}
