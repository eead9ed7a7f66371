// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! PostgREST-compatible store.
//!
//! Talks to the `/rest/v1/{table}` surface exposed by Supabase. Filters are
//! encoded as `column=op.value` query parameters; counts use
//! `Prefer: count=exact` and read the total from `Content-Range`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::store::{FilterOp, Query, Row, Store, tables};

// =============================================================================
// RestStoreConfig
// =============================================================================

/// Connection settings for [`RestStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestStoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Service-role key sent as `apikey` and bearer token.
    #[serde(skip_serializing)]
    pub service_key: String,
    /// Postgres schema.
    pub schema: String,
    /// Per-request timeout.
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl RestStoreConfig {
    /// Creates a configuration with the default schema and timeout.
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            schema: "public".to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

// =============================================================================
// RestStore
// =============================================================================

/// [`Store`] backed by a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
}

impl RestStore {
    /// Creates a new store.
    pub fn new(config: RestStoreConfig) -> StoreResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::invalid_query("REST store base URL is empty"));
        }

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .map_err(|_| StoreError::invalid_query("service key is not a valid header value"))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|_| StoreError::invalid_query("service key is not a valid header value"))?;
        let schema = HeaderValue::from_str(&config.schema)
            .map_err(|_| StoreError::invalid_query("schema is not a valid header value"))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("Accept-Profile", schema.clone());
        headers.insert("Content-Profile", schema);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client.request(method, self.table_url(table))
    }

    async fn rows(table: &str, response: Response) -> StoreResult<Vec<Row>> {
        let response = check_status(table, response).await?;
        let body: Value = response.json().await?;
        match body {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(row) => Ok(row),
                    _ => Err(StoreError::decode(table, "expected an object row")),
                })
                .collect(),
            Value::Object(row) => Ok(vec![row]),
            _ => Err(StoreError::decode(table, "expected a JSON array")),
        }
    }
}

/// Encodes a query as PostgREST parameters.
pub fn query_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for filter in &query.filters {
        let encoded = match (&filter.value, filter.op) {
            (Value::Null, FilterOp::Eq) => "is.null".to_string(),
            (Value::Null, FilterOp::Neq) => "not.is.null".to_string(),
            (value, op) => format!("{}.{}", op.as_str(), scalar_to_string(value)),
        };
        params.push((filter.column.clone(), encoded));
    }

    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    if let Some(offset) = query.offset {
        params.push(("offset".to_string(), offset.to_string()));
    }

    params
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn check_status(table: &str, response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    warn!(table, status = status.as_u16(), "REST store request failed");

    if status == StatusCode::CONFLICT {
        return Err(StoreError::conflict(table, message));
    }
    Err(StoreError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Reads the total from a `Content-Range` header such as `0-24/312` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl Store for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn select(&self, query: &Query) -> StoreResult<Vec<Row>> {
        debug!(table = %query.table, filters = query.filters.len(), "rest select");
        let response = self
            .request(Method::GET, &query.table)
            .query(&query_params(query))
            .send()
            .await?;
        Self::rows(&query.table, response).await
    }

    async fn count(&self, query: &Query) -> StoreResult<u64> {
        let mut unpaged = query.clone();
        unpaged.limit = None;
        unpaged.offset = None;
        unpaged.order = None;

        let response = self
            .request(Method::HEAD, &query.table)
            .query(&query_params(&unpaged))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check_status(&query.table, response).await?;

        response
            .headers()
            .get("Content-Range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::decode(query.table.clone(), "missing Content-Range total"))
    }

    async fn insert(&self, table: &str, row: Row) -> StoreResult<Row> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        Self::rows(table, response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::decode(table, "insert returned no representation"))
    }

    async fn update(&self, table: &str, id: &str, patch: Row) -> StoreResult<Option<Row>> {
        let response = self
            .request(Method::PATCH, table)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await?;

        Ok(Self::rows(table, response).await?.into_iter().next())
    }

    async fn ping(&self) -> StoreResult<()> {
        let query = Query::table(tables::USERS).limit(1);
        self.select(&query).await.map(|_| ())
    }
}
