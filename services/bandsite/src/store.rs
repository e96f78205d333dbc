//! Thin client for the hosted REST table store
//!
//! Speaks the PostgREST dialect: filters and ordering are query parameters,
//! mutations ask for the affected rows back with `Prefer: return=representation`.

use std::sync::Arc;

use reqwest::Url;
use serde_json::Value;

use crate::io::{HttpClient, HttpResponse};
use crate::{Result, SiteError};

const RETURN_REPRESENTATION: &str = "return=representation";
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=representation";

/// Ordering clause for a select
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
    pub nulls_last: bool,
}

impl Order {
    fn render(&self) -> String {
        let mut clause = format!(
            "{}.{}",
            self.column,
            if self.ascending { "asc" } else { "desc" }
        );
        if self.nulls_last {
            clause.push_str(".nullslast");
        }
        clause
    }
}

/// Filter, order and limit for a select
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, String)>,
    orders: Vec<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.orders.push(Order {
            column: column.to_string(),
            ascending,
            nulls_last: false,
        });
        self
    }

    pub fn order_nulls_last(mut self, column: &str, ascending: bool) -> Self {
        self.orders.push(Order {
            column: column.to_string(),
            ascending,
            nulls_last: true,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query parameters in the order they are sent
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), "*".to_string())];
        params.extend(self.filters.iter().cloned());
        if !self.orders.is_empty() {
            let order = self
                .orders
                .iter()
                .map(Order::render)
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// REST table store client
///
/// Cloning is cheap; clones share the HTTP client.
#[derive(Clone)]
pub struct TableStore {
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.access_token.is_some())
            .finish()
    }
}

impl TableStore {
    pub fn new(base_url: &str, api_key: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            access_token: None,
            http,
        }
    }

    /// A store whose requests run as the given signed-in user
    pub fn with_access_token(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    fn table_url(&self, table: &str, params: &[(String, String)]) -> Result<String> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, table))
            .map_err(|e| SiteError::Config(format!("Invalid table store URL: {}", e)))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url.to_string())
    }

    fn bearer(&self) -> String {
        format!(
            "Bearer {}",
            self.access_token.as_deref().unwrap_or(&self.api_key)
        )
    }

    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>> {
        let url = self.table_url(table, &query.params())?;
        let bearer = self.bearer();
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
        ];
        let response = self.http.get(&url, &headers).await?;
        rows(check(response)?)
    }

    /// Select at most one row; extra rows are ignored
    pub async fn select_one(&self, table: &str, query: &Query) -> Result<Option<Value>> {
        let query = query.clone().limit(1);
        Ok(self.select(table, &query).await?.into_iter().next())
    }

    pub async fn insert(&self, table: &str, row: &Value) -> Result<Option<Value>> {
        let url = self.table_url(table, &[])?;
        let bearer = self.bearer();
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
            ("Prefer", RETURN_REPRESENTATION),
        ];
        let response = self.http.post_json(&url, &headers, row).await?;
        Ok(rows(check(response)?)?.into_iter().next())
    }

    pub async fn update(&self, table: &str, id: i64, row: &Value) -> Result<Option<Value>> {
        let params = Query::new().eq("id", id).filters;
        let url = self.table_url(table, &params)?;
        let bearer = self.bearer();
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
            ("Prefer", RETURN_REPRESENTATION),
        ];
        let response = self.http.patch_json(&url, &headers, row).await?;
        Ok(rows(check(response)?)?.into_iter().next())
    }

    /// Insert or replace a row keyed on `id`
    pub async fn upsert(&self, table: &str, row: &Value) -> Result<Option<Value>> {
        let params = [("on_conflict".to_string(), "id".to_string())];
        let url = self.table_url(table, &params)?;
        let bearer = self.bearer();
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
            ("Prefer", UPSERT_PREFERENCE),
        ];
        let response = self.http.post_json(&url, &headers, row).await?;
        Ok(rows(check(response)?)?.into_iter().next())
    }

    pub async fn delete(&self, table: &str, id: i64) -> Result<()> {
        let params = Query::new().eq("id", id).filters;
        let url = self.table_url(table, &params)?;
        let bearer = self.bearer();
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("Authorization", bearer.as_str()),
        ];
        let response = self.http.delete(&url, &headers).await?;
        check(response)?;
        Ok(())
    }
}

/// Turn a non-2xx response into a backend error carrying its message
pub fn check(response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }
    Err(SiteError::Backend {
        status: response.status,
        message: error_message(&response.body),
    })
}

/// Extract the human-readable message from an error body
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|json| {
            ["message", "error_description", "msg", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| "Backend request failed".to_string())
}

fn rows(response: HttpResponse) -> Result<Vec<Value>> {
    if response.body.trim().is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(&response.body)? {
        Value::Array(rows) => Ok(rows),
        Value::Null => Ok(Vec::new()),
        row @ Value::Object(_) => Ok(vec![row]),
        other => Err(SiteError::Http(format!(
            "Unexpected table store response: {}",
            other
        ))),
    }
}
