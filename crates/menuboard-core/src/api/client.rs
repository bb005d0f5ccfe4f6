//! REST client for the hosted menu store.
//!
//! The store exposes each table as a resource under `{url}/rest/v1/` and
//! follows PostgREST conventions: `select`/`order` query parameters,
//! `column=eq.value` filters and `Prefer: return=representation` to get
//! inserted rows back.

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::StoreSettings;
use crate::models::{CategoryRow, ItemRow, RestaurantRow, RowId, SubCategoryRow};
use crate::store::{MenuStore, Table};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Path of the REST endpoint below the project URL
const REST_PATH: &str = "rest/v1";

/// Header carrying the project API key
const API_KEY_HEADER: &str = "apikey";

/// Ask the store to echo inserted rows so the new id can be read back
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: RowId,
}

/// Client for the menu store's REST API.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(settings: &StoreSettings) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&settings.api_key)
            .map_err(|_| ApiError::InvalidConfig("API key contains invalid characters".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", settings.api_key))
            .map_err(|_| ApiError::InvalidConfig("API key contains invalid characters".into()))?;
        headers.insert(API_KEY_HEADER, key);
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: rest_base_url(&settings.url),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}", self.base_url, table.path())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: Table,
        order: Option<&str>,
    ) -> Result<Vec<T>, ApiError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(order) = order {
            query.push(("order", order.to_string()));
        }

        debug!(table = %table, "Fetching rows");
        let response = self
            .client
            .get(self.table_url(table))
            .query(&query)
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        let values: Vec<Value> = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e)))?;

        // One malformed row is dropped rather than failing the whole table.
        let total = values.len();
        let rows: Vec<T> = values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!(table = %table, error = %e, "Skipping malformed row");
                    None
                }
            })
            .collect();
        debug!(table = %table, rows = rows.len(), skipped = total - rows.len(), "Fetched rows");
        Ok(rows)
    }
}

fn rest_base_url(url: &str) -> String {
    format!("{}/{}", url.trim_end_matches('/'), REST_PATH)
}

fn id_filter(id: &RowId) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl MenuStore for StoreClient {
    async fn fetch_restaurant(&self) -> Result<RestaurantRow, ApiError> {
        let rows: Vec<RestaurantRow> = self.select(Table::Restaurant, Some("id.asc")).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound("restaurant table has no rows".to_string()))
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryRow>, ApiError> {
        self.select(Table::Categories, Some("order_index.asc")).await
    }

    async fn fetch_sub_categories(&self) -> Result<Vec<SubCategoryRow>, ApiError> {
        self.select(Table::SubCategories, Some("order_index.asc")).await
    }

    async fn fetch_items(&self) -> Result<Vec<ItemRow>, ApiError> {
        self.select(Table::Items, Some("created_at.asc")).await
    }

    async fn insert(&self, table: Table, row: Value) -> Result<RowId, ApiError> {
        debug!(table = %table, "Inserting row");
        let response = self
            .client
            .post(self.table_url(table))
            .query(&[("select", "id")])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row)
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        let inserted: Vec<InsertedRow> = response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse inserted {} row: {}", table, e))
        })?;
        inserted
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| ApiError::InvalidResponse(format!("Insert into {} returned no rows", table)))
    }

    async fn update(&self, table: Table, id: &RowId, changes: Value) -> Result<(), ApiError> {
        debug!(table = %table, id = %id, "Updating row");
        let response = self
            .client
            .patch(self.table_url(table))
            .query(&id_filter(id))
            .json(&changes)
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete(&self, table: Table, id: &RowId) -> Result<(), ApiError> {
        debug!(table = %table, id = %id, "Deleting row");
        let response = self
            .client
            .delete(self.table_url(table))
            .query(&id_filter(id))
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> Result<(), ApiError> {
        debug!(table = %table, "Deleting all rows");
        // Bulk deletes need a filter; every real id matches this one.
        let response = self
            .client
            .delete(self.table_url(table))
            .query(&[("id", "neq.0")])
            .send()
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }
}
