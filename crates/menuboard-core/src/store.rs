//! The seam between the menu service and the hosted data store.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::ApiError;
use crate::models::{CategoryRow, ItemRow, RestaurantRow, RowId, SubCategoryRow};

/// The four collections the store exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Restaurant,
    Categories,
    SubCategories,
    Items,
}

impl Table {
    /// Resource path segment for this collection.
    pub fn path(&self) -> &'static str {
        match self {
            Table::Restaurant => "restaurant",
            Table::Categories => "categories",
            Table::SubCategories => "sub_categories",
            Table::Items => "items",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Row-level CRUD over the menu tables.
///
/// The fetch methods return rows in display order: categories and
/// subcategories by `order_index`, items by creation time. Write methods
/// take the column map as JSON so one implementation serves every table.
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn fetch_restaurant(&self) -> Result<RestaurantRow, ApiError>;

    async fn fetch_categories(&self) -> Result<Vec<CategoryRow>, ApiError>;

    async fn fetch_sub_categories(&self) -> Result<Vec<SubCategoryRow>, ApiError>;

    async fn fetch_items(&self) -> Result<Vec<ItemRow>, ApiError>;

    /// Insert one row and return the id the store assigned.
    async fn insert(&self, table: Table, row: Value) -> Result<RowId, ApiError>;

    async fn update(&self, table: Table, id: &RowId, changes: Value) -> Result<(), ApiError>;

    async fn delete(&self, table: Table, id: &RowId) -> Result<(), ApiError>;

    /// Remove every row in the table.
    async fn delete_all(&self, table: Table) -> Result<(), ApiError>;
}

/// Whether a store is available for this process.
///
/// Reads treat `NotConfigured` as a reason to serve the bundled menu; writes
/// fail with `MenuError::NotConfigured` before doing any I/O.
#[derive(Debug, Clone)]
pub enum StoreConnection<S> {
    Configured(S),
    NotConfigured,
}

impl<S> StoreConnection<S> {
    pub fn from_option(store: Option<S>) -> Self {
        match store {
            Some(store) => StoreConnection::Configured(store),
            None => StoreConnection::NotConfigured,
        }
    }

    pub fn get(&self) -> Option<&S> {
        match self {
            StoreConnection::Configured(store) => Some(store),
            StoreConnection::NotConfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, StoreConnection::Configured(_))
    }
}
