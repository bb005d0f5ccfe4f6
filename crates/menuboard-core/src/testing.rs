//! Test doubles: an in-memory store with fault injection and a manual clock.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::api::ApiError;
use crate::cache::Clock;
use crate::models::{CategoryRow, ItemRow, RestaurantRow, RowId, SubCategoryRow};
use crate::store::{MenuStore, Table};

/// Clock that only moves when told to.
pub(crate) struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
        })
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

#[derive(Default)]
struct FakeState {
    restaurant: Option<RestaurantRow>,
    categories: Vec<CategoryRow>,
    sub_categories: Vec<SubCategoryRow>,
    items: Vec<ItemRow>,
    next_id: i64,
    reads: usize,
    writes: usize,
    fail_reads: bool,
    fail_writes_from: Option<usize>,
    last_changes: Option<Value>,
}

/// Store double backed by vectors.
///
/// Fetches return rows sorted the way the real store is asked to sort them.
/// Deletes never cascade.
#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    state: Arc<Mutex<FakeState>>,
}

fn merge<T: Serialize + DeserializeOwned>(row: &T, changes: &Value) -> Result<T, ApiError> {
    let mut value =
        serde_json::to_value(row).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
    if let (Some(target), Some(changes)) = (value.as_object_mut(), changes.as_object()) {
        for (key, v) in changes {
            target.insert(key.clone(), v.clone());
        }
    }
    serde_json::from_value(value).map_err(|e| ApiError::Rejected {
        status: 400,
        message: e.to_string(),
    })
}

fn patch_rows<T, F>(rows: &mut [T], id: &RowId, id_of: F, changes: &Value) -> Result<(), ApiError>
where
    T: Serialize + DeserializeOwned,
    F: Fn(&T) -> &RowId,
{
    if let Some(row) = rows.iter_mut().find(|r| id_of(r) == id) {
        *row = merge(row, changes)?;
    }
    Ok(())
}

impl FakeStore {
    pub(crate) fn new() -> Self {
        let store = Self::default();
        store.state().restaurant = Some(RestaurantRow {
            name: "Corner Cafe".to_string(),
            description: "Coffee and pastries".to_string(),
        });
        store.state().next_id = 100;
        store
    }

    /// One category, one subcategory, one item: drinks / hot / esp.
    pub(crate) fn seeded() -> Self {
        Self::new()
            .with_category("drinks", 0)
            .with_sub_category("hot", "drinks", 0)
            .with_item("esp", "hot", 150.0)
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn with_category(self, id: &str, order_index: i32) -> Self {
        self.state().categories.push(CategoryRow {
            id: RowId::from(id),
            name: id.to_string(),
            icon: None,
            order_index,
        });
        self
    }

    pub(crate) fn with_sub_category(self, id: &str, category_id: &str, order_index: i32) -> Self {
        self.state().sub_categories.push(SubCategoryRow {
            id: RowId::from(id),
            name: id.to_string(),
            category_id: RowId::from(category_id),
            order_index,
        });
        self
    }

    pub(crate) fn with_item(self, id: &str, sub_category_id: &str, price: f64) -> Self {
        self.state().items.push(ItemRow {
            id: RowId::from(id),
            name: id.to_string(),
            description: String::new(),
            price,
            sub_category_id: RowId::from(sub_category_id),
            available: true,
            image_url: None,
            created_at: None,
        });
        self
    }

    pub(crate) fn without_restaurant(self) -> Self {
        self.state().restaurant = None;
        self
    }

    pub(crate) fn fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Reject every write from the `n`th one (0-based) onward.
    pub(crate) fn fail_writes_from(&self, n: usize) {
        self.state().fail_writes_from = Some(n);
    }

    pub(crate) fn reads(&self) -> usize {
        self.state().reads
    }

    pub(crate) fn writes(&self) -> usize {
        self.state().writes
    }

    pub(crate) fn last_changes(&self) -> Option<Value> {
        self.state().last_changes.clone()
    }

    pub(crate) fn category_rows(&self) -> Vec<CategoryRow> {
        self.state().categories.clone()
    }

    pub(crate) fn sub_category_rows(&self) -> Vec<SubCategoryRow> {
        self.state().sub_categories.clone()
    }

    pub(crate) fn item_rows(&self) -> Vec<ItemRow> {
        self.state().items.clone()
    }

    fn begin_read(&self) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        state.reads += 1;
        if state.fail_reads {
            return Err(ApiError::ServerError("store unavailable".to_string()));
        }
        Ok(state)
    }

    fn begin_write(&self) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        if matches!(state.fail_writes_from, Some(n) if state.writes >= n) {
            return Err(ApiError::AccessDenied(
                "new row violates row-level security policy (42501)".to_string(),
            ));
        }
        state.writes += 1;
        Ok(state)
    }
}

#[async_trait]
impl MenuStore for FakeStore {
    async fn fetch_restaurant(&self) -> Result<RestaurantRow, ApiError> {
        self.begin_read()?
            .restaurant
            .clone()
            .ok_or_else(|| ApiError::NotFound("restaurant row".to_string()))
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryRow>, ApiError> {
        let mut rows = self.begin_read()?.categories.clone();
        rows.sort_by_key(|r| r.order_index);
        Ok(rows)
    }

    async fn fetch_sub_categories(&self) -> Result<Vec<SubCategoryRow>, ApiError> {
        let mut rows = self.begin_read()?.sub_categories.clone();
        rows.sort_by_key(|r| r.order_index);
        Ok(rows)
    }

    async fn fetch_items(&self) -> Result<Vec<ItemRow>, ApiError> {
        Ok(self.begin_read()?.items.clone())
    }

    async fn insert(&self, table: Table, row: Value) -> Result<RowId, ApiError> {
        let mut state = self.begin_write()?;
        let id = RowId::from(state.next_id);
        state.next_id += 1;

        let mut row = row;
        if let Some(columns) = row.as_object_mut() {
            columns.insert("id".to_string(), serde_json::to_value(&id).unwrap());
        }
        let invalid = |e: serde_json::Error| ApiError::Rejected {
            status: 400,
            message: e.to_string(),
        };
        match table {
            Table::Categories => state
                .categories
                .push(serde_json::from_value(row).map_err(invalid)?),
            Table::SubCategories => state
                .sub_categories
                .push(serde_json::from_value(row).map_err(invalid)?),
            Table::Items => state.items.push(serde_json::from_value(row).map_err(invalid)?),
            Table::Restaurant => {
                state.restaurant = Some(serde_json::from_value(row).map_err(invalid)?)
            }
        }
        Ok(id)
    }

    async fn update(&self, table: Table, id: &RowId, changes: Value) -> Result<(), ApiError> {
        let mut state = self.begin_write()?;
        match table {
            Table::Categories => patch_rows(&mut state.categories, id, |r| &r.id, &changes)?,
            Table::SubCategories => {
                patch_rows(&mut state.sub_categories, id, |r| &r.id, &changes)?
            }
            Table::Items => patch_rows(&mut state.items, id, |r| &r.id, &changes)?,
            Table::Restaurant => {}
        }
        state.last_changes = Some(changes);
        Ok(())
    }

    async fn delete(&self, table: Table, id: &RowId) -> Result<(), ApiError> {
        let mut state = self.begin_write()?;
        match table {
            Table::Categories => state.categories.retain(|r| &r.id != id),
            Table::SubCategories => state.sub_categories.retain(|r| &r.id != id),
            Table::Items => state.items.retain(|r| &r.id != id),
            Table::Restaurant => state.restaurant = None,
        }
        Ok(())
    }

    async fn delete_all(&self, table: Table) -> Result<(), ApiError> {
        let mut state = self.begin_write()?;
        match table {
            Table::Categories => state.categories.clear(),
            Table::SubCategories => state.sub_categories.clear(),
            Table::Items => state.items.clear(),
            Table::Restaurant => state.restaurant = None,
        }
        Ok(())
    }
}
