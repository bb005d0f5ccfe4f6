//! The menu service: cached reads plus validated writes.
//!
//! Reads go through the single-slot cache and never fail; when the store is
//! missing or broken the bundled menu is served instead. Writes go straight
//! to the store and invalidate the cache only after the store accepts them.
//!
//! Deleting a category or subcategory does not touch its children. Whether
//! they are removed is up to the store's foreign keys; if they survive they
//! simply stop appearing in the assembled menu.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::StoreClient;
use crate::assembler::assemble;
use crate::cache::MenuCache;
use crate::config::Config;
use crate::error::{MenuError, ValidationError};
use crate::fallback;
use crate::models::drafts::{check_order_index, order_changes};
use crate::models::{
    CategoryPatch, ItemPatch, MenuData, NewCategory, NewItem, NewSubCategory, RowId,
    SubCategoryPatch,
};
use crate::seed;
use crate::store::{MenuStore, StoreConnection, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    fn edge(&self) -> &'static str {
        match self {
            MoveDirection::Up => "top",
            MoveDirection::Down => "bottom",
        }
    }
}

fn row_id(field: &'static str, id: &str) -> Result<RowId, ValidationError> {
    let id = RowId::from(id.trim());
    if id.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(id)
}

/// Index writes that move `id` one step within `siblings`.
///
/// `siblings` is the current display order with each row's stored index.
/// When the stored indexes are strictly increasing, swapping the pair's two
/// values is enough. Otherwise (typically several rows still on the
/// placeholder index) the whole list is renumbered by position and only
/// rows whose index changes are written.
fn plan_move(
    entity: &'static str,
    siblings: &[(RowId, i32)],
    id: &RowId,
    direction: MoveDirection,
) -> Result<Vec<(RowId, i32)>, ValidationError> {
    let position = siblings
        .iter()
        .position(|(sibling, _)| sibling == id)
        .ok_or_else(|| ValidationError::UnknownId {
            entity,
            id: id.to_string(),
        })?;

    let target = match direction {
        MoveDirection::Up => position.checked_sub(1),
        MoveDirection::Down => (position + 1 < siblings.len()).then_some(position + 1),
    }
    .ok_or_else(|| ValidationError::OutOfBounds {
        entity,
        id: id.to_string(),
        edge: direction.edge(),
    })?;

    if siblings.windows(2).all(|pair| pair[0].1 < pair[1].1) {
        return Ok(vec![
            (siblings[position].0.clone(), siblings[target].1),
            (siblings[target].0.clone(), siblings[position].1),
        ]);
    }

    let mut order: Vec<&(RowId, i32)> = siblings.iter().collect();
    order.swap(position, target);
    Ok(order
        .into_iter()
        .enumerate()
        .filter_map(|(pos, (sibling, current))| {
            let pos = i32::try_from(pos).unwrap_or(i32::MAX);
            (*current != pos).then(|| (sibling.clone(), pos))
        })
        .collect())
}

pub struct MenuService<S> {
    store: StoreConnection<S>,
    cache: MenuCache,
    fallback: MenuData,
}

impl MenuService<StoreClient> {
    /// Build the service from configuration. A missing or unusable store
    /// configuration yields a read-only service on the fallback menu.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let fallback = match config.fallback_menu {
            Some(ref path) => fallback::from_file(path)?,
            None => fallback::bundled()?,
        };

        let store = config
            .store_settings()
            .and_then(|settings| match StoreClient::new(&settings) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %e, "Could not create store client");
                    None
                }
            });
        if store.is_none() {
            warn!("Menu store not configured, serving the bundled menu read-only");
        }

        let cache = MenuCache::new(config.cache_ttl());
        debug!(
            ttl_secs = cache.ttl().num_seconds(),
            configured = store.is_some(),
            "Menu service ready"
        );
        Ok(Self::new(StoreConnection::from_option(store), cache, fallback))
    }
}

impl<S: MenuStore> MenuService<S> {
    pub fn new(store: StoreConnection<S>, cache: MenuCache, fallback: MenuData) -> Self {
        Self {
            store,
            cache,
            fallback,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    /// How long ago the cached menu was built, if there is one.
    pub fn cache_age(&self) -> Option<String> {
        self.cache.age_display()
    }

    fn store(&self) -> Result<&S, MenuError> {
        self.store.get().ok_or(MenuError::NotConfigured)
    }

    // ===== Reads =====

    /// The full menu tree. Never fails: any problem reading the store
    /// yields the fallback menu, which is not cached.
    pub async fn get_menu_data(&self) -> MenuData {
        match self.cache.get_or_refresh(|| self.fetch_and_assemble()).await {
            Ok(menu) => menu,
            Err(e) => {
                warn!(error = %e, "Failed to load menu from store, serving fallback");
                self.fallback.clone()
            }
        }
    }

    async fn fetch_and_assemble(&self) -> Result<MenuData, MenuError> {
        let store = self.store()?;
        let (restaurant, categories, sub_categories, items) = futures::try_join!(
            store.fetch_restaurant(),
            store.fetch_categories(),
            store.fetch_sub_categories(),
            store.fetch_items(),
        )?;

        let menu = assemble(&restaurant, &categories, &sub_categories, &items);
        debug!(
            categories = menu.categories.len(),
            items = menu.item_count(),
            "Assembled menu from store"
        );
        Ok(menu)
    }

    // ===== Shared write helpers =====

    async fn insert(&self, table: Table, row: serde_json::Value) -> Result<RowId, MenuError> {
        let id = self.store()?.insert(table, row).await?;
        self.cache.invalidate();
        info!(table = %table, id = %id, "Row added");
        Ok(id)
    }

    async fn update(
        &self,
        table: Table,
        id: &RowId,
        changes: serde_json::Value,
    ) -> Result<(), MenuError> {
        self.store()?.update(table, id, changes).await?;
        self.cache.invalidate();
        info!(table = %table, id = %id, "Row updated");
        Ok(())
    }

    async fn delete(&self, table: Table, id: &RowId) -> Result<(), MenuError> {
        self.store()?.delete(table, id).await?;
        self.cache.invalidate();
        info!(table = %table, id = %id, "Row deleted");
        Ok(())
    }

    /// Write a sequence of order indexes. Not atomic: on a failure after the
    /// first write the earlier writes stay and the error says so.
    async fn apply_order(
        &self,
        operation: &'static str,
        table: Table,
        writes: Vec<(RowId, i32)>,
    ) -> Result<(), MenuError> {
        let store = self.store()?;
        let mut completed = 0;
        for (id, index) in &writes {
            if let Err(e) = store.update(table, id, order_changes(*index, Utc::now())).await {
                let err = MenuError::from(e);
                if completed == 0 {
                    return Err(err);
                }
                self.cache.invalidate();
                warn!(
                    operation,
                    completed,
                    total = writes.len(),
                    error = %err,
                    "Reorder partially applied, display order may be inconsistent"
                );
                return Err(MenuError::PartiallyApplied {
                    operation,
                    completed,
                    source: Box::new(err),
                });
            }
            completed += 1;
        }
        if completed > 0 {
            self.cache.invalidate();
        }
        info!(operation, writes = completed, "Order updated");
        Ok(())
    }

    // ===== Categories =====

    pub async fn add_category(&self, category: &NewCategory) -> Result<RowId, MenuError> {
        category.validate()?;
        self.insert(Table::Categories, category.to_row()).await
    }

    pub async fn update_category(&self, id: &str, patch: &CategoryPatch) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        patch.validate()?;
        self.update(Table::Categories, &id, patch.to_changes(Utc::now()))
            .await
    }

    /// Remove a category row. Its subcategories and items are left to the
    /// store's foreign-key rules.
    pub async fn delete_category(&self, id: &str) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        self.delete(Table::Categories, &id).await
    }

    pub async fn reorder_category(&self, id: &str, new_index: i32) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        check_order_index(new_index)?;
        self.update(Table::Categories, &id, order_changes(new_index, Utc::now()))
            .await
    }

    /// Swap a category with its neighbour. Reads the current order from the
    /// store, then writes the affected rows one by one.
    pub async fn move_category(&self, id: &str, direction: MoveDirection) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        let rows = self.store()?.fetch_categories().await?;
        let siblings: Vec<(RowId, i32)> = rows.into_iter().map(|r| (r.id, r.order_index)).collect();
        let writes = plan_move("category", &siblings, &id, direction)?;
        self.apply_order("move category", Table::Categories, writes)
            .await
    }

    // ===== Subcategories =====

    pub async fn add_sub_category(&self, sub_category: &NewSubCategory) -> Result<RowId, MenuError> {
        sub_category.validate()?;
        self.insert(Table::SubCategories, sub_category.to_row())
            .await
    }

    pub async fn update_sub_category(
        &self,
        id: &str,
        patch: &SubCategoryPatch,
    ) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        patch.validate()?;
        self.update(Table::SubCategories, &id, patch.to_changes(Utc::now()))
            .await
    }

    /// Remove a subcategory row. Its items are left to the store's
    /// foreign-key rules.
    pub async fn delete_sub_category(&self, id: &str) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        self.delete(Table::SubCategories, &id).await
    }

    pub async fn reorder_sub_category(&self, id: &str, new_index: i32) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        check_order_index(new_index)?;
        self.update(Table::SubCategories, &id, order_changes(new_index, Utc::now()))
            .await
    }

    /// Swap a subcategory with its neighbour inside the same category.
    pub async fn move_sub_category(
        &self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        let rows = self.store()?.fetch_sub_categories().await?;
        let parent = rows
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.category_id.clone())
            .ok_or_else(|| ValidationError::UnknownId {
                entity: "subcategory",
                id: id.to_string(),
            })?;
        let siblings: Vec<(RowId, i32)> = rows
            .into_iter()
            .filter(|r| r.category_id == parent)
            .map(|r| (r.id, r.order_index))
            .collect();
        let writes = plan_move("subcategory", &siblings, &id, direction)?;
        self.apply_order("move subcategory", Table::SubCategories, writes)
            .await
    }

    // ===== Items =====

    pub async fn add_item(&self, item: &NewItem) -> Result<RowId, MenuError> {
        item.validate()?;
        self.insert(Table::Items, item.to_row()).await
    }

    pub async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        patch.validate()?;
        self.update(Table::Items, &id, patch.to_changes(Utc::now()))
            .await
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), MenuError> {
        let id = row_id("id", id)?;
        self.delete(Table::Items, &id).await
    }

    // ===== Reset =====

    /// Wipe categories, subcategories and items, then write the starter
    /// catalog. Each step is its own request; a failure part way leaves the
    /// store as far as it got.
    pub async fn reset_to_initial_data(&self) -> Result<(), MenuError> {
        let store = self.store()?;
        warn!("Resetting menu to initial data");

        let mut completed = 0;
        let result = Self::reseed(store, &mut completed).await;
        if completed > 0 {
            self.cache.invalidate();
        }

        match result {
            Ok(()) => {
                info!(steps = completed, "Menu reset to initial data");
                Ok(())
            }
            Err(e) if completed > 0 => {
                warn!(completed, error = %e, "Menu reset partially applied");
                Err(MenuError::PartiallyApplied {
                    operation: "reset menu",
                    completed,
                    source: Box::new(e),
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn reseed(store: &S, completed: &mut usize) -> Result<(), MenuError> {
        // Children first so foreign keys never block a delete.
        for table in [Table::Items, Table::SubCategories, Table::Categories] {
            store.delete_all(table).await?;
            *completed += 1;
        }

        let category_id = store
            .insert(Table::Categories, seed::category().to_row())
            .await?;
        *completed += 1;

        let sub_category_id = store
            .insert(
                Table::SubCategories,
                seed::sub_category(category_id).to_row(),
            )
            .await?;
        *completed += 1;

        for item in seed::items(sub_category_id) {
            store.insert(Table::Items, item.to_row()).await?;
            *completed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::testing::{FakeStore, ManualClock};
    use chrono::Duration;

    fn setup(store: FakeStore) -> (MenuService<FakeStore>, std::sync::Arc<ManualClock>) {
        let clock = ManualClock::new();
        let cache = MenuCache::with_clock(Duration::minutes(5), clock.clone());
        let fallback = fallback::bundled().unwrap();
        let service = MenuService::new(StoreConnection::Configured(store), cache, fallback);
        (service, clock)
    }

    fn read_only() -> MenuService<FakeStore> {
        MenuService::new(
            StoreConnection::NotConfigured,
            MenuCache::default(),
            fallback::bundled().unwrap(),
        )
    }

    fn espresso_cup(sub_category: &str) -> NewItem {
        NewItem {
            name: "Doppio".to_string(),
            description: "Double shot".to_string(),
            price: 170.0,
            sub_category_id: RowId::from(sub_category),
            available: true,
            image: Some("https://img.example/doppio.jpg".to_string()),
        }
    }

    fn category_order(menu: &MenuData) -> Vec<String> {
        menu.categories.iter().map(|c| c.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_seeded_store_assembles_single_path() {
        let (service, _) = setup(FakeStore::seeded());
        let menu = service.get_menu_data().await;

        assert_eq!(menu.restaurant.name, "Corner Cafe");
        assert_eq!(menu.categories.len(), 1);
        let drinks = menu.category("drinks").unwrap();
        assert_eq!(drinks.sub_categories.len(), 1);
        let hot = drinks.sub_category("hot").unwrap();
        assert_eq!(hot.items.len(), 1);
        let esp = hot.item("esp").unwrap();
        assert_eq!(esp.price, 150.0);
        assert!(esp.available);
        assert_eq!(esp.category, "drinks");
        assert_eq!(esp.sub_category, "hot");
    }

    #[tokio::test]
    async fn test_second_read_within_ttl_hits_cache() {
        let store = FakeStore::seeded();
        let (service, clock) = setup(store.clone());

        service.get_menu_data().await;
        assert_eq!(store.reads(), 4);

        clock.advance(Duration::minutes(4));
        service.get_menu_data().await;
        assert_eq!(store.reads(), 4);
        assert!(service.cache_age().is_some());
    }

    #[tokio::test]
    async fn test_read_after_ttl_refetches() {
        let store = FakeStore::seeded();
        let (service, clock) = setup(store.clone());

        service.get_menu_data().await;
        clock.advance(Duration::minutes(5));
        service.get_menu_data().await;
        assert_eq!(store.reads(), 8);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_cache() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        service.get_menu_data().await;
        service.add_item(&espresso_cup("hot")).await.unwrap();
        let menu = service.get_menu_data().await;

        assert_eq!(store.reads(), 8);
        assert_eq!(menu.item_count(), 2);
        let doppio = menu.items().find(|i| i.name == "Doppio").unwrap();
        assert_eq!(doppio.image.as_deref(), Some("https://img.example/doppio.jpg"));
        assert_eq!(doppio.image, doppio.image_url);
    }

    #[tokio::test]
    async fn test_failed_reads_serve_fallback() {
        let store = FakeStore::seeded();
        store.fail_reads(true);
        let (service, _) = setup(store.clone());

        let menu = service.get_menu_data().await;
        assert_eq!(menu, fallback::bundled().unwrap());

        // Fallback is not cached: the next read tries the store again.
        store.fail_reads(false);
        let menu = service.get_menu_data().await;
        assert_eq!(menu.restaurant.name, "Corner Cafe");
    }

    #[tokio::test]
    async fn test_missing_restaurant_row_serves_fallback() {
        let (service, _) = setup(FakeStore::seeded().without_restaurant());
        let menu = service.get_menu_data().await;
        assert_eq!(menu.restaurant.name, "COFFEE LIKE");
    }

    #[tokio::test]
    async fn test_not_configured_reads_fallback_and_rejects_writes() {
        let service = read_only();
        assert!(!service.is_configured());
        assert_eq!(service.get_menu_data().await.restaurant.name, "COFFEE LIKE");

        let err = service
            .add_category(&NewCategory {
                name: "Soups".to_string(),
                icon: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MenuError::NotConfigured));
        assert!(matches!(
            service.delete_item("1").await,
            Err(MenuError::NotConfigured)
        ));
        assert!(matches!(
            service.reset_to_initial_data().await,
            Err(MenuError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_rejected_write_surfaces_and_keeps_cache() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        service.get_menu_data().await;
        store.fail_writes_from(0);

        let err = service.add_item(&espresso_cup("hot")).await.unwrap_err();
        assert!(matches!(err, MenuError::Store(ApiError::AccessDenied(_))));

        let menu = service.get_menu_data().await;
        assert_eq!(store.reads(), 4);
        assert_eq!(menu.item_count(), 1);
    }

    #[tokio::test]
    async fn test_validation_happens_before_any_io() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        let mut item = espresso_cup("hot");
        item.price = -5.0;
        let err = service.add_item(&item).await.unwrap_err();
        assert!(matches!(
            err,
            MenuError::Validation(ValidationError::InvalidPrice(_))
        ));

        let err = service.reorder_category("drinks", -1).await.unwrap_err();
        assert!(matches!(
            err,
            MenuError::Validation(ValidationError::NegativeIndex(-1))
        ));

        let err = service.delete_category("  ").await.unwrap_err();
        assert!(matches!(err, MenuError::Validation(_)));

        assert_eq!(store.writes(), 0);
        assert_eq!(store.reads(), 0);

        // Validation also wins over the configuration check.
        let err = read_only()
            .add_sub_category(&NewSubCategory {
                name: String::new(),
                category_id: RowId::from("drinks"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, MenuError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_category_does_not_cascade() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        service.get_menu_data().await;
        service.delete_category("drinks").await.unwrap();
        let menu = service.get_menu_data().await;

        assert!(menu.category("drinks").is_none());
        assert_eq!(menu.item_count(), 0);
        // Children are still in the store, just unreachable from the tree.
        assert_eq!(store.sub_category_rows().len(), 1);
        assert_eq!(store.item_rows().len(), 1);
    }

    #[tokio::test]
    async fn test_add_category_uses_placeholder_index() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        let id = service
            .add_category(&NewCategory {
                name: "Desserts".to_string(),
                icon: Some("🍰".to_string()),
            })
            .await
            .unwrap();

        let row = store
            .category_rows()
            .into_iter()
            .find(|r| r.id == id)
            .unwrap();
        assert_eq!(row.order_index, 0);
        assert_eq!(row.icon.as_deref(), Some("🍰"));
    }

    #[tokio::test]
    async fn test_update_sends_only_given_fields_plus_stamp() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        let patch = ItemPatch {
            price: Some(160.0),
            available: Some(false),
            ..Default::default()
        };
        service.update_item("esp", &patch).await.unwrap();

        let changes = store.last_changes().unwrap();
        let columns = changes.as_object().unwrap();
        assert_eq!(columns.len(), 3);
        assert!(columns.contains_key("updated_at"));

        let menu = service.get_menu_data().await;
        let esp = menu.items().next().unwrap();
        assert_eq!(esp.price, 160.0);
        assert!(!esp.available);
        assert_eq!(esp.name, "esp");
    }

    #[tokio::test]
    async fn test_update_category_clears_icon() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());

        let patch = CategoryPatch {
            icon: Some(Some("🥤".to_string())),
            ..Default::default()
        };
        service.update_category("drinks", &patch).await.unwrap();
        assert_eq!(
            service.get_menu_data().await.categories[0].icon.as_deref(),
            Some("🥤")
        );

        let patch = CategoryPatch {
            icon: Some(None),
            ..Default::default()
        };
        service.update_category("drinks", &patch).await.unwrap();
        let menu = service.get_menu_data().await;
        assert!(menu.categories[0].icon.is_none());
        assert_eq!(menu.categories[0].name, "drinks");
    }

    #[tokio::test]
    async fn test_reorder_category_sets_index() {
        let store = FakeStore::new()
            .with_category("a", 0)
            .with_category("b", 1);
        let (service, _) = setup(store.clone());

        service.reorder_category("a", 5).await.unwrap();
        let menu = service.get_menu_data().await;
        assert_eq!(category_order(&menu), ["b", "a"]);
    }

    #[tokio::test]
    async fn test_move_category_swaps_neighbours() {
        let store = FakeStore::new()
            .with_category("a", 0)
            .with_category("b", 1)
            .with_category("c", 2);
        let (service, _) = setup(store.clone());

        service.move_category("c", MoveDirection::Up).await.unwrap();
        assert_eq!(store.writes(), 2);
        let menu = service.get_menu_data().await;
        assert_eq!(category_order(&menu), ["a", "c", "b"]);
    }

    #[tokio::test]
    async fn test_move_with_placeholder_indexes_renumbers() {
        let store = FakeStore::new()
            .with_category("a", 0)
            .with_category("b", 0)
            .with_category("c", 0);
        let (service, _) = setup(store.clone());

        service.move_category("a", MoveDirection::Down).await.unwrap();
        let menu = service.get_menu_data().await;
        assert_eq!(category_order(&menu), ["b", "a", "c"]);
    }

    #[tokio::test]
    async fn test_move_past_edge_is_rejected() {
        let store = FakeStore::new().with_category("a", 0).with_category("b", 1);
        let (service, _) = setup(store.clone());

        let err = service.move_category("a", MoveDirection::Up).await.unwrap_err();
        assert!(matches!(
            err,
            MenuError::Validation(ValidationError::OutOfBounds { edge: "top", .. })
        ));
        let err = service.move_category("zzz", MoveDirection::Down).await.unwrap_err();
        assert!(matches!(
            err,
            MenuError::Validation(ValidationError::UnknownId { .. })
        ));
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_move_sub_category_stays_within_parent() {
        let store = FakeStore::new()
            .with_category("drinks", 0)
            .with_category("food", 1)
            .with_sub_category("hot", "drinks", 0)
            .with_sub_category("pastry", "food", 1)
            .with_sub_category("cold", "drinks", 2);
        let (service, _) = setup(store.clone());

        service
            .move_sub_category("cold", MoveDirection::Up)
            .await
            .unwrap();
        let menu = service.get_menu_data().await;
        let drinks: Vec<_> = menu.categories[0]
            .sub_categories
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(drinks, ["cold", "hot"]);

        let err = service
            .move_sub_category("pastry", MoveDirection::Down)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MenuError::Validation(ValidationError::OutOfBounds { edge: "bottom", .. })
        ));
    }

    #[tokio::test]
    async fn test_move_failing_midway_reports_partial_application() {
        let store = FakeStore::new()
            .with_category("a", 0)
            .with_category("b", 1);
        let (service, _) = setup(store.clone());

        service.get_menu_data().await;
        store.fail_writes_from(1);

        let err = service.move_category("b", MoveDirection::Up).await.unwrap_err();
        match err {
            MenuError::PartiallyApplied {
                operation,
                completed,
                ..
            } => {
                assert_eq!(operation, "move category");
                assert_eq!(completed, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The store changed, so the cached tree must not be served.
        service.get_menu_data().await;
        assert_eq!(store.reads(), 4 + 1 + 4);
    }

    #[tokio::test]
    async fn test_reset_reseeds_starter_catalog() {
        let store = FakeStore::seeded()
            .with_category("food", 1)
            .with_item("bun", "hot", 90.0);
        let (service, _) = setup(store.clone());

        service.reset_to_initial_data().await.unwrap();
        let menu = service.get_menu_data().await;

        assert_eq!(menu.categories.len(), 1);
        let category = &menu.categories[0];
        assert_eq!(category.name, "Drinks");
        assert_eq!(category.sub_categories.len(), 1);
        let names: Vec<_> = menu.items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Cappuccino", "Americano"]);
        assert!(menu.items().all(|i| i.sub_category == category.sub_categories[0].id));
    }

    #[tokio::test]
    async fn test_reset_failing_midway_reports_partial_application() {
        let store = FakeStore::seeded();
        let (service, _) = setup(store.clone());
        // Three deletes and the category insert succeed.
        store.fail_writes_from(4);

        let err = service.reset_to_initial_data().await.unwrap_err();
        assert!(matches!(
            err,
            MenuError::PartiallyApplied {
                operation: "reset menu",
                completed: 4,
                ..
            }
        ));

        let menu = service.get_menu_data().await;
        assert_eq!(menu.categories.len(), 1);
        assert!(menu.categories[0].sub_categories.is_empty());
    }

    #[test]
    fn test_plan_move_swaps_stored_indexes() {
        let siblings = vec![
            (RowId::from("a"), 10),
            (RowId::from("b"), 20),
            (RowId::from("c"), 30),
        ];
        let writes = plan_move("category", &siblings, &RowId::from("b"), MoveDirection::Down).unwrap();
        assert_eq!(
            writes,
            vec![(RowId::from("b"), 30), (RowId::from("c"), 20)]
        );
    }
}
