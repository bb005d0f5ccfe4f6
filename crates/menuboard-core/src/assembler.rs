//! Joins the four flat row sets into the nested menu tree.
//!
//! Input order is display order: the fetch layer asks the store for
//! categories and subcategories sorted by `order_index` and items sorted by
//! creation time, and nothing here re-sorts. Rows whose parent is not in the
//! fetched set are dropped without error.

use std::collections::HashMap;

use crate::models::{
    Category, CategoryRow, ItemRow, MenuData, MenuItem, Restaurant, RestaurantRow, RowId,
    SubCategory, SubCategoryRow,
};

/// Group children by parent id, keeping their relative order.
fn group_by_parent<'a, T>(
    rows: &'a [T],
    parent_of: impl Fn(&T) -> &RowId,
) -> HashMap<&'a RowId, Vec<&'a T>> {
    let mut groups: HashMap<&RowId, Vec<&T>> = HashMap::new();
    for row in rows {
        groups.entry(parent_of(row)).or_default().push(row);
    }
    groups
}

fn build_item(row: &ItemRow, category_id: &str, sub_category_id: &str) -> MenuItem {
    MenuItem {
        id: row.id.to_string(),
        name: row.name.clone(),
        description: row.description.clone(),
        price: row.price,
        image: row.image_url.clone(),
        image_url: row.image_url.clone(),
        category: category_id.to_string(),
        sub_category: sub_category_id.to_string(),
        available: row.available,
    }
}

pub fn assemble(
    restaurant: &RestaurantRow,
    categories: &[CategoryRow],
    sub_categories: &[SubCategoryRow],
    items: &[ItemRow],
) -> MenuData {
    let subs_by_category = group_by_parent(sub_categories, |s| &s.category_id);
    let items_by_sub = group_by_parent(items, |i| &i.sub_category_id);

    let categories = categories
        .iter()
        .map(|cat| {
            let category_id = cat.id.to_string();
            let subs = subs_by_category
                .get(&cat.id)
                .map(|subs| {
                    subs.iter()
                        .map(|sub| {
                            let sub_id = sub.id.to_string();
                            let items = items_by_sub
                                .get(&sub.id)
                                .map(|items| {
                                    items
                                        .iter()
                                        .map(|item| build_item(item, &category_id, &sub_id))
                                        .collect()
                                })
                                .unwrap_or_default();
                            SubCategory {
                                id: sub_id,
                                name: sub.name.clone(),
                                category_id: category_id.clone(),
                                order_index: sub.order_index,
                                items,
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();

            Category {
                id: category_id,
                name: cat.name.clone(),
                icon: cat.icon.clone(),
                order_index: cat.order_index,
                sub_categories: subs,
            }
        })
        .collect();

    MenuData {
        restaurant: Restaurant {
            name: restaurant.name.clone(),
            description: restaurant.description.clone(),
        },
        categories,
    }
}
