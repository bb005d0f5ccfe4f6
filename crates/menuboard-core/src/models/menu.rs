//! The assembled menu tree consumed by the front end.
//!
//! Field names are camelCase on the wire because the bundled fallback
//! document and the web front end both use that shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MenuData {
    pub restaurant: Restaurant,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Restaurant {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub sub_categories: Vec<SubCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct SubCategory {
    pub id: String,
    pub name: String,
    pub category_id: String,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// A single dish or drink.
///
/// `category` and `sub_category` are copies of the resolved parent ids.
/// `image` and `image_url` always hold the same value; older consumers read
/// one, newer ones the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
    pub sub_category: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl MenuData {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// All items in display order.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.categories
            .iter()
            .flat_map(|c| c.sub_categories.iter())
            .flat_map(|s| s.items.iter())
    }
}

impl Category {
    pub fn sub_category(&self, id: &str) -> Option<&SubCategory> {
        self.sub_categories.iter().find(|s| s.id == id)
    }

    /// Icon for display, falling back to a generic plate.
    pub fn display_icon(&self) -> &str {
        match self.icon.as_deref() {
            Some(icon) if !icon.is_empty() => icon,
            _ => "🍽",
        }
    }
}

impl SubCategory {
    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn available_count(&self) -> usize {
        self.items.iter().filter(|i| i.available).count()
    }
}
