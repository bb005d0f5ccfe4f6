//! Row shapes as the store returns them.
//!
//! Column names follow the store schema (`order_index`, `category_id`,
//! `image_url`). These types never leave the crate's store/assembler path;
//! the presentation-facing shape lives in `models::menu`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::RowId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRow {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: RowId,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCategoryRow {
    pub id: RowId,
    pub name: String,
    pub category_id: RowId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: RowId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub price: f64,
    pub sub_category_id: RowId,
    #[serde(default = "default_available", deserialize_with = "null_as_available")]
    pub available: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// Mirrors the column default on `items.available`.
fn default_available() -> bool {
    true
}

/// Empty columns come back as `null`; read them as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_available<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(default_available))
}
