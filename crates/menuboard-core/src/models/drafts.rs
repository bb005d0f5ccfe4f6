//! Create and update payloads for the admin operations.
//!
//! `New*` types carry everything needed to insert a row (the store assigns
//! the id). `*Patch` types carry only the fields being changed; `None` means
//! "leave as is". Every type validates itself before anything is sent, and
//! renders the column map the store expects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::RowId;
use crate::error::ValidationError;

/// Order index given to freshly inserted categories and subcategories.
/// A later reorder puts the row where it belongs.
pub const PLACEHOLDER_ORDER_INDEX: i32 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Partial category update. `icon: Some(None)` clears the icon.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<Option<String>>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSubCategory {
    pub name: String,
    pub category_id: RowId,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubCategoryPatch {
    pub name: Option<String>,
    pub category_id: Option<RowId>,
    pub order_index: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub sub_category_id: RowId,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_available() -> bool {
    true
}

/// Partial item update. `image: Some(None)` clears the picture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub sub_category_id: Option<RowId>,
    pub available: Option<bool>,
    pub image: Option<Option<String>>,
}

// ============================================================================
// Validation helpers
// ============================================================================

fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn require_id(field: &'static str, id: &RowId) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

pub(crate) fn check_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::InvalidPrice(price));
    }
    Ok(())
}

pub(crate) fn check_order_index(index: i32) -> Result<(), ValidationError> {
    if index < 0 {
        return Err(ValidationError::NegativeIndex(index));
    }
    Ok(())
}

/// Blank optional strings (image, icon) mean "none".
fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn stamped(mut columns: Map<String, Value>, now: DateTime<Utc>) -> Value {
    columns.insert("updated_at".to_string(), json!(now.to_rfc3339()));
    Value::Object(columns)
}

/// Column map for a reorder: the new index plus the update stamp.
pub(crate) fn order_changes(index: i32, now: DateTime<Utc>) -> Value {
    let mut columns = Map::new();
    columns.insert("order_index".to_string(), json!(index));
    stamped(columns, now)
}

// ============================================================================
// Categories
// ============================================================================

impl NewCategory {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)
    }

    pub(crate) fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "icon": self.icon,
            "order_index": PLACEHOLDER_ORDER_INDEX,
        })
    }
}

impl CategoryPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            require_text("name", name)?;
        }
        if let Some(index) = self.order_index {
            check_order_index(index)?;
        }
        Ok(())
    }

    pub(crate) fn to_changes(&self, now: DateTime<Utc>) -> Value {
        let mut columns = Map::new();
        if let Some(ref name) = self.name {
            columns.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(ref icon) = self.icon {
            columns.insert("icon".to_string(), json!(normalize_optional(icon.as_deref())));
        }
        if let Some(index) = self.order_index {
            columns.insert("order_index".to_string(), json!(index));
        }
        stamped(columns, now)
    }
}

// ============================================================================
// Subcategories
// ============================================================================

impl NewSubCategory {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_id("category_id", &self.category_id)
    }

    pub(crate) fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "category_id": self.category_id,
            "order_index": PLACEHOLDER_ORDER_INDEX,
        })
    }
}

impl SubCategoryPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            require_text("name", name)?;
        }
        if let Some(ref id) = self.category_id {
            require_id("category_id", id)?;
        }
        if let Some(index) = self.order_index {
            check_order_index(index)?;
        }
        Ok(())
    }

    pub(crate) fn to_changes(&self, now: DateTime<Utc>) -> Value {
        let mut columns = Map::new();
        if let Some(ref name) = self.name {
            columns.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(ref id) = self.category_id {
            columns.insert("category_id".to_string(), json!(id));
        }
        if let Some(index) = self.order_index {
            columns.insert("order_index".to_string(), json!(index));
        }
        stamped(columns, now)
    }
}

// ============================================================================
// Items
// ============================================================================

impl NewItem {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_id("sub_category_id", &self.sub_category_id)?;
        check_price(self.price)
    }

    pub(crate) fn to_row(&self) -> Value {
        json!({
            "name": self.name.trim(),
            "description": self.description,
            "price": self.price,
            "sub_category_id": self.sub_category_id,
            "available": self.available,
            "image_url": normalize_optional(self.image.as_deref()),
        })
    }
}

impl ItemPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(ref name) = self.name {
            require_text("name", name)?;
        }
        if let Some(ref id) = self.sub_category_id {
            require_id("sub_category_id", id)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        Ok(())
    }

    pub(crate) fn to_changes(&self, now: DateTime<Utc>) -> Value {
        let mut columns = Map::new();
        if let Some(ref name) = self.name {
            columns.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(ref description) = self.description {
            columns.insert("description".to_string(), json!(description));
        }
        if let Some(price) = self.price {
            columns.insert("price".to_string(), json!(price));
        }
        if let Some(ref id) = self.sub_category_id {
            columns.insert("sub_category_id".to_string(), json!(id));
        }
        if let Some(available) = self.available {
            columns.insert("available".to_string(), json!(available));
        }
        if let Some(ref image) = self.image {
            columns.insert(
                "image_url".to_string(),
                json!(normalize_optional(image.as_deref())),
            );
        }
        stamped(columns, now)
    }
}
