//! Data models for the menu catalog.
//!
//! - `RowId`: opaque identifier shared by every entity
//! - Row types (`CategoryRow`, `ItemRow`, ...): flat records as the store returns them
//! - Tree types (`MenuData`, `Category`, `SubCategory`, `MenuItem`): the nested
//!   catalog handed to the front end
//! - Drafts and patches: validated inputs for the admin operations

pub mod drafts;
pub mod id;
pub mod menu;
pub mod rows;

pub use drafts::{
    CategoryPatch, ItemPatch, NewCategory, NewItem, NewSubCategory, SubCategoryPatch,
    PLACEHOLDER_ORDER_INDEX,
};
pub use id::RowId;
pub use menu::{Category, MenuData, MenuItem, Restaurant, SubCategory};
pub use rows::{CategoryRow, ItemRow, RestaurantRow, SubCategoryRow};
