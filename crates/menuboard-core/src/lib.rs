//! Menuboard core - menu data, caching and admin writes for a restaurant
//! digital menu backed by a hosted Postgres REST store.
//!
//! The crate assembles flat store rows into a `Restaurant -> Category ->
//! SubCategory -> Item` tree, keeps that tree in a short-lived cache, and
//! falls back to a bundled menu whenever the store can't be read.

pub mod api;
pub mod assembler;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fallback;
pub mod models;
pub mod seed;
pub mod service;
pub mod store;
pub mod utils;

#[cfg(test)]
mod testing;

pub use api::{ApiError, StoreClient};
pub use cache::{MenuCache, DEFAULT_CACHE_TTL_MINUTES};
pub use config::{Config, StoreSettings};
pub use credentials::CredentialStore;
pub use error::{MenuError, ValidationError};
pub use models::{
    Category, CategoryPatch, ItemPatch, MenuData, MenuItem, NewCategory, NewItem,
    NewSubCategory, Restaurant, RowId, SubCategory, SubCategoryPatch,
};
pub use service::{MenuService, MoveDirection};
pub use store::{MenuStore, StoreConnection, Table};
