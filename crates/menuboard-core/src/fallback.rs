//! The menu served when the store cannot be read.
//!
//! The document is compiled into the binary so there is always something to
//! show, even on a fresh install with no store configured.

use anyhow::{Context, Result};
use tracing::debug;

use crate::models::MenuData;

const BUNDLED_MENU: &str = include_str!("../data/menu.json");

/// Parse the bundled default menu.
pub fn bundled() -> Result<MenuData> {
    let menu: MenuData =
        serde_json::from_str(BUNDLED_MENU).context("Failed to parse bundled menu data")?;
    debug!(
        categories = menu.categories.len(),
        items = menu.item_count(),
        "Loaded bundled menu"
    );
    Ok(menu)
}

/// Load a replacement fallback menu from a JSON file.
pub fn from_file(path: &std::path::Path) -> Result<MenuData> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fallback menu: {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse fallback menu: {}", path.display()))
}
