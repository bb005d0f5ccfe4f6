//! Plain-text rendering of the menu tree.

use std::fmt::Write;

use menuboard_core::utils::{format_optional, format_price, truncate_string};
use menuboard_core::MenuData;

/// Currency sign printed after prices
const CURRENCY: &str = "₽";

/// Longest description shown on an item line
const MAX_DESCRIPTION: usize = 48;

/// Render the whole menu as an indented tree with ids, so they can be
/// passed to the edit commands.
pub fn menu_tree(menu: &MenuData) -> String {
    let mut out = String::new();
    // Writing to a String never fails.
    let _ = write_tree(&mut out, menu);
    out
}

fn write_tree(out: &mut String, menu: &MenuData) -> std::fmt::Result {
    writeln!(out, "{}", menu.restaurant.name)?;
    if !menu.restaurant.description.is_empty() {
        writeln!(out, "{}", menu.restaurant.description)?;
    }

    if menu.categories.is_empty() {
        writeln!(out, "\n  (no categories)")?;
        return Ok(());
    }

    for category in &menu.categories {
        writeln!(
            out,
            "\n{} {}  [{}]",
            category.display_icon(),
            category.name,
            category.id
        )?;
        for sub in &category.sub_categories {
            writeln!(
                out,
                "  {}  [{}]  {}/{} available",
                sub.name,
                sub.id,
                sub.available_count(),
                sub.items.len()
            )?;
            for item in &sub.items {
                let status = if item.available { "" } else { "  (unavailable)" };
                writeln!(
                    out,
                    "    {:<24} {:>10}  [{}]{}",
                    truncate_string(&item.name, 24),
                    format_price(item.price, CURRENCY),
                    item.id,
                    status
                )?;
                let description = format_optional(Some(&item.description), "");
                if !description.is_empty() {
                    writeln!(out, "      {}", truncate_string(&description, MAX_DESCRIPTION))?;
                }
            }
        }
    }
    Ok(())
}
