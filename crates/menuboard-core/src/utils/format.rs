/// Format a price for display, dropping the fraction for whole amounts.
/// `150.0` with "₽" becomes "150 ₽", `99.5` becomes "99.50 ₽".
pub fn format_price(price: f64, currency: &str) -> String {
    let amount = if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    };
    if currency.is_empty() {
        amount
    } else {
        format!("{} {}", amount, currency)
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None or blank
pub fn format_optional(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
