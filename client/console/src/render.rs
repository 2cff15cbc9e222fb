//! Text rendering shared by every screen.
//!
//! [`section`] is the single place a [`ViewState`] turns into output, so every
//! screen shows loading, error, empty and data the same way.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use remote_resource::ViewState;

pub fn section<P>(
    title: &str,
    state: &ViewState<P>,
    is_empty: impl Fn(&P) -> bool,
    empty_message: &str,
    body: impl FnOnce(&P) -> String,
) -> String {
    let mut out = heading(title);
    match state {
        ViewState::Idle => out.push_str("  (not loaded)\n"),
        ViewState::Loading { .. } => out.push_str("  Loading...\n"),
        ViewState::Error(err) => {
            let _ = writeln!(out, "  Error: {}", err.message());
            out.push_str("  Run the command again to retry.\n");
        }
        ViewState::Success(data) if is_empty(data) => {
            let _ = writeln!(out, "  {empty_message}");
        }
        ViewState::Success(data) => out.push_str(&body(data)),
    }
    out
}

pub fn heading(title: &str) -> String {
    format!("\n{title}\n{}\n", "─".repeat(title.chars().count()))
}

/// `1234.5` → `$1,234.50`
pub fn money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}${grouped}.{frac:02}")
}

pub fn date(value: Option<&DateTime<Utc>>) -> String {
    value.map_or_else(|| "N/A".to_string(), |d| d.format("%b %d, %Y").to_string())
}

/// `"deposit"` → `"Deposit"`
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
