//! Output formatting utilities.

use spinguard_ledger::LedgerEntry;

/// Formats an entry as pretty JSON.
pub fn format_json(entry: &LedgerEntry) -> String {
    serde_json::to_string_pretty(entry).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an entry as a table row.
pub fn format_table_row(entry: &LedgerEntry) -> String {
    format!(
        "{:<64} {:<10} {:<24} {}",
        entry.token,
        entry.reward,
        entry.created_at_rfc3339(),
        truncate(entry.claimant_name.as_str(), 40)
    )
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<64} {:<10} {:<24} {}",
        "TOKEN", "REWARD", "CREATED_AT", "NAME"
    );
    println!("{}", "-".repeat(120));
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
