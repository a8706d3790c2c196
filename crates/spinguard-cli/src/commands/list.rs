//! List command implementation.

use crate::output;
use spinguard_core::SpinguardConfig;
use spinguard_ledger::{JournalLedger, Ledger, WriteOptions};
use std::path::PathBuf;

pub fn run(
    config: &SpinguardConfig,
    ledger: PathBuf,
    json: bool,
    max_entries: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = WriteOptions {
        create: false,
        ..WriteOptions::default()
    };
    let ledger = JournalLedger::open(&ledger, config.ledger.read_mode, options)
        .map_err(|e| format!("Failed to open ledger {}: {}", ledger.display(), e))?;

    if !json {
        output::print_table_header();
    }

    let entries = ledger.entries()?;
    for entry in entries.iter().take(max_entries.unwrap_or(usize::MAX)) {
        if json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!("{}", output::format_table_row(entry));
        }
    }

    Ok(())
}
