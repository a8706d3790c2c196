//! Get command implementation.

use crate::output;
use spinguard_canonical::IdentityToken;
use spinguard_core::SpinguardConfig;
use spinguard_ledger::{JournalLedger, Ledger, WriteOptions};
use std::path::PathBuf;

pub fn run(
    config: &SpinguardConfig,
    ledger: PathBuf,
    token: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = IdentityToken::parse(token).map_err(|e| format!("Invalid token: {}", e))?;

    let options = WriteOptions {
        create: false,
        ..WriteOptions::default()
    };
    let ledger = JournalLedger::open(&ledger, config.ledger.read_mode, options)
        .map_err(|e| format!("Failed to open ledger {}: {}", ledger.display(), e))?;

    match ledger.get(&token)? {
        Some(entry) => {
            println!("{}", output::format_json(&entry));
            Ok(())
        }
        None => Err("Entry not found".into()),
    }
}
