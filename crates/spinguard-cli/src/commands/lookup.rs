//! Lookup command implementation.

use spinguard_core::{CookieJar, IdentityCookie, MemoryCookieJar, SpinguardConfig, Verifier};
use std::path::PathBuf;

pub fn run(
    config: &SpinguardConfig,
    ledger: Option<PathBuf>,
    cookie: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = config
        .open_ledger(ledger.as_deref())
        .map_err(|e| format!("Failed to open ledger: {}", e))?;
    let verifier = Verifier::new(config.hasher(), ledger, config.claim_policy());

    let mut jar = MemoryCookieJar::new();
    jar.set(IdentityCookie::new(cookie, config.cookie.secure));

    match verifier.lookup(&jar) {
        Some(response) => println!("{}", serde_json::to_string_pretty(&response)?),
        None => println!("null"),
    }
    Ok(())
}
