//! Claim command implementation.

use spinguard_core::cookie::COOKIE_NAME;
use spinguard_core::{
    ClaimRequest, CookieJar, FingerprintEvidence, MemoryCookieJar, SpinguardConfig, Verifier,
};
use std::path::PathBuf;

pub fn run(
    config: &SpinguardConfig,
    ledger: Option<PathBuf>,
    name: String,
    fingerprint: Option<PathBuf>,
    token: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let ledger = config
        .open_ledger(ledger.as_deref())
        .map_err(|e| format!("Failed to open ledger: {}", e))?;

    // An undecodable payload is passed through; the verifier rejects it.
    let fingerprint = match fingerprint {
        Some(path) => {
            let bytes = std::fs::read(&path)
                .map_err(|e| format!("Failed to read file {}: {}", path.display(), e))?;
            Some(FingerprintEvidence::from_json_slice(&bytes))
        }
        None => None,
    };

    let verifier = Verifier::new(config.hasher(), ledger, config.claim_policy());
    let request = ClaimRequest {
        name,
        fingerprint,
        asserted_token: token,
    };

    let mut jar = MemoryCookieJar::new();
    let response = verifier.claim(&request, &mut jar);

    if let Some(cookie) = jar.get(COOKIE_NAME) {
        eprintln!("Set-Cookie: {}", cookie.to_header_value());
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
