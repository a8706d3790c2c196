//! Extract command implementation.

use spinguard_core::extract_token;
use std::path::PathBuf;

pub fn run(asset: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let body = std::fs::read(&asset)
        .map_err(|e| format!("Failed to read asset {}: {}", asset.display(), e))?;
    println!("{}", extract_token(&body));
    Ok(())
}
