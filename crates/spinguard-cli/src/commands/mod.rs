//! Subcommand implementations.

pub mod canonicalize;
pub mod carrier;
pub mod claim;
pub mod encode;
pub mod extract;
pub mod get;
pub mod hash;
pub mod list;
pub mod lookup;

use spinguard_canonical::RawFingerprint;
use std::io::{self, Read};

/// Reads a raw fingerprint from a file, or stdin when no path is given.
pub fn read_fingerprint(input: Option<String>) -> Result<RawFingerprint, Box<dyn std::error::Error>> {
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read file {}: {}", path, e))?
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    };

    let raw = serde_json::from_str(&json_str)
        .map_err(|e| format!("Invalid fingerprint JSON: {}", e))?;
    Ok(raw)
}
