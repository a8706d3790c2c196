//! Encode command implementation.

use spinguard_core::SpinguardConfig;

use super::read_fingerprint;

pub fn run(config: &SpinguardConfig, input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_fingerprint(input)?;
    let param = config
        .transport_key()
        .encode(&raw)
        .map_err(|e| format!("Encoding failed: {}", e))?;

    println!("{}", param);
    Ok(())
}
