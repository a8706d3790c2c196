//! Hash command implementation.

use spinguard_core::SpinguardConfig;

use super::read_fingerprint;

pub fn run(config: &SpinguardConfig, input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_fingerprint(input)?;
    let token = config
        .hasher()
        .identify(&raw)
        .map_err(|e| format!("Fingerprint rejected: {}", e))?;

    println!("{}", token);
    Ok(())
}
