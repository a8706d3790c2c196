//! Canonicalize command implementation.

use spinguard_canonical::Canonicalizer;

use super::read_fingerprint;

pub fn run(input: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_fingerprint(input)?;
    let canonicalizer = Canonicalizer::new();

    let canonical = canonicalizer.canonicalize(&raw);
    let bytes = canonicalizer
        .to_canonical_bytes(&canonical)
        .map_err(|e| format!("Canonicalization failed: {}", e))?;

    println!("{}", String::from_utf8_lossy(&bytes));
    Ok(())
}
