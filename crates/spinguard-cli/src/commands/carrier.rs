//! Carrier command implementation.

use spinguard_core::SpinguardConfig;
use std::io::{self, Write};
use std::path::PathBuf;

pub fn run(
    config: &SpinguardConfig,
    param: Option<String>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let issuer = config.carrier_issuer()?;
    let asset = issuer.issue(param.as_deref());

    // Headers go to stderr so stdout can carry the raw body.
    eprintln!("HTTP {}", asset.status);
    for (name, value) in asset.headers() {
        eprintln!("{}: {}", name, value);
    }

    match out {
        Some(path) => std::fs::write(&path, &asset.body)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&asset.body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
