use spinguard_ledger::LedgerError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while assembling spinguard components.
///
/// Request handling itself never fails: the carrier always returns an asset
/// and the verifier always returns a response.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration could not be loaded or applied.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The ledger could not be opened.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// No ledger path was given or configured.
    #[error("no ledger path given and ledger.path is not configured")]
    LedgerPathMissing,
}
