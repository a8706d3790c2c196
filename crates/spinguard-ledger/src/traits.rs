use spinguard_canonical::IdentityToken;

use crate::entry::{ClaimantName, LedgerEntry};
use crate::errors::LedgerError;

/// Result of a conditional create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// This call wrote the entry.
    Created(LedgerEntry),
    /// An entry already existed; it is returned unchanged.
    AlreadyExists(LedgerEntry),
}

impl CreateOutcome {
    /// The entry stored under the token, whoever wrote it.
    pub fn entry(&self) -> &LedgerEntry {
        match self {
            CreateOutcome::Created(entry) | CreateOutcome::AlreadyExists(entry) => entry,
        }
    }

    /// Returns `true` if this call created the entry.
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created(_))
    }
}

/// Keyed store of reward grants.
///
/// Implementations must make [`create_if_absent`](Ledger::create_if_absent)
/// atomic per token: among any number of concurrent callers with the same
/// token exactly one observes [`CreateOutcome::Created`], and all others
/// observe [`CreateOutcome::AlreadyExists`] carrying the winner's entry.
pub trait Ledger: Send + Sync {
    /// Looks up the entry for a token.
    fn get(&self, token: &IdentityToken) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Creates an entry unless one already exists for `token`.
    fn create_if_absent(
        &self,
        token: &IdentityToken,
        claimant_name: ClaimantName,
        reward: u64,
    ) -> Result<CreateOutcome, LedgerError>;

    /// Lists all entries, newest first. Read-only reporting.
    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError>;
}

impl<L: Ledger + ?Sized> Ledger for std::sync::Arc<L> {
    fn get(&self, token: &IdentityToken) -> Result<Option<LedgerEntry>, LedgerError> {
        (**self).get(token)
    }

    fn create_if_absent(
        &self,
        token: &IdentityToken,
        claimant_name: ClaimantName,
        reward: u64,
    ) -> Result<CreateOutcome, LedgerError> {
        (**self).create_if_absent(token, claimant_name, reward)
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        (**self).entries()
    }
}
