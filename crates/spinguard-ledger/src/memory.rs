//! In-process ledger backend.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use spinguard_canonical::IdentityToken;

use crate::entry::{ClaimantName, LedgerEntry};
use crate::errors::LedgerError;
use crate::traits::{CreateOutcome, Ledger};

/// Ledger held in a concurrent map. Contents are lost on drop.
///
/// The conditional create goes through the map's entry API, which holds the
/// shard lock across the existence check and the insert.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entries: DashMap<IdentityToken, LedgerEntry>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Ledger for MemoryLedger {
    fn get(&self, token: &IdentityToken) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.entries.get(token).map(|entry| entry.value().clone()))
    }

    fn create_if_absent(
        &self,
        token: &IdentityToken,
        claimant_name: ClaimantName,
        reward: u64,
    ) -> Result<CreateOutcome, LedgerError> {
        match self.entries.entry(token.clone()) {
            Entry::Occupied(existing) => Ok(CreateOutcome::AlreadyExists(existing.get().clone())),
            Entry::Vacant(slot) => {
                let entry = LedgerEntry::new(token.clone(), claimant_name, reward);
                slot.insert(entry.clone());
                Ok(CreateOutcome::Created(entry))
            }
        }
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let mut all: Vec<LedgerEntry> = self.entries.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}
