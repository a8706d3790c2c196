//! Durable ledger backed by an append-only journal file.

use parking_lot::Mutex;
use spinguard_canonical::IdentityToken;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::entry::{ClaimantName, LedgerEntry};
use crate::errors::LedgerError;
use crate::reader::{JournalReader, ReadMode};
use crate::traits::{CreateOutcome, Ledger};
use crate::writer::{JournalWriter, WriteOptions};

struct JournalState {
    index: HashMap<IdentityToken, LedgerEntry>,
    order: Vec<IdentityToken>,
    writer: JournalWriter,
}

/// Ledger persisted as a journal of entry frames.
///
/// The journal is replayed into an in-memory index on open. A conditional
/// create holds the store lock across the index check and the append, so it
/// is atomic with respect to every other caller of the same instance. A
/// single journal file must not be opened by two instances at once.
pub struct JournalLedger {
    path: PathBuf,
    state: Mutex<JournalState>,
}

impl JournalLedger {
    /// Opens (or creates) a journal ledger at `path`.
    ///
    /// In [`ReadMode::Permissive`] a torn tail frame is cut off before new
    /// entries are appended; in [`ReadMode::Strict`] it is an error.
    /// When the journal holds several entries for one token, the first wins.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Corrupt`] if the journal cannot be replayed and
    /// another [`LedgerError`] if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(
        path: P,
        mode: ReadMode,
        options: WriteOptions,
    ) -> Result<Self, LedgerError> {
        let path = path.as_ref().to_path_buf();
        let mut writer = JournalWriter::open(&path, options)?;

        let mut index = HashMap::new();
        let mut order = Vec::new();
        let corrupt = |source| LedgerError::Corrupt {
            path: path.clone(),
            source,
        };
        let mut reader = JournalReader::open(&path, mode).map_err(corrupt)?;
        while let Some(entry) = reader.read_entry().map_err(corrupt)? {
            if index.contains_key(&entry.token) {
                warn!(token = %entry.token, "duplicate ledger entry ignored during replay");
                continue;
            }
            order.push(entry.token.clone());
            index.insert(entry.token.clone(), entry);
        }

        let file_len = std::fs::metadata(&path)?.len();
        if reader.position() < file_len {
            warn!(
                path = %path.display(),
                valid_len = reader.position(),
                file_len,
                "discarding torn tail of ledger journal"
            );
            writer.truncate_to(reader.position())?;
        }

        info!(path = %path.display(), entries = order.len(), "ledger journal opened");

        Ok(Self {
            path,
            state: Mutex::new(JournalState {
                index,
                order,
                writer,
            }),
        })
    }

    /// Path of the underlying journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.state.lock().order.len()
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Ledger for JournalLedger {
    fn get(&self, token: &IdentityToken) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.state.lock().index.get(token).cloned())
    }

    fn create_if_absent(
        &self,
        token: &IdentityToken,
        claimant_name: ClaimantName,
        reward: u64,
    ) -> Result<CreateOutcome, LedgerError> {
        let mut state = self.state.lock();
        if let Some(existing) = state.index.get(token) {
            return Ok(CreateOutcome::AlreadyExists(existing.clone()));
        }

        let entry = LedgerEntry::new(token.clone(), claimant_name, reward);
        state.writer.append_entry(&entry)?;
        state.order.push(token.clone());
        state.index.insert(token.clone(), entry.clone());
        debug!(token = %token, "ledger entry appended");

        Ok(CreateOutcome::Created(entry))
    }

    fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
        let state = self.state.lock();
        Ok(state
            .order
            .iter()
            .rev()
            .filter_map(|token| state.index.get(token).cloned())
            .collect())
    }
}
