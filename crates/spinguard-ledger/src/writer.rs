//! Append-only journal writing.

use crate::entry::LedgerEntry;
use crate::errors::JournalError;
use crate::frame::{FrameHeader, FrameKind, JournalHeader, FRAME_HEADER_SIZE, HEADER_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::error;

/// Options for opening a [`JournalWriter`].
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// `fsync` file data after every append (default: true).
    pub sync: bool,
    /// Create the file when missing (default: true).
    pub create: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sync: true,
            create: true,
        }
    }
}

/// Appends frames to a ledger journal.
///
/// A failed append is rolled back to the last committed length. If the
/// rollback itself fails the writer is poisoned and refuses further appends.
pub struct JournalWriter {
    file: File,
    sync: bool,
    committed: u64,
    poisoned: bool,
    #[cfg(test)]
    fault: Option<Fault>,
}

/// Failure injected into the next append.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    /// Half the frame reaches the file, then the write fails.
    ShortWrite,
    /// The whole frame is written but syncing it fails.
    SyncFailed,
    /// As `SyncFailed`, and the rollback fails too.
    Unrecoverable,
}

impl JournalWriter {
    /// Opens a journal for appending, writing a header into an empty file.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be opened, or if it is
    /// non-empty without a valid journal header.
    pub fn open<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, JournalError> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(options.create)
            .truncate(false)
            .open(path)?;

        let committed = match file.metadata()?.len() {
            0 => {
                file.write_all(&JournalHeader::current().encode())?;
                HEADER_SIZE as u64
            }
            len if len < HEADER_SIZE as u64 => return Err(JournalError::FileNotEmpty),
            _ => {
                let mut header = [0u8; HEADER_SIZE];
                file.read_exact(&mut header)?;
                JournalHeader::decode(&header)?;
                file.seek(SeekFrom::End(0))?
            }
        };

        let mut writer = Self {
            file,
            sync: options.sync,
            committed,
            poisoned: false,
            #[cfg(test)]
            fault: None,
        };
        writer.commit()?;
        Ok(writer)
    }

    /// Cuts the file back to `len` bytes (never into the header) and resumes
    /// appending there.
    pub fn truncate_to(&mut self, len: u64) -> Result<(), JournalError> {
        let len = len.max(HEADER_SIZE as u64);
        self.file.set_len(len)?;
        self.file.seek(SeekFrom::Start(len))?;
        self.commit()?;
        self.committed = len;
        Ok(())
    }

    /// Length of the journal up to the last successful append.
    pub fn committed_len(&self) -> u64 {
        self.committed
    }

    /// Appends one ledger entry as an [`FrameKind::Entry`] frame.
    pub fn append_entry(&mut self, entry: &LedgerEntry) -> Result<(), JournalError> {
        let payload = serde_json::to_vec(entry)?;
        self.append_raw(FrameKind::Entry, &payload)
    }

    pub(crate) fn append_raw(&mut self, kind: FrameKind, payload: &[u8]) -> Result<(), JournalError> {
        if self.poisoned {
            return Err(JournalError::Poisoned);
        }
        let header = FrameHeader::new(kind, payload.len())?;

        // Frame header and payload in a single write.
        let mut frame = Vec::with_capacity(FRAME_HEADER_SIZE + payload.len());
        frame.extend_from_slice(&header.encode());
        frame.extend_from_slice(payload);

        let written = self.write_frame(&frame);
        let result = match written {
            Ok(()) => {
                self.committed += frame.len() as u64;
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.rollback() {
                    error!(
                        committed = self.committed,
                        error = %rollback,
                        "journal rollback failed; refusing further appends"
                    );
                    self.poisoned = true;
                }
                Err(e)
            }
        };
        #[cfg(test)]
        {
            self.fault = None;
        }
        result
    }

    /// Whether a failed rollback has disabled this writer.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<(), JournalError> {
        #[cfg(test)]
        if self.fault == Some(Fault::ShortWrite) {
            self.file.write_all(&frame[..frame.len() / 2])?;
            return Err(injected("short write"));
        }
        self.file.write_all(frame)?;
        #[cfg(test)]
        if matches!(self.fault, Some(Fault::SyncFailed | Fault::Unrecoverable)) {
            self.file.flush()?;
            return Err(injected("sync failed"));
        }
        self.commit()
    }

    /// Cuts the file back to the last committed length.
    fn rollback(&mut self) -> io::Result<()> {
        #[cfg(test)]
        if self.fault == Some(Fault::Unrecoverable) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected rollback failure"));
        }
        self.file.set_len(self.committed)?;
        self.file.seek(SeekFrom::Start(self.committed))?;
        if self.sync {
            self.file.sync_data()?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn inject(&mut self, fault: Fault) {
        self.fault = Some(fault);
    }

    fn commit(&mut self) -> Result<(), JournalError> {
        self.file.flush()?;
        if self.sync {
            self.file.sync_data()?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn injected(what: &str) -> JournalError {
    JournalError::Io(io::Error::new(io::ErrorKind::Other, format!("injected {}", what)))
}
