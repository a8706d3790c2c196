use thiserror::Error;

/// Failures reading or writing the ledger journal file.
#[derive(Error, Debug)]
pub enum JournalError {
    /// Underlying file I/O failed.
    #[error("journal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The file does not start with a ledger journal header.
    #[error("invalid journal header: {0}")]
    InvalidHeader(String),
    /// A frame header is malformed.
    #[error("bad frame at byte {offset}: {reason}")]
    InvalidFrame {
        /// File offset of the frame.
        offset: u64,
        /// What is wrong with it.
        reason: String,
    },
    /// A payload is over [`MAX_PAYLOAD_SIZE`](crate::frame::MAX_PAYLOAD_SIZE).
    #[error("entry of {size} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge {
        /// Payload length.
        size: usize,
        /// Frame limit.
        max: u32,
    },
    /// An entry frame is not UTF-8.
    #[error("entry frame is not UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
    /// An entry frame does not hold a ledger entry.
    #[error("entry frame is not a ledger entry: {0}")]
    JsonParse(#[from] serde_json::Error),
    /// The file has content but is too short for a header.
    #[error("file is not empty; cannot initialize header")]
    FileNotEmpty,
    /// An earlier append could not be rolled back; the writer is disabled.
    #[error("journal writer disabled after a failed rollback")]
    Poisoned,
    /// The last frame was cut short (strict mode).
    #[error("torn frame at byte {offset}")]
    TruncatedFrame {
        /// File offset of the torn frame.
        offset: u64,
    },
}

/// Errors surfaced by [`Ledger`](crate::Ledger) implementations.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Journal backend error.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),
    /// I/O error outside the journal framing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Backend refused or could not serve the request.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
    /// Journal contents could not be replayed.
    #[error("corrupt ledger journal {}: {source}", path.display())]
    Corrupt {
        /// Journal file path.
        path: std::path::PathBuf,
        /// Underlying framing or parse error.
        source: JournalError,
    },
}

impl LedgerError {
    /// Returns `true` for outages a later retry may get past.
    ///
    /// A corrupt journal or a poisoned writer needs operator attention and
    /// is not one of them.
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            LedgerError::Corrupt { .. } | LedgerError::Journal(JournalError::Poisoned)
        )
    }
}
