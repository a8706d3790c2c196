//! Sequential journal reading.

use crate::entry::LedgerEntry;
use crate::errors::JournalError;
use crate::frame::{FrameHeader, FrameKind, JournalHeader, FRAME_HEADER_SIZE, HEADER_SIZE};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// How a torn final frame is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadMode {
    /// A torn frame is an error.
    #[default]
    Strict,
    /// A torn frame ends the journal.
    Permissive,
}

/// Reads frames front to back.
///
/// # Example
///
/// ```no_run
/// use spinguard_ledger::{JournalReader, ReadMode};
///
/// let mut reader = JournalReader::open("claims.sgl", ReadMode::Strict)?;
/// while let Some(entry) = reader.read_entry()? {
///     println!("{} {}", entry.token, entry.claimant_name.as_str());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct JournalReader {
    input: BufReader<File>,
    mode: ReadMode,
    position: u64,
    done: bool,
}

impl JournalReader {
    /// Opens a journal and checks its header.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] if the file cannot be read or its header is
    /// invalid.
    pub fn open<P: AsRef<Path>>(path: P, mode: ReadMode) -> Result<Self, JournalError> {
        let mut input = BufReader::new(File::open(path)?);

        let mut header = [0u8; HEADER_SIZE];
        input.read_exact(&mut header).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => {
                JournalError::InvalidHeader("file shorter than a journal header".to_string())
            }
            _ => JournalError::Io(e),
        })?;
        JournalHeader::decode(&header)?;

        Ok(Self {
            input,
            mode,
            position: HEADER_SIZE as u64,
            done: false,
        })
    }

    /// End offset of the last complete frame read.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the next raw frame.
    ///
    /// Returns `Ok(None)` at a clean end, and at a torn tail in permissive
    /// mode. [`position`](Self::position) only moves past complete frames.
    pub fn read_frame(&mut self) -> Result<Option<(FrameKind, Vec<u8>)>, JournalError> {
        if self.done {
            return Ok(None);
        }

        let mut head = [0u8; FRAME_HEADER_SIZE];
        match fill(&mut self.input, &mut head)? {
            0 => {
                self.done = true;
                return Ok(None);
            }
            n if n < FRAME_HEADER_SIZE => return self.torn(),
            _ => {}
        }
        let header = FrameHeader::decode(&head, self.position)?;

        let mut payload = vec![0u8; header.len as usize];
        if fill(&mut self.input, &mut payload)? < payload.len() {
            return self.torn();
        }

        self.position += header.frame_len();
        Ok(Some((header.kind, payload)))
    }

    fn torn<T>(&mut self) -> Result<Option<T>, JournalError> {
        self.done = true;
        match self.mode {
            ReadMode::Permissive => Ok(None),
            ReadMode::Strict => Err(JournalError::TruncatedFrame {
                offset: self.position,
            }),
        }
    }

    /// Reads the next ledger entry, skipping frames of unknown kind.
    ///
    /// # Errors
    ///
    /// Returns [`JournalError`] on bad framing, a malformed entry, or a torn
    /// tail in strict mode.
    pub fn read_entry(&mut self) -> Result<Option<LedgerEntry>, JournalError> {
        while let Some((kind, payload)) = self.read_frame()? {
            if kind == FrameKind::Entry {
                let text = std::str::from_utf8(&payload)?;
                return Ok(Some(serde_json::from_str(text)?));
            }
        }
        Ok(None)
    }
}

/// Reads until `buf` is full or the input ends; returns the bytes read.
fn fill<R: Read>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
