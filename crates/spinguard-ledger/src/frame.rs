//! On-disk layout of the ledger journal.
//!
//! ```text
//! file   := header frame*
//! header := "SGL1" | version u16 LE | 10 zero bytes           (16 bytes)
//! frame  := kind u8 | 3 zero bytes | len u32 LE | payload     (8 + len bytes)
//! ```
//!
//! Only entry frames (kind `0x01`) are written today. Readers step over frames
//! of any other kind, so a later format version can add frame kinds without
//! breaking older readers of the same journal.

use crate::errors::JournalError;

/// Ledger journal magic bytes.
pub const MAGIC: &[u8; 4] = b"SGL1";

/// Journal format version written by this crate.
pub const VERSION: u16 = 1;

/// Size of the file header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Size of a frame header in bytes.
pub const FRAME_HEADER_SIZE: usize = 8;

/// Largest accepted frame payload: 1 MiB.
pub const MAX_PAYLOAD_SIZE: u32 = 1024 * 1024;

const KIND_ENTRY: u8 = 0x01;

/// Journal file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JournalHeader {
    /// Format version.
    pub version: u16,
}

impl JournalHeader {
    /// Header for the current format version.
    pub fn current() -> Self {
        Self { version: VERSION }
    }

    /// Encodes the header.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(MAGIC);
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out
    }

    /// Decodes and checks a header.
    pub fn decode(bytes: &[u8]) -> Result<Self, JournalError> {
        let invalid = |reason: String| Err(JournalError::InvalidHeader(reason));

        if bytes.len() < HEADER_SIZE {
            return invalid(format!("header too short: {} bytes", bytes.len()));
        }
        if &bytes[..4] != MAGIC {
            return invalid(format!("invalid magic {:?}, expected {:?}", &bytes[..4], MAGIC));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return invalid(format!("unsupported version {}, expected {}", version, VERSION));
        }
        if bytes[6..HEADER_SIZE].iter().any(|&b| b != 0) {
            return invalid("non-zero reserved bytes".to_string());
        }
        Ok(Self { version })
    }
}

impl Default for JournalHeader {
    fn default() -> Self {
        Self::current()
    }
}

/// Kind byte of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// UTF-8 JSON of one [`LedgerEntry`](crate::LedgerEntry).
    Entry,
    /// Any other kind; readers skip it.
    Unknown(u8),
}

impl From<u8> for FrameKind {
    fn from(byte: u8) -> Self {
        match byte {
            KIND_ENTRY => FrameKind::Entry,
            other => FrameKind::Unknown(other),
        }
    }
}

impl From<FrameKind> for u8 {
    fn from(kind: FrameKind) -> Self {
        match kind {
            FrameKind::Entry => KIND_ENTRY,
            FrameKind::Unknown(byte) => byte,
        }
    }
}

/// Header preceding every frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Payload kind.
    pub kind: FrameKind,
    /// Payload length in bytes.
    pub len: u32,
}

impl FrameHeader {
    /// Header for a payload of `len` bytes, bounded by [`MAX_PAYLOAD_SIZE`].
    pub fn new(kind: FrameKind, len: usize) -> Result<Self, JournalError> {
        match u32::try_from(len) {
            Ok(len) if len <= MAX_PAYLOAD_SIZE => Ok(Self { kind, len }),
            _ => Err(JournalError::PayloadTooLarge {
                size: len,
                max: MAX_PAYLOAD_SIZE,
            }),
        }
    }

    /// Encodes the frame header.
    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut out = [0u8; FRAME_HEADER_SIZE];
        out[0] = self.kind.into();
        out[4..].copy_from_slice(&self.len.to_le_bytes());
        out
    }

    /// Decodes a frame header that starts at byte `offset` of the file.
    pub fn decode(bytes: &[u8; FRAME_HEADER_SIZE], offset: u64) -> Result<Self, JournalError> {
        if bytes[1..4] != [0, 0, 0] {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: "non-zero reserved bytes".to_string(),
            });
        }
        let len = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if len > MAX_PAYLOAD_SIZE {
            return Err(JournalError::InvalidFrame {
                offset,
                reason: format!("payload size {} exceeds maximum {}", len, MAX_PAYLOAD_SIZE),
            });
        }
        Ok(Self {
            kind: FrameKind::from(bytes[0]),
            len,
        })
    }

    /// Total on-disk size of the frame this header introduces.
    pub fn frame_len(&self) -> u64 {
        FRAME_HEADER_SIZE as u64 + u64::from(self.len)
    }
}
