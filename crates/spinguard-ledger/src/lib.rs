//! Idempotent claim ledger for spinguard identity tokens.
//!
//! This crate provides:
//! - The [`Ledger`] contract: keyed, create-if-absent storage of claim entries
//! - [`MemoryLedger`], an in-process backend
//! - [`JournalLedger`], a durable backend over a framed, append-only file
//!
//! For any identity token at most one [`LedgerEntry`] ever exists. It is
//! written once by whichever caller wins the conditional create and is never
//! mutated afterwards.
//!
//! ## Quick Start
//!
//! ```rust
//! use spinguard_canonical::IdentityToken;
//! use spinguard_ledger::{ClaimantName, CreateOutcome, Ledger, MemoryLedger};
//!
//! let ledger = MemoryLedger::new();
//! let token = IdentityToken::parse("ab".repeat(32))?;
//! let name = ClaimantName::parse("An", 100)?;
//!
//! assert!(matches!(
//!     ledger.create_if_absent(&token, name.clone(), 1000)?,
//!     CreateOutcome::Created(_)
//! ));
//! assert!(matches!(
//!     ledger.create_if_absent(&token, name, 1000)?,
//!     CreateOutcome::AlreadyExists(_)
//! ));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Ledger entry and claimant name types.
pub mod entry;
/// Error types for ledger and journal operations.
pub mod errors;
/// Journal frame structure and serialization.
pub mod frame;
/// Journal-backed ledger.
pub mod journal;
/// In-memory ledger.
pub mod memory;
/// Journal reader implementation.
pub mod reader;
/// The ledger contract.
pub mod traits;
/// Journal writer implementation.
pub mod writer;

pub use entry::{ClaimantName, LedgerEntry};
pub use errors::{JournalError, LedgerError};
pub use frame::{FrameHeader, FrameKind, JournalHeader};
pub use journal::JournalLedger;
pub use memory::MemoryLedger;
pub use reader::{JournalReader, ReadMode};
pub use traits::{CreateOutcome, Ledger};
pub use writer::{JournalWriter, WriteOptions};
