//! Device fingerprint primitives for spinguard identity tokens.
//!
//! A raw, client-reported fingerprint flows through three pure stages:
//! the [`validator`] rejects implausible signal combinations, the
//! [`canonicalizer`] coarsens the signals into an order-independent record,
//! and the [`hasher`] turns that record into a keyed [`IdentityToken`].
//! The [`transport`] codec obfuscates the fingerprint for the carrier
//! request parameter.
//!
#![deny(missing_docs)]

/// Canonicalization of raw fingerprints into deterministic bytes.
pub mod canonicalizer;
/// Raw and canonical fingerprint records.
pub mod fingerprint;
/// Keyed hashing of canonical fingerprints.
pub mod hasher;
/// Identity token newtype.
pub mod token;
/// Reversible obfuscation of fingerprints for the carrier request parameter.
pub mod transport;
/// Validation errors shared by primitive newtypes.
pub mod validation;
/// Plausibility checks for raw fingerprints.
pub mod validator;

pub use canonicalizer::{CanonicalizationError, Canonicalizer};
pub use fingerprint::{CanonicalFingerprint, RawFingerprint};
pub use hasher::{FingerprintHasher, HashError, ServerSecret};
pub use token::IdentityToken;
pub use transport::{TransportError, TransportKey};
pub use validation::ValidationError;
pub use validator::{validate, Rejection, RejectionRule};
