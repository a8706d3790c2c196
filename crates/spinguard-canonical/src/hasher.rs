//! Keyed fingerprint hashing.
//!
//! Identity tokens are computed as: `hex(sha256(canonical_bytes || secret))`.
//! Without the server secret the token cannot be reproduced, even by a party
//! that knows the raw fingerprint and the canonicalization rules.

use sha2::{Digest, Sha256};
use std::fmt;

use crate::canonicalizer::{CanonicalizationError, Canonicalizer};
use crate::fingerprint::{CanonicalFingerprint, RawFingerprint};
use crate::token::IdentityToken;
use crate::validator::{validate, Rejection};

/// Server-only hashing key. Never serialized and redacted in `Debug`.
#[derive(Clone)]
pub struct ServerSecret(String);

impl ServerSecret {
    /// Wraps a secret value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ServerSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ServerSecret(<redacted>)")
    }
}

/// Error during identity token computation.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The raw fingerprint failed a plausibility rule.
    #[error("fingerprint rejected: {0}")]
    Rejected(#[from] Rejection),
    /// Canonical serialization failed.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
}

/// Computes identity tokens from fingerprints under a fixed secret.
#[derive(Debug, Clone)]
pub struct FingerprintHasher {
    secret: ServerSecret,
    canonicalizer: Canonicalizer,
}

impl FingerprintHasher {
    /// Creates a hasher keyed by `secret`.
    pub fn new(secret: ServerSecret) -> Self {
        Self {
            secret,
            canonicalizer: Canonicalizer::new(),
        }
    }

    /// Returns the canonicalizer this hasher feeds from.
    pub fn canonicalizer(&self) -> &Canonicalizer {
        &self.canonicalizer
    }

    /// Hashes an already canonical fingerprint.
    ///
    /// Deterministic for a fixed secret. Never rejects input on its own.
    pub fn hash(&self, canonical: &CanonicalFingerprint) -> Result<IdentityToken, HashError> {
        let bytes = self.canonicalizer.to_canonical_bytes(canonical)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        hasher.update(self.secret.as_bytes());
        let digest = hasher.finalize();

        Ok(IdentityToken::from_digest(&digest))
    }

    /// Validates, canonicalizes and hashes a raw fingerprint.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Rejected`] when the fingerprint is implausible.
    pub fn identify(&self, raw: &RawFingerprint) -> Result<IdentityToken, HashError> {
        validate(raw)?;
        let canonical = self.canonicalizer.canonicalize(raw);
        self.hash(&canonical)
    }
}
