use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::ValidationError;

/// Length of an identity token in hexadecimal characters.
pub const TOKEN_HEX_LEN: usize = 64;

const TOKEN_PATTERN: &str = r"^[a-f0-9]{64}$";

/// Keyed fingerprint digest: a 64-character lowercase hex string.
///
/// Serves both as the ledger key and as the bearer value the client echoes
/// back with its claim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Parses a token, rejecting anything that is not 64 lowercase hex chars.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if !is_token_format(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "identity_token",
                value: s,
            });
        }
        Ok(Self(s))
    }

    /// Wraps raw digest bytes.
    pub(crate) fn from_digest(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Returns the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns `true` when `value` has the identity token shape.
pub fn is_token_format(value: &str) -> bool {
    Regex::new(TOKEN_PATTERN)
        .expect("invalid regex")
        .is_match(value)
}

impl TryFrom<String> for IdentityToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<IdentityToken> for String {
    fn from(token: IdentityToken) -> Self {
        token.0
    }
}

impl AsRef<str> for IdentityToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
