use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use spinguard_canonical::{IdentityToken, ValidationError};

/// Free-text claimant name, trimmed and bounded in length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimantName(String);

impl ClaimantName {
    /// Parses a name of 1..=`max_len` characters after trimming.
    pub fn parse(value: impl Into<String>, max_len: usize) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::OutOfBounds {
                field: "name",
                value: "empty".to_string(),
            });
        }
        let len = trimmed.chars().count();
        if len > max_len {
            return Err(ValidationError::OutOfBounds {
                field: "name",
                value: format!("{} chars, max {}", len, max_len),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClaimantName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One recorded reward grant, keyed by identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identity token the reward was granted to.
    pub token: IdentityToken,
    /// Name the claimant submitted.
    pub claimant_name: ClaimantName,
    /// Reward amount fixed at creation time.
    pub reward: u64,
    /// Creation time (UTC).
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(token: IdentityToken, claimant_name: ClaimantName, reward: u64) -> Self {
        Self {
            token,
            claimant_name,
            reward,
            created_at: Utc::now(),
        }
    }

    /// Creation time as an RFC 3339 string with a `Z` suffix.
    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        let name = ClaimantName::parse("  An  ", 100).unwrap();
        assert_eq!(name.as_str(), "An");
    }

    #[test]
    fn name_bounds_are_enforced() {
        assert!(ClaimantName::parse("   ", 100).is_err());
        assert!(ClaimantName::parse("x".repeat(101), 100).is_err());
        assert!(ClaimantName::parse("x".repeat(100), 100).is_ok());
    }

    #[test]
    fn name_length_counts_characters() {
        assert!(ClaimantName::parse("日本語", 3).is_ok());
        assert!(ClaimantName::parse("日本語", 2).is_err());
    }

    #[test]
    fn entry_serializes_with_token_string() {
        let token = IdentityToken::parse("cd".repeat(32)).unwrap();
        let entry = LedgerEntry::new(token, ClaimantName::parse("An", 100).unwrap(), 1000);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["token"], "cd".repeat(32));
        assert_eq!(value["claimant_name"], "An");
        assert_eq!(value["reward"], 1000);
        assert!(entry.created_at_rfc3339().ends_with('Z'));
    }
}
