//! Wire shape of a claim result.
//!
//! Every verdict goes through [`shape`]. Rule-based rejections and genuine
//! repeat claims share one `alreadyClaimed` shape and message; the cause of a
//! rejection only ever reaches the logs.

use serde::{Deserialize, Serialize};

use crate::verifier::{ClaimPolicy, Verdict};

/// Message of a newly recorded claim.
pub const SUCCESS_MESSAGE: &str = "Congratulations!";

/// Message shared by repeat claims and every deceptive rejection.
pub const ALREADY_CLAIMED_MESSAGE: &str = "Not so fast, you already spun the wheel 😏";

/// Message of a storage outage.
pub const RETRY_MESSAGE: &str = "Something went wrong. Please try again.";

/// Externally visible claim outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    /// A reward was recorded by this call.
    Success,
    /// The caller is told a reward already exists.
    AlreadyClaimed,
    /// A genuine failure the caller can act on.
    Rejected,
}

/// Result returned to the caller of the claim action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    /// Outcome discriminant.
    pub outcome: Outcome,
    /// Reward amount, real or placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<u64>,
    /// Claimant name, stored or submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claimant_name: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Echoed identity marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_token: Option<String>,
    #[serde(skip)]
    retryable: bool,
}

impl ClaimResponse {
    /// Whether a well-behaved client may retry the same request.
    ///
    /// Only storage outages are retryable.
    pub fn is_retryable(&self) -> bool {
        self.retryable
    }
}

/// Maps an internal verdict onto the wire shape.
pub fn shape(verdict: &Verdict, submitted_name: &str, policy: &ClaimPolicy) -> ClaimResponse {
    match verdict {
        Verdict::Recorded(entry) => ClaimResponse {
            outcome: Outcome::Success,
            reward: Some(entry.reward),
            claimant_name: Some(entry.claimant_name.as_str().to_string()),
            message: SUCCESS_MESSAGE.to_string(),
            identity_token: Some(entry.token.to_string()),
            retryable: false,
        },
        Verdict::AlreadyRecorded(entry) => ClaimResponse {
            outcome: Outcome::AlreadyClaimed,
            reward: Some(entry.reward),
            claimant_name: Some(entry.claimant_name.as_str().to_string()),
            message: ALREADY_CLAIMED_MESSAGE.to_string(),
            identity_token: Some(entry.token.to_string()),
            retryable: false,
        },
        Verdict::Rejected { marker, .. } => ClaimResponse {
            outcome: Outcome::AlreadyClaimed,
            reward: Some(policy.placeholder_reward),
            claimant_name: Some(submitted_name.trim().to_string()),
            message: ALREADY_CLAIMED_MESSAGE.to_string(),
            identity_token: Some(marker.clone()),
            retryable: false,
        },
        Verdict::InvalidName(message) => ClaimResponse {
            outcome: Outcome::Rejected,
            reward: None,
            claimant_name: None,
            message: message.clone(),
            identity_token: None,
            retryable: false,
        },
        Verdict::StorageUnavailable => ClaimResponse {
            outcome: Outcome::Rejected,
            reward: None,
            claimant_name: None,
            message: RETRY_MESSAGE.to_string(),
            identity_token: None,
            retryable: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verifier::RejectCause;
    use serde_json::json;

    #[test]
    fn rejection_serializes_like_a_repeat_claim() {
        let verdict = Verdict::Rejected {
            cause: RejectCause::MissingEvidence,
            marker: "invalid-access".into(),
        };
        let response = shape(&verdict, " An ", &ClaimPolicy::default());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "outcome": "alreadyClaimed",
                "reward": 1000,
                "claimantName": "An",
                "message": ALREADY_CLAIMED_MESSAGE,
                "identityToken": "invalid-access"
            })
        );
        assert!(!response.is_retryable());
    }

    #[test]
    fn storage_outage_is_a_distinct_retryable_failure() {
        let response = shape(&Verdict::StorageUnavailable, "An", &ClaimPolicy::default());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({ "outcome": "rejected", "message": RETRY_MESSAGE })
        );
        assert!(response.is_retryable());
    }
}
