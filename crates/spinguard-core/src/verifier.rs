//! Claim verification state machine.
//!
//! A claim moves from unverified through three evidence checks to a ledger
//! lookup and, if needed, a conditional create:
//!
//! 1. fingerprint and asserted token must both be present,
//! 2. the fingerprint must decode, be plausible and hash cleanly,
//! 3. the recomputed token must equal the asserted one.
//!
//! A failed check ends in [`Verdict::Rejected`]; it never touches the ledger.

use spinguard_canonical::{FingerprintHasher, IdentityToken, RawFingerprint};
use spinguard_ledger::{ClaimantName, CreateOutcome, Ledger, LedgerEntry};
use std::fmt;
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

use crate::cookie::{CookieJar, IdentityCookie, COOKIE_NAME};
use crate::response::{shape, ClaimResponse};

/// Marker echoed when fingerprint or token is missing.
pub const MARKER_INVALID_ACCESS: &str = "invalid-access";

/// Marker echoed when the fingerprint is rejected or cannot be hashed.
pub const MARKER_MALFORMED_DATA: &str = "malformed-data";

/// Reward granted per identity.
pub const DEFAULT_REWARD: u64 = 1000;

/// Longest accepted claimant name, in characters.
pub const DEFAULT_MAX_NAME_LEN: usize = 100;

/// Business constants applied by the [`Verifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimPolicy {
    /// Amount recorded for a new claim.
    pub reward: u64,
    /// Amount echoed on deceptive rejections.
    pub placeholder_reward: u64,
    /// Longest accepted claimant name.
    pub max_name_len: usize,
    /// Whether the identity cookie carries the `Secure` flag.
    pub secure_cookie: bool,
}

impl Default for ClaimPolicy {
    fn default() -> Self {
        Self {
            reward: DEFAULT_REWARD,
            placeholder_reward: DEFAULT_REWARD,
            max_name_len: DEFAULT_MAX_NAME_LEN,
            secure_cookie: true,
        }
    }
}

/// Fingerprint payload as the client submitted it.
#[derive(Debug, Clone, PartialEq)]
pub enum FingerprintEvidence {
    /// Payload with the fingerprint record shape.
    Parsed(RawFingerprint),
    /// Payload that is not a fingerprint record; holds the decode error.
    Malformed(String),
}

impl FingerprintEvidence {
    /// Decodes an untrusted JSON value. Never fails.
    pub fn from_json_value(value: serde_json::Value) -> Self {
        match serde_json::from_value(value) {
            Ok(raw) => FingerprintEvidence::Parsed(raw),
            Err(e) => FingerprintEvidence::Malformed(e.to_string()),
        }
    }

    /// Decodes untrusted JSON bytes. Never fails.
    pub fn from_json_slice(bytes: &[u8]) -> Self {
        match serde_json::from_slice(bytes) {
            Ok(raw) => FingerprintEvidence::Parsed(raw),
            Err(e) => FingerprintEvidence::Malformed(e.to_string()),
        }
    }
}

impl From<RawFingerprint> for FingerprintEvidence {
    fn from(raw: RawFingerprint) -> Self {
        FingerprintEvidence::Parsed(raw)
    }
}

/// Input of the claim action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimRequest {
    /// Submitted claimant name.
    pub name: String,
    /// Fingerprint collected by the client.
    pub fingerprint: Option<FingerprintEvidence>,
    /// Token the client extracted from its carrier asset.
    pub asserted_token: Option<String>,
}

impl ClaimRequest {
    /// Builds a request from untyped client input.
    ///
    /// A fingerprint that does not decode is kept as
    /// [`FingerprintEvidence::Malformed`] and rejected like an implausible
    /// one.
    pub fn from_untrusted(
        name: impl Into<String>,
        fingerprint: Option<serde_json::Value>,
        asserted_token: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            fingerprint: fingerprint.map(FingerprintEvidence::from_json_value),
            asserted_token,
        }
    }
}

/// Why a claim was rejected. Logged, never returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectCause {
    /// Fingerprint or asserted token absent.
    MissingEvidence,
    /// Fingerprint failed validation or hashing.
    Implausible(String),
    /// Asserted token differs from the recomputed one.
    TokenMismatch,
}

impl fmt::Display for RejectCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectCause::MissingEvidence => write!(f, "missing fingerprint or token"),
            RejectCause::Implausible(reason) => write!(f, "implausible fingerprint: {}", reason),
            RejectCause::TokenMismatch => write!(f, "asserted token does not match"),
        }
    }
}

/// Terminal state of a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// This claim created the ledger entry.
    Recorded(LedgerEntry),
    /// An entry already existed for the identity.
    AlreadyRecorded(LedgerEntry),
    /// An evidence check failed.
    Rejected {
        /// Internal cause.
        cause: RejectCause,
        /// Identity marker echoed to the caller.
        marker: String,
    },
    /// The name failed input validation.
    InvalidName(String),
    /// The ledger could not be reached.
    StorageUnavailable,
}

/// Claim verifier over a [`Ledger`].
///
/// Holds only immutable state besides the ledger handle, so one instance
/// serves concurrent requests.
#[derive(Debug)]
pub struct Verifier<L> {
    hasher: FingerprintHasher,
    ledger: L,
    policy: ClaimPolicy,
}

impl<L: Ledger> Verifier<L> {
    /// Creates a verifier.
    pub fn new(hasher: FingerprintHasher, ledger: L, policy: ClaimPolicy) -> Self {
        Self {
            hasher,
            ledger,
            policy,
        }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The policy in force.
    pub fn policy(&self) -> &ClaimPolicy {
        &self.policy
    }

    /// Runs the claim action: evaluate, write the identity cookie, shape.
    pub fn claim(&self, request: &ClaimRequest, jar: &mut dyn CookieJar) -> ClaimResponse {
        let verdict = self.evaluate(request);

        let cookie_value = match &verdict {
            Verdict::Recorded(entry) | Verdict::AlreadyRecorded(entry) => {
                Some(entry.token.to_string())
            }
            Verdict::Rejected { .. } => request
                .asserted_token
                .as_ref()
                .filter(|token| !token.is_empty())
                .cloned(),
            Verdict::InvalidName(_) | Verdict::StorageUnavailable => None,
        };
        if let Some(value) = cookie_value {
            jar.set(IdentityCookie::new(value, self.policy.secure_cookie));
        }

        shape(&verdict, &request.name, &self.policy)
    }

    /// Recognises a returning visitor from the identity cookie.
    ///
    /// Returns the repeat-claim response for the recorded entry, or `None`
    /// when the cookie is absent, holds a marker instead of a token, has no
    /// entry, or the ledger cannot be read.
    pub fn lookup(&self, jar: &dyn CookieJar) -> Option<ClaimResponse> {
        let cookie = jar.get(COOKIE_NAME)?;
        let token = IdentityToken::parse(cookie.value.as_str()).ok()?;
        match self.ledger.get(&token) {
            Ok(Some(entry)) => Some(shape(
                &Verdict::AlreadyRecorded(entry),
                "",
                &self.policy,
            )),
            Ok(None) => None,
            Err(e) => {
                error!(error = %e, retryable = e.is_unavailable(), "ledger lookup failed");
                None
            }
        }
    }

    /// Drives a request to its terminal [`Verdict`] without side effects
    /// other than the ledger create.
    pub fn evaluate(&self, request: &ClaimRequest) -> Verdict {
        let name = match ClaimantName::parse(request.name.as_str(), self.policy.max_name_len) {
            Ok(name) => name,
            Err(_) if request.name.trim().is_empty() => {
                return Verdict::InvalidName("Name must not be empty".to_string())
            }
            Err(_) => return Verdict::InvalidName("Name is too long".to_string()),
        };

        let asserted = request
            .asserted_token
            .as_deref()
            .filter(|token| !token.is_empty());
        let (evidence, asserted) = match (&request.fingerprint, asserted) {
            (Some(evidence), Some(asserted)) => (evidence, asserted),
            _ => {
                return self.reject(RejectCause::MissingEvidence, MARKER_INVALID_ACCESS);
            }
        };

        let raw = match evidence {
            FingerprintEvidence::Parsed(raw) => raw,
            FingerprintEvidence::Malformed(reason) => {
                return self.reject(
                    RejectCause::Implausible(format!("undecodable payload: {}", reason)),
                    MARKER_MALFORMED_DATA,
                );
            }
        };

        let computed = match self.hasher.identify(raw) {
            Ok(token) => token,
            Err(e) => {
                return self.reject(RejectCause::Implausible(e.to_string()), MARKER_MALFORMED_DATA);
            }
        };

        if !tokens_match(&computed, asserted) {
            return self.reject(RejectCause::TokenMismatch, asserted);
        }

        self.record(&computed, name)
    }

    fn reject(&self, cause: RejectCause, marker: &str) -> Verdict {
        warn!(cause = %cause, "claim rejected");
        Verdict::Rejected {
            cause,
            marker: marker.to_string(),
        }
    }

    fn record(&self, token: &IdentityToken, name: ClaimantName) -> Verdict {
        match self.ledger.get(token) {
            Ok(Some(entry)) => {
                info!(token = %token, "repeat claim");
                return Verdict::AlreadyRecorded(entry);
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, retryable = e.is_unavailable(), "ledger lookup failed");
                return Verdict::StorageUnavailable;
            }
        }

        match self
            .ledger
            .create_if_absent(token, name, self.policy.reward)
        {
            Ok(CreateOutcome::Created(entry)) => {
                info!(token = %token, reward = entry.reward, "claim recorded");
                Verdict::Recorded(entry)
            }
            Ok(CreateOutcome::AlreadyExists(entry)) => {
                info!(token = %token, "claim lost create race");
                Verdict::AlreadyRecorded(entry)
            }
            Err(e) => {
                error!(error = %e, retryable = e.is_unavailable(), "ledger create failed");
                Verdict::StorageUnavailable
            }
        }
    }
}

fn tokens_match(computed: &IdentityToken, asserted: &str) -> bool {
    computed.as_str().as_bytes().ct_eq(asserted.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookie::MemoryCookieJar;
    use crate::response::Outcome;
    use spinguard_canonical::ServerSecret;
    use spinguard_ledger::{LedgerError, MemoryLedger};

    struct DownLedger;

    impl Ledger for DownLedger {
        fn get(&self, _: &IdentityToken) -> Result<Option<LedgerEntry>, LedgerError> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        fn create_if_absent(
            &self,
            _: &IdentityToken,
            _: ClaimantName,
            _: u64,
        ) -> Result<CreateOutcome, LedgerError> {
            Err(LedgerError::Unavailable("connection refused".into()))
        }

        fn entries(&self) -> Result<Vec<LedgerEntry>, LedgerError> {
            Ok(Vec::new())
        }
    }

    fn hasher() -> FingerprintHasher {
        FingerprintHasher::new(ServerSecret::new("S"))
    }

    fn fingerprint() -> RawFingerprint {
        RawFingerprint {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            platform: "Win32".into(),
            language: "en-US".into(),
            time_zone: "America/New_York".into(),
            screen_width: 2560,
            screen_height: 1440,
            color_depth: 24,
            hardware_concurrency: Some(12),
            device_memory: Some(8.0),
            max_touch_points: 0,
            canvas_fingerprint: "data:image/png;base64,QUJDREVGR0g=".into(),
        }
    }

    fn honest_request(name: &str) -> ClaimRequest {
        let token = hasher().identify(&fingerprint()).unwrap();
        ClaimRequest {
            name: name.into(),
            fingerprint: Some(fingerprint().into()),
            asserted_token: Some(token.to_string()),
        }
    }

    #[test]
    fn honest_claim_is_recorded_then_repeated() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let mut jar = MemoryCookieJar::new();

        assert!(matches!(
            verifier.evaluate(&honest_request("An")),
            Verdict::Recorded(_)
        ));
        match verifier.evaluate(&honest_request("Other")) {
            Verdict::AlreadyRecorded(entry) => assert_eq!(entry.claimant_name.as_str(), "An"),
            other => panic!("unexpected verdict: {:?}", other),
        }

        let response = verifier.claim(&honest_request("Other"), &mut jar);
        assert_eq!(response.claimant_name.as_deref(), Some("An"));
        assert_eq!(jar.identity(), response.identity_token.as_deref());
    }

    #[test]
    fn invalid_name_short_circuits_everything() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let mut jar = MemoryCookieJar::new();

        let response = verifier.claim(&honest_request("   "), &mut jar);
        assert_eq!(response.message, "Name must not be empty");
        assert!(jar.get(COOKIE_NAME).is_none());
        assert!(verifier.ledger().is_empty());

        let long = "x".repeat(DEFAULT_MAX_NAME_LEN + 1);
        assert_eq!(
            verifier.evaluate(&honest_request(&long)),
            Verdict::InvalidName("Name is too long".into())
        );
    }

    #[test]
    fn empty_token_counts_as_missing() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let request = ClaimRequest {
            asserted_token: Some(String::new()),
            ..honest_request("An")
        };
        assert_eq!(
            verifier.evaluate(&request),
            Verdict::Rejected {
                cause: RejectCause::MissingEvidence,
                marker: MARKER_INVALID_ACCESS.into(),
            }
        );
    }

    #[test]
    fn implausible_fingerprint_uses_malformed_marker() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let request = ClaimRequest {
            fingerprint: Some(RawFingerprint::default().into()),
            ..honest_request("An")
        };
        match verifier.evaluate(&request) {
            Verdict::Rejected { cause, marker } => {
                assert!(matches!(cause, RejectCause::Implausible(_)));
                assert_eq!(marker, MARKER_MALFORMED_DATA);
            }
            other => panic!("unexpected verdict: {:?}", other),
        }
        assert!(verifier.ledger().is_empty());
    }

    #[test]
    fn storage_outage_is_not_deceptive() {
        let verifier = Verifier::new(hasher(), DownLedger, ClaimPolicy::default());
        let mut jar = MemoryCookieJar::new();
        let response = verifier.claim(&honest_request("An"), &mut jar);
        assert!(response.is_retryable());
        assert!(response.identity_token.is_none());
        assert!(jar.identity().is_none());
    }

    #[test]
    fn token_comparison_handles_length_mismatch() {
        let token = hasher().identify(&fingerprint()).unwrap();
        assert!(tokens_match(&token, token.as_str()));
        assert!(!tokens_match(&token, &token.as_str()[..63]));
        assert!(!tokens_match(&token, ""));
    }

    #[test]
    fn undecodable_fingerprint_is_rejected_like_implausible() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let token = hasher().identify(&fingerprint()).unwrap().to_string();
        let mut payload = serde_json::to_value(fingerprint()).unwrap();
        payload["screenWidth"] = serde_json::json!(400.5);

        for value in [payload, serde_json::json!("not an object"), serde_json::json!(-1)] {
            let request = ClaimRequest::from_untrusted("An", Some(value), Some(token.clone()));
            assert!(matches!(
                request.fingerprint,
                Some(FingerprintEvidence::Malformed(_))
            ));
            match verifier.evaluate(&request) {
                Verdict::Rejected { cause, marker } => {
                    assert!(matches!(cause, RejectCause::Implausible(_)));
                    assert_eq!(marker, MARKER_MALFORMED_DATA);
                }
                other => panic!("unexpected verdict: {:?}", other),
            }
        }
        assert!(verifier.ledger().is_empty());
    }

    #[test]
    fn untrusted_request_with_valid_payload_is_recorded() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let token = hasher().identify(&fingerprint()).unwrap().to_string();
        let payload = serde_json::to_value(fingerprint()).unwrap();
        let request = ClaimRequest::from_untrusted("An", Some(payload), Some(token));
        assert!(matches!(verifier.evaluate(&request), Verdict::Recorded(_)));
    }

    #[test]
    fn returning_visitor_is_recognised_from_cookie() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let mut jar = MemoryCookieJar::new();
        assert!(verifier.lookup(&jar).is_none());

        let first = verifier.claim(&honest_request("An"), &mut jar);
        let seen = verifier.lookup(&jar).unwrap();
        assert_eq!(seen.outcome, Outcome::AlreadyClaimed);
        assert_eq!(seen.claimant_name.as_deref(), Some("An"));
        assert_eq!(seen.reward, first.reward);
        assert_eq!(seen.identity_token, first.identity_token);
    }

    #[test]
    fn lookup_ignores_markers_and_unknown_tokens() {
        let verifier = Verifier::new(hasher(), MemoryLedger::new(), ClaimPolicy::default());
        let mut jar = MemoryCookieJar::new();

        jar.set(IdentityCookie::new(MARKER_INVALID_ACCESS, true));
        assert!(verifier.lookup(&jar).is_none());

        jar.set(IdentityCookie::new("ab".repeat(32), true));
        assert!(verifier.lookup(&jar).is_none());

        let down = Verifier::new(hasher(), DownLedger, ClaimPolicy::default());
        assert!(down.lookup(&jar).is_none());
    }
}
