//! Spinguard request-side components.
//!
//! - [`carrier`]: issues the binary asset carrying an identity token, and
//!   extracts it again on the client
//! - [`cache`]: the client's first-write-wins cache pinning that asset
//! - [`verifier`]: the claim state machine over a
//!   [`Ledger`](spinguard_ledger::Ledger)
//! - [`response`]: the single mapping from verdicts to wire responses
//! - [`cookie`]: the identity cookie
//! - [`config`]: TOML configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use spinguard_core::{
//!     ClaimPolicy, ClaimRequest, MemoryCookieJar, Outcome, PinnedCache, SpinguardConfig,
//!     Verifier, extract_token,
//! };
//! use spinguard_canonical::RawFingerprint;
//! use spinguard_ledger::MemoryLedger;
//!
//! let config = SpinguardConfig::default();
//! let issuer = config.carrier_issuer()?;
//! let cache = PinnedCache::new();
//!
//! let raw = RawFingerprint {
//!     user_agent: "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101".into(),
//!     screen_width: 1920,
//!     screen_height: 1080,
//!     canvas_fingerprint: "data:image/png;base64,AAAA".into(),
//!     ..RawFingerprint::default()
//! };
//! let param = config.transport_key().encode(&raw)?;
//! let asset = cache.get_or_fetch("/carrier", |_| {
//!     Ok::<_, std::convert::Infallible>(issuer.issue(Some(&param)))
//! })?;
//!
//! let verifier = Verifier::new(config.hasher(), MemoryLedger::new(), ClaimPolicy::default());
//! let request = ClaimRequest {
//!     name: "An".into(),
//!     fingerprint: Some(raw.into()),
//!     asserted_token: Some(extract_token(&asset.body)),
//! };
//! let response = verifier.claim(&request, &mut MemoryCookieJar::new());
//! assert_eq!(response.outcome, Outcome::Success);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

/// Client-side pinned asset cache.
pub mod cache;
/// Token carrier issuance and extraction.
pub mod carrier;
/// Configuration.
pub mod config;
/// Identity cookie.
pub mod cookie;
/// Error types.
pub mod errors;
/// Claim response shaping.
pub mod response;
/// Claim verifier.
pub mod verifier;

pub use cache::PinnedCache;
pub use carrier::{extract_token, CarrierAsset, CarrierIssuer, SENTINEL};
pub use config::{ConfigError, SpinguardConfig};
pub use cookie::{CookieJar, IdentityCookie, MemoryCookieJar};
pub use errors::CoreError;
pub use response::{shape, ClaimResponse, Outcome};
pub use verifier::{
    ClaimPolicy, ClaimRequest, FingerprintEvidence, RejectCause, Verdict, Verifier,
};
