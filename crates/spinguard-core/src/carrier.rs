//! Token carrier: an opaque binary asset with the identity token appended.
//!
//! The issuing side never fails. A missing, undecodable or implausible
//! fingerprint parameter yields an asset of the same shape whose trailing
//! bytes are [`SENTINEL`] instead of a token, so the response does not reveal
//! why issuance failed.

use bytes::{BufMut, Bytes, BytesMut};
use spinguard_canonical::token::{is_token_format, TOKEN_HEX_LEN};
use spinguard_canonical::{FingerprintHasher, TransportKey};
use tracing::debug;

/// Trailing marker embedded when no token could be derived.
pub const SENTINEL: &str = "INVALID_SESSION";

/// Default content type of the carrier asset.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Network caching policy of every carrier response.
pub const CACHE_CONTROL: &str = "no-store";

/// Minimal JFIF image used when no asset file is configured.
pub const DEFAULT_PAYLOAD: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

/// A carrier response as handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierAsset {
    /// HTTP status; always 200.
    pub status: u16,
    /// Payload followed by the token bytes or the sentinel.
    pub body: Bytes,
    /// `Content-Type` header value.
    pub content_type: String,
    /// `Cache-Control` header value.
    pub cache_control: &'static str,
}

impl CarrierAsset {
    /// Response headers in emission order.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Content-Type", self.content_type.clone()),
            ("Cache-Control", self.cache_control.to_string()),
        ]
    }

    /// The value a client would extract from this asset.
    pub fn embedded_token(&self) -> String {
        extract_token(&self.body)
    }
}

/// Server side of the carrier.
#[derive(Debug, Clone)]
pub struct CarrierIssuer {
    hasher: FingerprintHasher,
    transport: TransportKey,
    payload: Bytes,
    content_type: String,
}

impl CarrierIssuer {
    /// Creates an issuer appending tokens to `payload`.
    pub fn new(hasher: FingerprintHasher, transport: TransportKey, payload: impl Into<Bytes>) -> Self {
        Self {
            hasher,
            transport,
            payload: payload.into(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }

    /// Overrides the advertised content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Builds the asset for an optional encoded fingerprint parameter.
    pub fn issue(&self, param: Option<&str>) -> CarrierAsset {
        let trailer = match param {
            None => {
                debug!(embedded = "sentinel", reason = "missing parameter", "carrier issued");
                SENTINEL.to_string()
            }
            Some(param) => match self.derive_token(param) {
                Ok(token) => {
                    debug!(embedded = "token", "carrier issued");
                    token
                }
                Err(reason) => {
                    debug!(embedded = "sentinel", reason = %reason, "carrier issued");
                    SENTINEL.to_string()
                }
            },
        };

        let mut body = BytesMut::with_capacity(self.payload.len() + trailer.len());
        body.put_slice(&self.payload);
        body.put_slice(trailer.as_bytes());

        CarrierAsset {
            status: 200,
            body: body.freeze(),
            content_type: self.content_type.clone(),
            cache_control: CACHE_CONTROL,
        }
    }

    fn derive_token(&self, param: &str) -> Result<String, String> {
        let raw = self.transport.decode(param).map_err(|e| e.to_string())?;
        let token = self.hasher.identify(&raw).map_err(|e| e.to_string())?;
        Ok(token.as_str().to_string())
    }
}

/// Reads the identity marker from the tail of a carrier body.
///
/// Bytes are read as Latin-1. If the last 64 bytes form a token they are
/// returned; otherwise the last `SENTINEL.len()` bytes are, or the whole body
/// when it is shorter than that.
pub fn extract_token(body: &[u8]) -> String {
    let tail = &body[body.len().saturating_sub(TOKEN_HEX_LEN)..];
    let candidate = latin1(tail);
    if is_token_format(&candidate) {
        return candidate;
    }
    latin1(&body[body.len().saturating_sub(SENTINEL.len())..])
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
