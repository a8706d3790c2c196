//! Obfuscated transport encoding for the carrier request parameter.
//!
//! The fingerprint is serialized with short keys, XOR-ed byte-wise with a
//! public key and encoded as base64url without padding. The key ships to
//! every client, so this deters casual tampering and nothing more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::fingerprint::RawFingerprint;

/// Error returned when a transport parameter cannot be decoded.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// Not valid base64url.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// De-obfuscated bytes are not UTF-8.
    #[error("invalid UTF-8 in payload: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    /// De-obfuscated payload is not a fingerprint record.
    #[error("invalid fingerprint payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Public obfuscation key shared with clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportKey(Vec<u8>);

impl TransportKey {
    /// Creates a key from its string form.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().into_bytes())
    }

    fn apply(&self, data: &mut [u8]) {
        if self.0.is_empty() {
            return;
        }
        for (byte, k) in data.iter_mut().zip(self.0.iter().cycle()) {
            *byte ^= k;
        }
    }

    /// Encodes a fingerprint into an opaque request parameter.
    pub fn encode(&self, raw: &RawFingerprint) -> Result<String, TransportError> {
        let mut bytes = serde_json::to_vec(&WireFingerprint::from(raw))?;
        self.apply(&mut bytes);
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decodes a request parameter produced by [`encode`](Self::encode).
    ///
    /// Trailing `=` padding is tolerated.
    pub fn decode(&self, param: &str) -> Result<RawFingerprint, TransportError> {
        let mut bytes = URL_SAFE_NO_PAD.decode(param.trim().trim_end_matches('='))?;
        self.apply(&mut bytes);
        let json = String::from_utf8(bytes)?;
        let wire: WireFingerprint = serde_json::from_str(&json)?;
        Ok(wire.into())
    }
}

/// Short-key wire form of a [`RawFingerprint`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WireFingerprint {
    ua: String,
    pt: String,
    lg: String,
    tz: String,
    sw: u32,
    sh: u32,
    cd: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    hc: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dm: Option<f64>,
    mt: u32,
    cf: String,
}

impl From<&RawFingerprint> for WireFingerprint {
    fn from(raw: &RawFingerprint) -> Self {
        Self {
            ua: raw.user_agent.clone(),
            pt: raw.platform.clone(),
            lg: raw.language.clone(),
            tz: raw.time_zone.clone(),
            sw: raw.screen_width,
            sh: raw.screen_height,
            cd: raw.color_depth,
            hc: raw.hardware_concurrency,
            dm: raw.device_memory,
            mt: raw.max_touch_points,
            cf: raw.canvas_fingerprint.clone(),
        }
    }
}

impl From<WireFingerprint> for RawFingerprint {
    fn from(wire: WireFingerprint) -> Self {
        Self {
            user_agent: wire.ua,
            platform: wire.pt,
            language: wire.lg,
            time_zone: wire.tz,
            screen_width: wire.sw,
            screen_height: wire.sh,
            color_depth: wire.cd,
            hardware_concurrency: wire.hc,
            device_memory: wire.dm,
            max_touch_points: wire.mt,
            canvas_fingerprint: wire.cf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawFingerprint {
        RawFingerprint {
            user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36".into(),
            platform: "Linux armv8l".into(),
            language: "en-US".into(),
            time_zone: "Europe/Berlin".into(),
            screen_width: 412,
            screen_height: 915,
            color_depth: 24,
            hardware_concurrency: Some(8),
            device_memory: Some(8.0),
            max_touch_points: 5,
            canvas_fingerprint: "data:image/png;base64,iVBORw0KGgoAAAANSUhEUg".into(),
        }
    }

    #[test]
    fn decode_reverses_encode() {
        let key = TransportKey::new("public-key");
        let encoded = key.encode(&sample()).unwrap();
        assert!(!encoded.contains('='));
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(key.decode(&encoded).unwrap(), sample());
    }

    #[test]
    fn encoded_form_hides_plain_fields() {
        let key = TransportKey::new("public-key");
        let encoded = key.encode(&sample()).unwrap();
        let plain = URL_SAFE_NO_PAD.decode(&encoded).unwrap();
        assert!(!String::from_utf8_lossy(&plain).contains("Pixel 8"));
    }

    #[test]
    fn wrong_key_fails_to_decode() {
        let encoded = TransportKey::new("public-key").encode(&sample()).unwrap();
        assert!(TransportKey::new("other-key").decode(&encoded).is_err());
    }

    #[test]
    fn garbage_is_an_error_not_a_panic() {
        let key = TransportKey::new("public-key");
        assert!(matches!(key.decode("***"), Err(TransportError::Base64(_))));
        assert!(key.decode("").is_err());
    }
}
