use serde::{Deserialize, Serialize};

/// Client-observed device signals, untrusted and never persisted.
///
/// Every field defaults when absent so that a structurally odd payload still
/// reaches the [`validator`](crate::validator) instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawFingerprint {
    /// Full user-agent string.
    pub user_agent: String,
    /// Navigator platform string (e.g. `MacIntel`, `Linux armv8l`).
    pub platform: String,
    /// Language tag (e.g. `en-US`).
    pub language: String,
    /// IANA time zone (e.g. `Asia/Ho_Chi_Minh`).
    pub time_zone: String,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Screen color depth in bits.
    pub color_depth: u32,
    /// Logical CPU count, when the browser exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_concurrency: Option<u32>,
    /// Device memory estimate in GiB, when the browser exposes it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_memory: Option<f64>,
    /// Maximum simultaneous touch points.
    pub max_touch_points: u32,
    /// Opaque rendering-derived canvas signature.
    pub canvas_fingerprint: String,
}

/// Normalized fingerprint used as hash input.
///
/// Derived deterministically from a [`RawFingerprint`] by the
/// [`Canonicalizer`](crate::Canonicalizer); benign variation such as screen
/// orientation or browser patch level does not change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalFingerprint {
    /// Coarsened system-info segment of the user agent.
    pub system_info: String,
    /// Lower-cased platform.
    pub platform: String,
    /// Lower-cased language tag.
    pub language: String,
    /// Trimmed time zone.
    pub time_zone: String,
    /// Orientation-independent resolution as `(short side, long side)`.
    #[serde(with = "resolution")]
    pub resolution: (u32, u32),
    /// Color depth.
    pub color_depth: u32,
    /// CPU count, 0 when unknown.
    pub hardware_concurrency: u32,
    /// Device memory rendered as a decimal string, `"0"` when unknown.
    pub device_memory: String,
    /// Maximum touch points.
    pub max_touch_points: u32,
    /// Canvas signature, verbatim.
    pub canvas_fingerprint: String,
}

/// Serializes the resolution pair as `"{short}x{long}"`.
mod resolution {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &(u32, u32), serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}x{}", value.0, value.1))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(u32, u32), D::Error> {
        let s = String::deserialize(deserializer)?;
        let (short, long) = s
            .split_once('x')
            .ok_or_else(|| D::Error::custom(format!("malformed resolution '{}'", s)))?;
        let short = short.parse().map_err(D::Error::custom)?;
        let long = long.parse().map_err(D::Error::custom)?;
        Ok((short, long))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn raw_fingerprint_tolerates_missing_fields() {
        let raw: RawFingerprint = serde_json::from_value(json!({
            "userAgent": "Mozilla/5.0",
            "screenWidth": 390
        }))
        .unwrap();
        assert_eq!(raw.user_agent, "Mozilla/5.0");
        assert_eq!(raw.screen_width, 390);
        assert_eq!(raw.screen_height, 0);
        assert!(raw.hardware_concurrency.is_none());
        assert!(raw.canvas_fingerprint.is_empty());
    }

    #[test]
    fn resolution_serializes_as_pair_string() {
        let canonical = CanonicalFingerprint {
            system_info: "X11; Linux x86_64".into(),
            platform: "linux x86_64".into(),
            language: "en-us".into(),
            time_zone: "UTC".into(),
            resolution: (1080, 1920),
            color_depth: 24,
            hardware_concurrency: 8,
            device_memory: "8".into(),
            max_touch_points: 0,
            canvas_fingerprint: "data:image/png;base64,AAAA".into(),
        };
        let value = serde_json::to_value(&canonical).unwrap();
        assert_eq!(value["resolution"], "1080x1920");

        let restored: CanonicalFingerprint = serde_json::from_value(value).unwrap();
        assert_eq!(restored.resolution, (1080, 1920));
    }
}
