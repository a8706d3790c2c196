use canonical_json::to_string;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::fingerprint::{CanonicalFingerprint, RawFingerprint};

/// Error returned when canonical serialization fails.
#[derive(thiserror::Error, Debug)]
pub enum CanonicalizationError {
    /// The canonical record could not be converted to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Generic failure from the canonical JSON encoder.
    #[error("other error: {0}")]
    Other(String),
}

/// Canonicalizer that maps raw device signals to a stable record and
/// emits deterministic bytes for hashing.
#[derive(Debug, Clone, Default)]
pub struct Canonicalizer;

impl Canonicalizer {
    /// Creates a new canonicalizer.
    pub fn new() -> Self {
        Self
    }

    /// Normalizes a raw fingerprint.
    ///
    /// Pure and total; callers are expected to have run
    /// [`validate`](crate::validate) first, but nothing here panics on
    /// unvalidated input.
    pub fn canonicalize(&self, raw: &RawFingerprint) -> CanonicalFingerprint {
        let (w, h) = (raw.screen_width, raw.screen_height);
        CanonicalFingerprint {
            system_info: coarsen_system_info(&raw.user_agent),
            platform: raw.platform.trim().to_lowercase(),
            language: raw.language.trim().to_lowercase(),
            time_zone: raw.time_zone.trim().to_string(),
            resolution: (w.min(h), w.max(h)),
            color_depth: raw.color_depth,
            hardware_concurrency: raw.hardware_concurrency.unwrap_or(0),
            device_memory: format_device_memory(raw.device_memory),
            max_touch_points: raw.max_touch_points,
            canvas_fingerprint: raw.canvas_fingerprint.clone(),
        }
    }

    /// Produces RFC 8785 canonical bytes (sorted keys, numbers as strings).
    pub fn to_canonical_bytes(
        &self,
        canonical: &CanonicalFingerprint,
    ) -> Result<Vec<u8>, CanonicalizationError> {
        let mut value = serde_json::to_value(canonical)
            .map_err(|e| CanonicalizationError::Serialization(e.to_string()))?;

        // Numbers are hashed in their decimal string form
        stringify_numbers(&mut value);

        let canonical =
            to_string(&value).map_err(|err| CanonicalizationError::Other(err.to_string()))?;
        Ok(canonical.into_bytes())
    }
}

/// Extracts the parenthesized system segment of a user agent and collapses
/// build numbers down to `major.minor`.
///
/// `"iPhone; CPU iPhone OS 15_4_1 like Mac OS X"` becomes
/// `"iPhone; CPU iPhone OS 15.4 like Mac OS X"`.
pub fn coarsen_system_info(user_agent: &str) -> String {
    let system = Regex::new(r"\(([^)]+)\)").expect("invalid regex");
    let segment = system
        .captures(user_agent)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(user_agent);

    let versions = Regex::new(r"[0-9._]{3,}").expect("invalid regex");
    versions
        .replace_all(segment, |caps: &Captures| {
            let run = &caps[0];
            let parts: Vec<&str> = run.split(|c| c == '.' || c == '_').collect();
            if parts.len() > 2 {
                parts[..2].join(".")
            } else {
                run.to_string()
            }
        })
        .trim()
        .to_string()
}

fn format_device_memory(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => {
            if v.fract() == 0.0 {
                format!("{}", v as u64)
            } else {
                format!("{}", v)
            }
        }
        _ => "0".to_string(),
    }
}

/// Recursively converts all JSON numbers into strings.
fn stringify_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            let s = n.to_string();
            *value = Value::String(s);
        }
        Value::Array(arr) => {
            for v in arr {
                stringify_numbers(v);
            }
        }
        Value::Object(map) => {
            for v in map.values_mut() {
                stringify_numbers(v);
            }
        }
        _ => {}
    }
}
