//! Stateless plausibility heuristics for raw fingerprints.
//!
//! These are calibrated against common phone, tablet and desktop profiles.
//! They catch fabricated or malformed payloads, not a determined forger.

use regex::Regex;
use std::fmt;

use crate::fingerprint::RawFingerprint;

/// Minimum user-agent length in characters.
pub const MIN_USER_AGENT_LEN: usize = 20;
/// Minimum canvas signature length in characters.
pub const MIN_CANVAS_LEN: usize = 10;
/// Smallest plausible screen side in pixels.
pub const MIN_SCREEN_SIDE: u32 = 300;
/// Largest plausible screen side in pixels.
pub const MAX_SCREEN_SIDE: u32 = 8000;
/// Narrowest accepted width:height ratio.
pub const MIN_ASPECT_RATIO: f64 = 0.4;
/// Widest accepted width:height ratio.
pub const MAX_ASPECT_RATIO: f64 = 3.0;
/// Widest screen a handheld user agent may report.
pub const HANDHELD_MAX_WIDTH: u32 = 1200;

/// Which plausibility rule rejected a fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionRule {
    /// User agent too short to be a real browser.
    UserAgentTooShort,
    /// Canvas signature absent or truncated.
    CanvasMissing,
    /// A screen side is below the minimum.
    ScreenTooSmall,
    /// Width:height ratio outside the accepted band.
    AspectRatio,
    /// A screen side is above the maximum.
    ScreenTooLarge,
    /// Handheld user agent reporting a desktop-scale width.
    HandheldDesktopWidth,
}

impl RejectionRule {
    /// Stable code for logs.
    pub fn code(self) -> &'static str {
        match self {
            RejectionRule::UserAgentTooShort => "USER_AGENT_TOO_SHORT",
            RejectionRule::CanvasMissing => "CANVAS_MISSING",
            RejectionRule::ScreenTooSmall => "SCREEN_TOO_SMALL",
            RejectionRule::AspectRatio => "ASPECT_RATIO",
            RejectionRule::ScreenTooLarge => "SCREEN_TOO_LARGE",
            RejectionRule::HandheldDesktopWidth => "HANDHELD_DESKTOP_WIDTH",
        }
    }
}

/// A failed plausibility check. The reason is for server-side diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Rule that fired.
    pub rule: RejectionRule,
    /// Human-readable reason.
    pub reason: &'static str,
    /// Whether the payload looks fabricated rather than merely unusual.
    pub implausible: bool,
}

impl Rejection {
    fn implausible(rule: RejectionRule, reason: &'static str) -> Self {
        Self {
            rule,
            reason,
            implausible: true,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule.code(), self.reason)
    }
}

impl std::error::Error for Rejection {}

/// Checks a raw fingerprint against the plausibility rules.
///
/// Rules run in a fixed order and the first failure short-circuits.
pub fn validate(raw: &RawFingerprint) -> Result<(), Rejection> {
    if raw.user_agent.chars().count() < MIN_USER_AGENT_LEN {
        return Err(Rejection::implausible(
            RejectionRule::UserAgentTooShort,
            "user agent is too short to be a browser",
        ));
    }
    if raw.canvas_fingerprint.chars().count() < MIN_CANVAS_LEN {
        return Err(Rejection::implausible(
            RejectionRule::CanvasMissing,
            "canvas signature is missing or truncated",
        ));
    }

    let (width, height) = (raw.screen_width, raw.screen_height);
    if width < MIN_SCREEN_SIDE || height < MIN_SCREEN_SIDE {
        return Err(Rejection::implausible(
            RejectionRule::ScreenTooSmall,
            "screen is smaller than any real device",
        ));
    }

    let ratio = f64::from(width) / f64::from(height);
    if !(MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio) {
        return Err(Rejection::implausible(
            RejectionRule::AspectRatio,
            "screen aspect ratio is implausible",
        ));
    }

    if width > MAX_SCREEN_SIDE || height > MAX_SCREEN_SIDE {
        return Err(Rejection::implausible(
            RejectionRule::ScreenTooLarge,
            "screen is larger than any real display",
        ));
    }

    let handheld = Regex::new(r"(?i)iPhone|Android|iPad").expect("invalid regex");
    if handheld.is_match(&raw.user_agent) && width > HANDHELD_MAX_WIDTH {
        return Err(Rejection::implausible(
            RejectionRule::HandheldDesktopWidth,
            "handheld user agent with a desktop-scale screen",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> RawFingerprint {
        RawFingerprint {
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2_1 like Mac OS X) AppleWebKit/605.1.15"
                .into(),
            platform: "iPhone".into(),
            language: "vi-VN".into(),
            time_zone: "Asia/Ho_Chi_Minh".into(),
            screen_width: 390,
            screen_height: 844,
            color_depth: 24,
            hardware_concurrency: Some(4),
            device_memory: None,
            max_touch_points: 5,
            canvas_fingerprint: "data:image/png;base64,iVBORw0KGgo".into(),
        }
    }

    fn rule_of(raw: &RawFingerprint) -> Option<RejectionRule> {
        validate(raw).err().map(|r| r.rule)
    }

    #[test]
    fn accepts_ordinary_phone() {
        assert!(validate(&phone()).is_ok());
    }

    #[test]
    fn rejects_short_user_agent() {
        let raw = RawFingerprint {
            user_agent: "curl/8.4.0".into(),
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::UserAgentTooShort));
    }

    #[test]
    fn rejects_missing_canvas() {
        let raw = RawFingerprint {
            canvas_fingerprint: "no-canvas".into(),
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::CanvasMissing));
    }

    #[test]
    fn rejects_tiny_screen() {
        let raw = RawFingerprint {
            screen_width: 299,
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::ScreenTooSmall));
    }

    #[test]
    fn rejects_extreme_aspect_ratio() {
        let raw = RawFingerprint {
            screen_width: 300,
            screen_height: 800,
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::AspectRatio));
    }

    #[test]
    fn rejects_giant_screen() {
        let raw = RawFingerprint {
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".into(),
            screen_width: 9000,
            screen_height: 5000,
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::ScreenTooLarge));
    }

    #[test]
    fn rejects_handheld_with_desktop_width() {
        let raw = RawFingerprint {
            screen_width: 1920,
            screen_height: 1080,
            ..phone()
        };
        assert_eq!(rule_of(&raw), Some(RejectionRule::HandheldDesktopWidth));
    }

    #[test]
    fn desktop_agent_may_use_desktop_width() {
        let raw = RawFingerprint {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into(),
            screen_width: 1920,
            screen_height: 1080,
            ..phone()
        };
        assert!(validate(&raw).is_ok());
    }

    #[test]
    fn rejections_are_marked_implausible() {
        let raw = RawFingerprint::default();
        let rejection = validate(&raw).unwrap_err();
        assert!(rejection.implausible);
        assert!(rejection.to_string().starts_with("USER_AGENT_TOO_SHORT"));
    }
}
