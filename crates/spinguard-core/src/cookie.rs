//! Identity cookie and a minimal cookie jar seam.

use std::collections::HashMap;
use std::fmt;

/// Name of the identity cookie.
pub const COOKIE_NAME: &str = "lucky_spin_fp";

/// Lifetime of the identity cookie: one year, in seconds.
pub const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// `SameSite` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    /// Sent on same-site requests and top-level navigations.
    Lax,
    /// Sent on same-site requests only.
    Strict,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SameSite::Lax => write!(f, "Lax"),
            SameSite::Strict => write!(f, "Strict"),
        }
    }
}

/// The long-lived, script-inaccessible cookie carrying an identity marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityCookie {
    /// Cookie name.
    pub name: &'static str,
    /// Raw cookie value (a token or a caller-supplied marker).
    pub value: String,
    /// `Max-Age` in seconds.
    pub max_age: u64,
    /// `HttpOnly` flag.
    pub http_only: bool,
    /// `Secure` flag.
    pub secure: bool,
    /// `SameSite` attribute.
    pub same_site: SameSite,
    /// `Path` attribute.
    pub path: &'static str,
}

impl IdentityCookie {
    /// Creates the identity cookie for `value`.
    pub fn new(value: impl Into<String>, secure: bool) -> Self {
        Self {
            name: COOKIE_NAME,
            value: value.into(),
            max_age: COOKIE_MAX_AGE_SECS,
            http_only: true,
            secure,
            same_site: SameSite::Lax,
            path: "/",
        }
    }

    /// Renders the value of a `Set-Cookie` header.
    ///
    /// The value is percent-encoded outside the RFC 6265 cookie-octet range,
    /// since deceptive-path writes echo arbitrary caller input.
    pub fn to_header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Path={}",
            self.name,
            encode_value(&self.value),
            self.max_age,
            self.path
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header.push_str(&format!("; SameSite={}", self.same_site));
        header
    }
}

fn encode_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        let plain = matches!(byte, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
            && byte != b'%';
        if plain {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{:02X}", byte));
        }
    }
    out
}

/// Cookie persistence seam.
pub trait CookieJar {
    /// Stores or replaces a cookie.
    fn set(&mut self, cookie: IdentityCookie);

    /// Looks up a cookie by name.
    fn get(&self, name: &str) -> Option<&IdentityCookie>;
}

/// In-memory [`CookieJar`].
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: HashMap<String, IdentityCookie>,
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the identity cookie, if set.
    pub fn identity(&self) -> Option<&str> {
        self.get(COOKIE_NAME).map(|c| c.value.as_str())
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&mut self, cookie: IdentityCookie) {
        self.cookies.insert(cookie.name.to_string(), cookie);
    }

    fn get(&self, name: &str) -> Option<&IdentityCookie> {
        self.cookies.get(name)
    }
}
