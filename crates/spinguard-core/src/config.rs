//! TOML configuration with environment overrides.
//!
//! ```toml
//! [identity]
//! server_secret = "change-me"
//! transport_key = "public-key"
//!
//! [reward]
//! amount = 1000
//!
//! [ledger]
//! path = "claims.sgl"
//! read_mode = "permissive"
//! ```

use bytes::Bytes;
use serde::Deserialize;
use spinguard_canonical::{FingerprintHasher, ServerSecret, TransportKey};
use spinguard_ledger::{JournalLedger, ReadMode, WriteOptions};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::carrier::{CarrierIssuer, DEFAULT_CONTENT_TYPE, DEFAULT_PAYLOAD};
use crate::errors::CoreError;
use crate::verifier::{ClaimPolicy, DEFAULT_MAX_NAME_LEN, DEFAULT_REWARD};

/// Development server secret. Must be overridden in production.
pub const DEFAULT_SERVER_SECRET: &str = "top-secret-spin-key";

/// Development transport key.
pub const DEFAULT_TRANSPORT_KEY: &str = "lucky-spin-uytin-2026";

/// Environment variable overriding `identity.server_secret`.
pub const ENV_SERVER_SECRET: &str = "SPINGUARD_SERVER_SECRET";

/// Environment variable overriding `identity.transport_key`.
pub const ENV_TRANSPORT_KEY: &str = "SPINGUARD_TRANSPORT_KEY";

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config or asset file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpinguardConfig {
    /// Secrets.
    pub identity: IdentityConfig,
    /// Reward policy.
    pub reward: RewardConfig,
    /// Carrier asset.
    pub carrier: CarrierConfig,
    /// Ledger storage.
    pub ledger: LedgerConfig,
    /// Identity cookie.
    pub cookie: CookieConfig,
    /// Log filter.
    pub logging: LoggingConfig,
}

/// `[identity]` section.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    /// Key mixed into every identity token.
    pub server_secret: String,
    /// Public key of the transport obfuscation.
    pub transport_key: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            server_secret: DEFAULT_SERVER_SECRET.to_string(),
            transport_key: DEFAULT_TRANSPORT_KEY.to_string(),
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("server_secret", &"<redacted>")
            .field("transport_key", &self.transport_key)
            .finish()
    }
}

/// `[reward]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewardConfig {
    /// Amount recorded per identity.
    pub amount: u64,
    /// Amount echoed on deceptive rejections.
    pub placeholder: u64,
    /// Longest accepted claimant name.
    pub max_name_len: usize,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            amount: DEFAULT_REWARD,
            placeholder: DEFAULT_REWARD,
            max_name_len: DEFAULT_MAX_NAME_LEN,
        }
    }
}

/// `[carrier]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarrierConfig {
    /// Binary payload file; a built-in image is used when unset.
    pub asset_path: Option<PathBuf>,
    /// Advertised content type.
    pub content_type: String,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            asset_path: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

/// `[ledger]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// Journal file.
    pub path: Option<PathBuf>,
    /// Handling of a torn journal tail.
    pub read_mode: ReadMode,
}

/// `[cookie]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CookieConfig {
    /// Set the `Secure` flag.
    pub secure: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self { secure: true }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl SpinguardConfig {
    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Loads the file if given (defaults otherwise) and applies process
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies secret overrides from `lookup` (normally the environment).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_SERVER_SECRET) {
            self.identity.server_secret = secret;
        }
        if let Some(key) = lookup(ENV_TRANSPORT_KEY) {
            self.identity.transport_key = key;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.reward.max_name_len == 0 {
            return Err(ConfigError::Invalid(
                "reward.max_name_len must be at least 1".to_string(),
            ));
        }
        if self.carrier.content_type.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "carrier.content_type must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns `true` while the development server secret is in use.
    pub fn uses_default_secret(&self) -> bool {
        self.identity.server_secret == DEFAULT_SERVER_SECRET
    }

    /// Logs a warning for each development default still in use.
    pub fn warn_on_defaults(&self) {
        if self.uses_default_secret() {
            warn!(
                env = ENV_SERVER_SECRET,
                "using the development server secret; identity tokens are forgeable"
            );
        }
        if self.identity.transport_key == DEFAULT_TRANSPORT_KEY {
            warn!(env = ENV_TRANSPORT_KEY, "using the development transport key");
        }
    }

    /// Token hasher keyed by the configured secret.
    pub fn hasher(&self) -> FingerprintHasher {
        FingerprintHasher::new(ServerSecret::new(self.identity.server_secret.clone()))
    }

    /// Transport obfuscation key.
    pub fn transport_key(&self) -> TransportKey {
        TransportKey::new(self.identity.transport_key.clone())
    }

    /// Verifier policy.
    pub fn claim_policy(&self) -> ClaimPolicy {
        ClaimPolicy {
            reward: self.reward.amount,
            placeholder_reward: self.reward.placeholder,
            max_name_len: self.reward.max_name_len,
            secure_cookie: self.cookie.secure,
        }
    }

    /// Carrier payload bytes.
    pub fn carrier_payload(&self) -> Result<Bytes, ConfigError> {
        match &self.carrier.asset_path {
            Some(path) => std::fs::read(path)
                .map(Bytes::from)
                .map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                }),
            None => Ok(Bytes::from_static(DEFAULT_PAYLOAD)),
        }
    }

    /// Carrier issuer built from the identity and carrier sections.
    pub fn carrier_issuer(&self) -> Result<CarrierIssuer, CoreError> {
        let issuer = CarrierIssuer::new(self.hasher(), self.transport_key(), self.carrier_payload()?)
            .with_content_type(self.carrier.content_type.clone());
        Ok(issuer)
    }

    /// Opens the journal ledger at `path`, or at `ledger.path` when `None`.
    pub fn open_ledger(&self, path: Option<&Path>) -> Result<JournalLedger, CoreError> {
        let path = path
            .or(self.ledger.path.as_deref())
            .ok_or(CoreError::LedgerPathMissing)?;
        let ledger = JournalLedger::open(path, self.ledger.read_mode, WriteOptions::default())?;
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = SpinguardConfig::from_toml_str("").unwrap();
        assert_eq!(config.reward.amount, 1000);
        assert_eq!(config.reward.placeholder, 1000);
        assert_eq!(config.reward.max_name_len, 100);
        assert_eq!(config.carrier.content_type, "image/jpeg");
        assert_eq!(config.ledger.read_mode, ReadMode::Strict);
        assert!(config.cookie.secure);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn sections_are_parsed() {
        let config = SpinguardConfig::from_toml_str(
            r#"
            [identity]
            server_secret = "prod"

            [reward]
            amount = 5000

            [ledger]
            path = "claims.sgl"
            read_mode = "permissive"

            [cookie]
            secure = false
            "#,
        )
        .unwrap();
        assert_eq!(config.identity.server_secret, "prod");
        assert_eq!(config.identity.transport_key, DEFAULT_TRANSPORT_KEY);
        assert_eq!(config.claim_policy().reward, 5000);
        assert_eq!(config.claim_policy().placeholder_reward, 1000);
        assert!(!config.claim_policy().secure_cookie);
        assert_eq!(config.ledger.path, Some(PathBuf::from("claims.sgl")));
        assert_eq!(config.ledger.read_mode, ReadMode::Permissive);
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = SpinguardConfig::from_toml_str("[reward]\namout = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_name_length_is_invalid() {
        let err = SpinguardConfig::from_toml_str("[reward]\nmax_name_len = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn overrides_replace_secrets() {
        let mut config = SpinguardConfig::default();
        config.apply_overrides(|key| match key {
            ENV_SERVER_SECRET => Some("from-env".to_string()),
            _ => None,
        });
        assert_eq!(config.identity.server_secret, "from-env");
        assert_eq!(config.identity.transport_key, DEFAULT_TRANSPORT_KEY);
    }

    #[test]
    fn secret_is_redacted_in_debug() {
        let rendered = format!("{:?}", SpinguardConfig::default());
        assert!(!rendered.contains(DEFAULT_SERVER_SECRET));
    }

    #[test]
    fn missing_asset_file_is_reported() {
        let config = SpinguardConfig::from_toml_str(
            "[carrier]\nasset_path = \"/nonexistent/spinguard/asset.jpg\"",
        )
        .unwrap();
        assert!(matches!(
            config.carrier_payload(),
            Err(ConfigError::Io { .. })
        ));
    }
}
