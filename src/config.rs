//! Configuration loader and validator for the outreach CRM service.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub auth: Auth,
    pub mailer: Mailer,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Shared-passphrase login and token signing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Auth {
    /// Hex-encoded SHA-256 digest of the shared passphrase.
    pub passphrase_hash: String,
    pub token_secret: String,
    pub token_ttl_days: i64,
}

/// Outgoing-mail relay settings. `from_email`/`app_password` may be left
/// empty; sending then fails with a distinct "not configured" error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mailer {
    pub relay_url: String,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub app_password: String,
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.app.data_dir)
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty"));
    }

    if cfg.auth.passphrase_hash.trim().len() != 64
        || !cfg
            .auth
            .passphrase_hash
            .trim()
            .chars()
            .all(|c| c.is_ascii_hexdigit())
    {
        return Err(ConfigError::Invalid(
            "auth.passphrase_hash must be a hex-encoded SHA-256 digest",
        ));
    }
    if cfg.auth.token_secret.trim().is_empty() {
        return Err(ConfigError::Invalid("auth.token_secret must be non-empty"));
    }
    if cfg.auth.token_ttl_days <= 0 {
        return Err(ConfigError::Invalid("auth.token_ttl_days must be > 0"));
    }

    if cfg.mailer.relay_url.trim().is_empty() {
        return Err(ConfigError::Invalid("mailer.relay_url must be non-empty"));
    }
    // from_email / app_password may stay empty: the mailer reports itself
    // unconfigured at send time.

    Ok(())
}

/// Example YAML document, used by docs and tests.
pub fn example() -> &'static str {
    // sha256("charioteer") -- local development passphrase only.
    r#"app:
  data_dir: "./data"

auth:
  passphrase_hash: "aab96129975a027183c050878cbb6beb50fb553a805b694bc6b08899c8b833dc"
  token_secret: "dev-secret-change-in-production"
  token_ttl_days: 7

mailer:
  relay_url: "https://mail.example.com/api/send"
  from_email: ""
  app_password: ""
"#
}
