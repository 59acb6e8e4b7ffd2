//! Application and test configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$WEBMAIL_CONFIG` (environment variable)
//! 2. `~/.config/webmail/config.toml` (Linux/macOS)
//!    `%APPDATA%\webmail\config.toml` (Windows)
//! 3. Built-in defaults
//!
//! Account and proxy secrets may be left empty; they are then requested from a
//! [`CredentialProvider`] when needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::{self, CredentialProvider, Credentials};
use crate::error::{MailError, Result};
use crate::model::address::EmailAddress;
use crate::parser::mime::DEFAULT_PREVIEW_CHARS;

/// Context string used when prompting for the webmail account.
pub const ACCOUNT_PROMPT: &str = "Webmail login";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Webmail account.
    pub account: AccountConfig,
    /// HTTP proxy in front of the webmail service.
    pub proxy: ProxyConfig,
    /// Values used by live tests.
    pub test: TestConfig,
    /// Local mailbox directories.
    pub spool: SpoolConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// `strftime` format string for dates in listings.
    pub date_format: String,
    /// Maximum characters in a message preview.
    pub preview_length: usize,
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Login name, usually the account address.
    pub user: String,
    /// Password. Empty means "ask".
    pub pass: String,
    /// Display name used on composed messages.
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Proxy host. Empty disables the proxy.
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    /// Address that live send tests deliver to.
    pub recipient: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpoolConfig {
    /// Directory of `.eml` files read by `list`.
    pub inbox: Option<PathBuf>,
    /// Directory composed messages are written to.
    pub outbox: Option<PathBuf>,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            date_format: "%Y-%m-%d %H:%M".to_string(),
            preview_length: DEFAULT_PREVIEW_CHARS,
            cache_dir: None,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8080,
            user: String::new(),
            pass: String::new(),
        }
    }
}

// ── Credentials and derived values ──────────────────────────────

impl Config {
    /// Account credentials: the stored pair when both user and password are
    /// set, otherwise whatever `provider` returns for [`ACCOUNT_PROMPT`].
    ///
    /// Blank answers are rejected with [`MailError::Credentials`]. Every call
    /// consults `provider`; pass a [`CachedProvider`] to prompt only once.
    ///
    /// [`CachedProvider`]: crate::credentials::CachedProvider
    pub fn account_credentials(&self, provider: &dyn CredentialProvider) -> Result<Credentials> {
        let AccountConfig { user, pass, .. } = &self.account;
        let found = if user.is_empty() || pass.is_empty() {
            tracing::debug!("Account credentials incomplete, asking provider");
            provider.credentials(ACCOUNT_PROMPT)?
        } else {
            Credentials::new(user.as_str(), pass.as_str())
        };
        credentials::validated(ACCOUNT_PROMPT, found)
    }

    /// `true` if a proxy host is configured.
    pub fn use_proxy(&self) -> bool {
        !self.proxy.host.trim().is_empty()
    }

    /// Proxy credentials.
    ///
    /// `None` when no proxy is in use or the proxy needs no login. When a user
    /// is set without a password, `provider` is asked. A password without a
    /// user is a [`MailError::Credentials`] error, as are blank answers.
    pub fn proxy_credentials(
        &self,
        provider: &dyn CredentialProvider,
    ) -> Result<Option<Credentials>> {
        if !self.use_proxy() {
            return Ok(None);
        }
        let ProxyConfig { host, user, pass, .. } = &self.proxy;
        let context = format!("Proxy login ({host})");
        let found = match (user.is_empty(), pass.is_empty()) {
            (true, true) => return Ok(None),
            (false, true) => provider.credentials(&context)?,
            _ => Credentials::new(user.as_str(), pass.as_str()),
        };
        credentials::validated(&context, found).map(Some)
    }

    /// The configured account as a sender address, if a user is set.
    pub fn sender_address(&self) -> Option<EmailAddress> {
        let user = self.account.user.trim();
        if user.is_empty() {
            return None;
        }
        Some(match &self.account.display_name {
            Some(name) => EmailAddress::with_name(name.as_str(), user),
            None => EmailAddress::new(user),
        })
    }

    /// Recipient for live send tests, if configured.
    pub fn test_recipient(&self) -> Option<EmailAddress> {
        let raw = self.test.recipient.trim();
        (!raw.is_empty()).then(|| EmailAddress::parse(raw))
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded config");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to load config, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Load configuration from an explicit file, failing on any error.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MailError::FileNotFound(path.to_path_buf())
        } else {
            MailError::io(path, e)
        }
    })?;
    toml::from_str::<Config>(&contents).map_err(|e| MailError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Write `config` to `path` as TOML, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MailError::io(parent, e))?;
    }
    let contents = toml::to_string_pretty(config).map_err(|e| MailError::Config {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    std::fs::write(path, contents).map_err(|e| MailError::io(path, e))?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("WEBMAIL_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("webmail").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("webmail")
}

/// Log file inside [`cache_dir`].
pub fn log_file_path(config: &Config) -> PathBuf {
    cache_dir(config).join(LOG_FILE_NAME)
}

const LOG_FILE_NAME: &str = "webmail.log";

/// Inbox directory: configured, or `<data dir>/webmail/inbox`.
pub fn inbox_dir(config: &Config) -> PathBuf {
    config
        .spool
        .inbox
        .clone()
        .unwrap_or_else(|| data_dir().join("inbox"))
}

/// Outbox directory: configured, or `<data dir>/webmail/outbox`.
pub fn outbox_dir(config: &Config) -> PathBuf {
    config
        .spool
        .outbox
        .clone()
        .unwrap_or_else(|| data_dir().join("outbox"))
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("webmail")
}
