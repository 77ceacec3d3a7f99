//! Configuration management for the Cloud Storage CLI
//!
//! Handles loading, validating, and persisting the API URL, timeout and
//! stored credentials. Environment overrides are applied on top of the file
//! contents for the current invocation only and are never written back.

use crate::client::ClientConfig;
use crate::error::{CliError, Result};
use log::info;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub mod auth;
pub mod defaults;

pub use auth::AuthConfig;
pub use defaults::*;

/// Main CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API server URL
    #[serde(default = "defaults::default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::default_timeout")]
    pub timeout_secs: u64,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Setting addressable through `config get` / `config set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    /// `api-url`
    ApiUrl,
    /// `access-token`
    AccessToken,
    /// `refresh-token`
    RefreshToken,
    /// `api-key`
    ApiKey,
    /// `timeout`
    Timeout,
}

impl ConfigKey {
    /// Every key, in display order
    pub const ALL: [Self; 5] = [
        Self::ApiUrl,
        Self::AccessToken,
        Self::RefreshToken,
        Self::ApiKey,
        Self::Timeout,
    ];

    /// Canonical kebab-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ApiUrl => "api-url",
            Self::AccessToken => "access-token",
            Self::RefreshToken => "refresh-token",
            Self::ApiKey => "api-key",
            Self::Timeout => "timeout",
        }
    }

    /// Whether values of this key are secrets
    #[must_use]
    pub const fn is_sensitive(self) -> bool {
        matches!(self, Self::AccessToken | Self::RefreshToken | Self::ApiKey)
    }
}

impl FromStr for ConfigKey {
    type Err = CliError;

    fn from_str(key: &str) -> Result<Self> {
        match key {
            "api-url" | "api_url" => Ok(Self::ApiUrl),
            "access-token" | "access_token" => Ok(Self::AccessToken),
            "refresh-token" | "refresh_token" => Ok(Self::RefreshToken),
            "api-key" | "api_key" => Ok(Self::ApiKey),
            "timeout" | "timeout_secs" => Ok(Self::Timeout),
            _ => Err(CliError::UnknownConfigKey(key.to_string())),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Config {
    /// Load configuration from `path`, or the default location when `None`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if no config directory can be determined.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns [`CliError::ConfigRead`] or [`CliError::InvalidConfig`].
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&contents).map_err(|e| CliError::InvalidConfig(e.to_string()))
    }

    /// Save configuration to a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| CliError::DirError {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| CliError::SerializationError(e.to_string()))?;

        fs::write(path, contents).map_err(|e| CliError::ConfigWrite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Config file holds credentials
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, Permissions::from_mode(0o600)).map_err(|e| {
                CliError::ConfigWrite {
                    path: path.to_path_buf(),
                    reason: format!("Failed to set permissions: {e}"),
                }
            })?;
        }

        info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Get the path to the config file
    ///
    /// `$XDG_CONFIG_HOME/cloud-storage/config.toml`, falling back to
    /// `~/.config/cloud-storage/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::NoConfigDir`] if neither location is known.
    pub fn config_path() -> Result<PathBuf> {
        std::env::var_os("XDG_CONFIG_HOME")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(CliError::NoConfigDir)
    }

    /// Apply environment overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`; empty values are ignored.
    #[must_use]
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).filter(|value| !value.is_empty());

        if let Some(url) = value(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = value(ENV_ACCESS_TOKEN) {
            self.auth.access_token = token;
        }
        if let Some(token) = value(ENV_REFRESH_TOKEN) {
            self.auth.refresh_token = token;
        }
        if let Some(key) = value(ENV_API_KEY) {
            self.auth.api_key = key;
        }
        self
    }

    /// Current value of `key` as a string
    #[must_use]
    pub fn get_value(&self, key: ConfigKey) -> String {
        match key {
            ConfigKey::ApiUrl => self.api_url.clone(),
            ConfigKey::AccessToken => self.auth.access_token.clone(),
            ConfigKey::RefreshToken => self.auth.refresh_token.clone(),
            ConfigKey::ApiKey => self.auth.api_key.clone(),
            ConfigKey::Timeout => self.timeout_secs.to_string(),
        }
    }

    /// Set `key` from its string form
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidConfig`] if the value does not fit the key.
    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::ApiUrl => self.api_url = value.to_string(),
            ConfigKey::AccessToken => self.auth.access_token = value.to_string(),
            ConfigKey::RefreshToken => self.auth.refresh_token = value.to_string(),
            ConfigKey::ApiKey => self.auth.api_key = value.to_string(),
            ConfigKey::Timeout => {
                self.timeout_secs = value.parse().map_err(|_| {
                    CliError::InvalidConfig(format!(
                        "timeout must be a whole number of seconds, got '{value}'"
                    ))
                })?;
            }
        }
        self.validate()
    }

    /// Store the tokens returned by a login
    pub fn save_tokens(&mut self, access_token: &str, refresh_token: Option<&str>) {
        self.auth.access_token = access_token.to_string();
        if let Some(refresh_token) = refresh_token {
            self.auth.refresh_token = refresh_token.to_string();
        }
    }

    /// Forget session tokens
    pub fn clear_tokens(&mut self) {
        self.auth.clear_tokens();
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`CliError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(CliError::InvalidConfig("api_url cannot be empty".to_string()));
        }

        Url::parse(&self.api_url).map_err(|e| {
            CliError::InvalidConfig(format!("api_url '{}' is not a valid URL: {e}", self.api_url))
        })?;

        if self.timeout_secs == 0 {
            return Err(CliError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the settings a client is built from
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone(), self.auth.credential())
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            auth: AuthConfig::default(),
        }
    }
}

/// Whether `key` names a secret setting
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    key.parse::<ConfigKey>().is_ok_and(ConfigKey::is_sensitive)
}

/// Mask a secret for display
///
/// Empty values show as `(not set)`, short ones as `***`, anything longer
/// keeps its first and last four characters.
#[must_use]
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    match chars.len() {
        0 => "(not set)".to_string(),
        1..=8 => "***".to_string(),
        len => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[len - 4..].iter().collect();
            format!("{head}...{tail}")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::client::Credential;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.api_url = "https://storage.example.com".to_string();
        config.save_tokens("access-1234567890", Some("refresh-1234567890"));
        config.save_to(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[auth]\napi_key = \"k-1\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, default_api_url());
        assert_eq!(config.auth.api_key, "k-1");
    }

    #[test]
    fn test_malformed_file_is_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_url = [").unwrap();
        assert!(matches!(
            Config::load_from(&path).unwrap_err(),
            CliError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_URL, "https://env.example.com"),
            (ENV_API_KEY, "env-key"),
            (ENV_ACCESS_TOKEN, ""),
        ]);
        let mut base = Config::default();
        base.auth.access_token = "file-token".to_string();

        let config = base.with_overrides_from(|name| env.get(name).map(ToString::to_string));
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.auth.api_key, "env-key");
        assert_eq!(config.auth.access_token, "file-token");
    }

    #[test]
    fn test_config_keys() {
        assert_eq!("api_url".parse::<ConfigKey>().unwrap(), ConfigKey::ApiUrl);
        assert_eq!("api-key".parse::<ConfigKey>().unwrap(), ConfigKey::ApiKey);
        assert!(matches!(
            "colour".parse::<ConfigKey>().unwrap_err(),
            CliError::UnknownConfigKey(_)
        ));
        for key in ConfigKey::ALL {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_get_and_set_values() {
        let mut config = Config::default();
        config.set_value(ConfigKey::RefreshToken, "r-1").unwrap();
        config.set_value(ConfigKey::Timeout, "45").unwrap();
        assert_eq!(config.get_value(ConfigKey::RefreshToken), "r-1");
        assert_eq!(config.get_value(ConfigKey::Timeout), "45");

        assert!(config.set_value(ConfigKey::Timeout, "soon").is_err());
        assert!(config.set_value(ConfigKey::Timeout, "0").is_err());
        assert!(config.set_value(ConfigKey::ApiUrl, "not a url").is_err());
    }

    #[test]
    fn test_sensitive_keys() {
        for key in ["access-token", "access_token", "refresh-token", "api_key"] {
            assert!(is_sensitive_key(key), "{key}");
        }
        assert!(!is_sensitive_key("api-url"));
        assert!(!is_sensitive_key("timeout"));
        assert!(!is_sensitive_key("unknown"));
    }

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value(""), "(not set)");
        assert_eq!(mask_value("short"), "***");
        assert_eq!(mask_value("12345678"), "***");
        assert_eq!(mask_value("123456789"), "1234...6789");
        assert_eq!(mask_value("eyJhbGciOiJIUzI1NiJ9.payload"), "eyJh...load");
    }

    #[test]
    fn test_client_config() {
        let mut config = Config::default();
        config.auth.access_token = "t".to_string();
        config.timeout_secs = 5;

        let client = config.client_config();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.credential(), &Credential::Bearer("t".to_string()));
        assert_eq!(client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_clear_tokens() {
        let mut config = Config::default();
        config.save_tokens("a", Some("r"));
        config.clear_tokens();
        assert!(!config.auth.is_authenticated());
    }
}
