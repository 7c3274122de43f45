//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/lexi/config.toml, LEXI_CONFIG, or --config)
//! 3. Environment variables (LEXI_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "LEXI";

/// Default timeout for remote calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite key-value store)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Remote word repository endpoint (optional)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Whether remote sync is enabled
    #[serde(default = "default_sync_enabled")]
    pub sync_enabled: bool,

    /// Timeout for each remote call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Log file used when LEXI_LOG is set (defaults to stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            endpoint_url: None,
            sync_enabled: default_sync_enabled(),
            request_timeout_secs: default_request_timeout_secs(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LEXI_DATA_DIR, LEXI_ENDPOINT_URL, ...)
    /// 2. Config file (~/.config/lexi/config.toml or LEXI_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.reject_zero_timeout();
        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.reject_zero_timeout();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Replace a zero timeout with the default
    fn reject_zero_timeout(&mut self) {
        if self.request_timeout_secs == 0 {
            tracing::warn!(
                "Ignoring request_timeout_secs = 0; using {}",
                DEFAULT_REQUEST_TIMEOUT_SECS
            );
            self.request_timeout_secs = DEFAULT_REQUEST_TIMEOUT_SECS;
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // Empty string clears the endpoint
        if let Ok(val) = std::env::var(format!("{}_ENDPOINT_URL", ENV_PREFIX)) {
            self.endpoint_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_SYNC_ENABLED", ENV_PREFIX)) {
            self.sync_enabled = val.eq_ignore_ascii_case("true") || val == "1";
        }

        if let Ok(val) = std::env::var(format!("{}_REQUEST_TIMEOUT_SECS", ENV_PREFIX)) {
            match val.parse() {
                Ok(0) | Err(_) => tracing::warn!(
                    "Ignoring invalid {}_REQUEST_TIMEOUT_SECS: {}",
                    ENV_PREFIX,
                    val
                ),
                Ok(secs) => self.request_timeout_secs = secs,
            }
        }

        if let Ok(val) = std::env::var(format!("{}_LOG_FILE", ENV_PREFIX)) {
            self.log_file = if val.is_empty() {
                None
            } else {
                Some(PathBuf::from(val))
            };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LEXI_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lexi")
            .join("config.toml")
    }

    /// Get the path to the SQLite key-value database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("lexi.db")
    }

    /// Endpoint to sync against, if sync is enabled and configured
    pub fn active_endpoint(&self) -> Option<&str> {
        if !self.sync_enabled {
            return None;
        }
        self.endpoint_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Timeout applied to every remote call
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexi")
}

fn default_sync_enabled() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "LEXI_DATA_DIR",
        "LEXI_ENDPOINT_URL",
        "LEXI_SYNC_ENABLED",
        "LEXI_REQUEST_TIMEOUT_SECS",
        "LEXI_LOG_FILE",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sync_enabled);
        assert!(config.endpoint_url.is_none());
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert!(config.data_dir.ends_with("lexi"));
        assert!(config.sqlite_path().ends_with("lexi.db"));
    }

    #[test]
    fn test_active_endpoint() {
        let mut config = Config::default();
        assert!(config.active_endpoint().is_none());

        config.endpoint_url = Some("https://example.com/exec".to_string());
        assert_eq!(config.active_endpoint(), Some("https://example.com/exec"));

        config.sync_enabled = false;
        assert!(config.active_endpoint().is_none());
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("LEXI_DATA_DIR", "/tmp/lexi-test");
        config.apply_env_overrides();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/lexi-test"));
    }

    #[test]
    fn test_env_override_sync_enabled() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("LEXI_SYNC_ENABLED", "false");
        config.apply_env_overrides();
        assert!(!config.sync_enabled);

        env::set_var("LEXI_SYNC_ENABLED", "1");
        config.apply_env_overrides();
        assert!(config.sync_enabled);
    }

    #[test]
    fn test_env_override_endpoint_url() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("LEXI_ENDPOINT_URL", "https://example.com/exec");
        config.apply_env_overrides();
        assert_eq!(
            config.endpoint_url,
            Some("https://example.com/exec".to_string())
        );

        // Empty string clears it
        env::set_var("LEXI_ENDPOINT_URL", "");
        config.apply_env_overrides();
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn test_env_override_timeout() {
        let _guard = EnvGuard::new(ENV_VARS);
        let mut config = Config::default();

        env::set_var("LEXI_REQUEST_TIMEOUT_SECS", "3");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout(), Duration::from_secs(3));

        env::set_var("LEXI_REQUEST_TIMEOUT_SECS", "soon");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout_secs, 3);

        env::set_var("LEXI_REQUEST_TIMEOUT_SECS", "0");
        config.apply_env_overrides();
        assert_eq!(config.request_timeout_secs, 3);
    }

    #[test]
    fn test_zero_timeout_in_file_uses_default() {
        let _guard = EnvGuard::new(ENV_VARS);

        let config = Config::load_from_str("request_timeout_secs = 0").unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            endpoint_url = "https://example.com/exec"
            sync_enabled = false
            request_timeout_secs = 5
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(
            config.endpoint_url,
            Some("https://example.com/exec".to_string())
        );
        assert!(!config.sync_enabled);
        assert_eq!(config.request_timeout_secs, 5);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            data_dir: temp_dir.path().join("data"),
            endpoint_url: Some("https://example.com/exec".to_string()),
            sync_enabled: true,
            request_timeout_secs: 7,
            log_file: Some(temp_dir.path().join("lexi.log")),
        };
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.endpoint_url, config.endpoint_url);
        assert_eq!(loaded.request_timeout_secs, 7);
        assert_eq!(loaded.log_file, config.log_file);
        assert!(loaded.data_dir.exists());
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = TempDir::new().unwrap();
        env::set_var("LEXI_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.sync_enabled);
        assert!(config.endpoint_url.is_none());
    }
}
