//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pt_core::Retry;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Enabled providers, in registration order.
    pub providers: Vec<String>,

    /// HTTP timeout for a single provider request, in seconds.
    pub request_timeout_secs: u64,

    /// Retry policy for provider lookups.
    pub retry: RetryConfig,
}

/// Retry settings for provider lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per lookup, including the first.
    pub max_attempts: u32,

    /// Pause between failed attempts, in milliseconds.
    pub delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: pt_providers::PROVIDER_NAMES
                .iter()
                .map(ToString::to_string)
                .collect(),
            request_timeout_secs: pt_providers::DEFAULT_TIMEOUT.as_secs(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let retry = Retry::default();
        Self {
            max_attempts: retry.max_attempts(),
            delay_ms: 0,
        }
    }
}

impl RetryConfig {
    /// Builds the retry policy these settings describe.
    pub const fn policy(&self) -> Retry {
        Retry::new(self.max_attempts).with_delay(Duration::from_millis(self.delay_ms))
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PT_*, nested keys split on `__`)
        figment = figment.merge(Env::prefixed("PT_").split("__"));

        figment.extract()
    }

    /// HTTP timeout for provider requests.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Returns the platform-specific config directory for pt.
///
/// On Linux: `~/.config/pt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pt"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_enables_all_providers() {
        let config = Config::default();
        assert_eq!(config.providers, vec!["albanian-post", "cainiao"]);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.delay_ms, 0);
    }

    #[test]
    fn retry_policy_reflects_settings() {
        let retry = RetryConfig {
            max_attempts: 5,
            delay_ms: 250,
        }
        .policy();
        assert_eq!(retry.max_attempts(), 5);
        assert_eq!(retry.delay(), Duration::from_millis(250));
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
providers = ["cainiao"]

[retry]
max_attempts = 1
"#
        )
        .unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.providers, vec!["cainiao"]);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.delay_ms, 0);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_dirs_config_path_ends_with_pt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "pt");
    }
}
