//! Configuration management for Magpie
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (MAGPIE_*)
//! 3. Config file (~/.config/magpie/config.toml)
//! 4. Default values

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Extraction service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Base URL of the structured-extraction service
    pub base_url: String,

    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Retry policy for transient extraction failures
    pub retry: RetryConfig,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.firecrawl.dev".to_string(),
            timeout: Duration::from_secs(90),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry policy applied to transient extraction failures
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: usize,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    pub min_delay: Duration,

    /// Multiplier applied to the delay after each failed attempt
    pub backoff_factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
        }
    }
}

/// Raw-diff retrieval configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Host prefix for raw pull-request diffs
    ///
    /// The diff URL is `{host}/{owner}/{repo}/pull/{number}.diff`.
    pub host: String,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            host: "https://patch-diff.githubusercontent.com/raw".to_string(),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Extraction service configuration
    pub extractor: ExtractorConfig,

    /// Raw-diff retrieval configuration
    pub diff: DiffConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/magpie/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("magpie").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - MAGPIE_EXTRACTOR_URL: Base URL of the extraction service
    /// - MAGPIE_DIFF_HOST: Host prefix for raw diffs
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(base_url) = std::env::var("MAGPIE_EXTRACTOR_URL") {
            self.extractor.base_url = base_url;
        }

        if let Ok(host) = std::env::var("MAGPIE_DIFF_HOST") {
            self.diff.host = host;
        }

        self
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, extractor_url: Option<String>) -> Self {
        if let Some(url) = extractor_url {
            self.extractor.base_url = url;
        }

        self
    }

    /// Load configuration with all overrides applied
    ///
    /// Priority: CLI > env > config file > defaults
    pub fn load_with_overrides(extractor_url: Option<String>) -> Result<Self> {
        Ok(Self::load()?
            .with_env_overrides()
            .with_cli_overrides(extractor_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extractor.base_url, "https://api.firecrawl.dev");
        assert_eq!(config.extractor.retry.max_attempts, 3);
        assert!(config.diff.host.ends_with("/raw"));
    }

    #[test]
    fn test_cli_overrides() {
        let config =
            Config::default().with_cli_overrides(Some("http://localhost:3002".to_string()));

        assert_eq!(config.extractor.base_url, "http://localhost:3002");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[extractor]
base_url = "https://extract.internal.example"
timeout = "30s"

[extractor.retry]
max_attempts = 5
min_delay = "250ms"

[diff]
host = "https://diffs.internal.example/raw"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.extractor.base_url, "https://extract.internal.example");
        assert_eq!(config.extractor.timeout, Duration::from_secs(30));
        assert_eq!(config.extractor.retry.max_attempts, 5);
        assert_eq!(config.extractor.retry.min_delay, Duration::from_millis(250));
        assert_eq!(config.diff.host, "https://diffs.internal.example/raw");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[extractor.retry]
max_attempts = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        // unspecified fields should use defaults
        assert_eq!(config.extractor.base_url, "https://api.firecrawl.dev");
        assert_eq!(config.extractor.retry.max_attempts, 1);
        assert_eq!(config.extractor.retry.min_delay, Duration::from_secs(1));
    }
}
