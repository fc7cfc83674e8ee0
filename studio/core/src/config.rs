//! TOML Configuration File Support
//!
//! Centralized configuration loading for the studio shells, backed by a TOML
//! file at `~/.config/podcast-studio/studio.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [service]
//! base_url = "http://localhost:8000"
//! request_timeout_secs = 30
//!
//! [polling]
//! interval_ms = 2000
//! max_watch_secs = 0      # 0 = no limit
//!
//! [visualizer]
//! color = "green"
//! tick_ms = 100
//! ```
//!
//! # Environment Variables
//!
//! - `STUDIO_BASE_URL`: generation service base URL
//! - `STUDIO_POLL_INTERVAL_MS`: delay between status queries
//! - `STUDIO_MAX_WATCH_SECS`: wall-clock budget for one watch (0 = none)
//! - `STUDIO_COLOR`: waveform preset name or `#RRGGBB`

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{WatchOptions, DEFAULT_POLL_INTERVAL};
use crate::palette::{self, Preset};
use crate::waveform::TICK_INTERVAL;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[service]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToml {
    /// Generation service base URL
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// `[polling]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingToml {
    /// Delay between status queries in milliseconds
    pub interval_ms: Option<u64>,

    /// Wall-clock budget for one watch in seconds (0 = none)
    pub max_watch_secs: Option<u64>,
}

/// `[visualizer]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerToml {
    /// Waveform preset name or `#RRGGBB`
    pub color: Option<String>,

    /// Waveform redraw period in milliseconds
    pub tick_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioToml {
    /// Service section
    pub service: ServiceToml,

    /// Polling section
    pub polling: PollingToml,

    /// Visualizer section
    pub visualizer: VisualizerToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Where and how to reach the generation service
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub base_url: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Resolved configuration for a studio shell
#[derive(Clone, Debug)]
pub struct StudioConfig {
    /// Generation service settings
    pub service: ServiceConfig,

    /// Delay between status queries
    pub poll_interval: Duration,

    /// Wall-clock budget for one watch (`None` = until terminal)
    pub max_watch_duration: Option<Duration>,

    /// Waveform preset name or `#RRGGBB`
    pub color: String,

    /// Waveform redraw period
    pub tick_interval: Duration,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_watch_duration: None,
            color: Preset::default().name().to_string(),
            tick_interval: TICK_INTERVAL,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl StudioConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Poll loop settings derived from this configuration
    #[must_use]
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions {
            poll_interval: self.poll_interval,
            max_duration: self.max_watch_duration,
        }
    }

    /// Check values that would break the client at runtime
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.service.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("base_url {:?}: {e}", self.service.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "base_url must be http or https, got {:?}",
                url.scheme()
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "waveform tick must be greater than zero".to_string(),
            ));
        }
        palette::resolve_or_hex(&self.color)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/podcast-studio/studio.toml` or
/// `~/.config/podcast-studio/studio.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("podcast-studio").join("studio.toml"))
}

/// Load configuration from the default path and the process environment
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<StudioConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StudioConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<StudioConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = StudioConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: StudioToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    // Environment overrides file values
    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut StudioConfig, toml: &StudioToml) {
    if let Some(ref url) = toml.service.base_url {
        config.service.base_url.clone_from(url);
    }
    if let Some(secs) = toml.service.request_timeout_secs {
        config.service.request_timeout = Duration::from_secs(secs);
    }

    if let Some(ms) = toml.polling.interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    if let Some(secs) = toml.polling.max_watch_secs {
        config.max_watch_duration = watch_budget(secs);
    }

    if let Some(ref color) = toml.visualizer.color {
        config.color.clone_from(color);
    }
    if let Some(ms) = toml.visualizer.tick_ms {
        config.tick_interval = Duration::from_millis(ms);
    }
}

/// Apply environment variables; unparseable numbers are ignored with a warning
fn apply_env_config<F>(config: &mut StudioConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut touched = false;

    if let Some(url) = env("STUDIO_BASE_URL") {
        config.service.base_url = url;
        touched = true;
    }
    if let Some(ms) = env_number(&env, "STUDIO_POLL_INTERVAL_MS") {
        config.poll_interval = Duration::from_millis(ms);
        touched = true;
    }
    if let Some(secs) = env_number(&env, "STUDIO_MAX_WATCH_SECS") {
        config.max_watch_duration = watch_budget(secs);
        touched = true;
    }
    if let Some(color) = env("STUDIO_COLOR") {
        config.color = color;
        touched = true;
    }

    if touched {
        config.source = ConfigSource::Env;
    }
}

fn env_number<F>(env: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring non-numeric environment value");
            None
        }
    }
}

/// 0 means "no budget"
fn watch_budget(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

// =============================================================================
// CLI Overrides
// =============================================================================

/// Values supplied on the command line, applied last
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Service base URL
    pub base_url: Option<String>,
    /// Poll interval in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Watch budget in seconds (0 = none)
    pub max_watch_secs: Option<u64>,
    /// Waveform color
    pub color: Option<String>,
}

impl ConfigOverrides {
    /// Create empty overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the service base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the poll interval
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = Some(ms);
        self
    }

    /// Override the watch budget
    #[must_use]
    pub fn with_max_watch_secs(mut self, secs: u64) -> Self {
        self.max_watch_secs = Some(secs);
        self
    }

    /// Override the waveform color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Apply these overrides to a loaded configuration
    pub fn apply(&self, config: &mut StudioConfig) {
        let mut touched = false;

        if let Some(ref url) = self.base_url {
            config.service.base_url.clone_from(url);
            touched = true;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval = Duration::from_millis(ms);
            touched = true;
        }
        if let Some(secs) = self.max_watch_secs {
            config.max_watch_duration = watch_budget(secs);
            touched = true;
        }
        if let Some(ref color) = self.color {
            config.color.clone_from(color);
            touched = true;
        }

        if touched {
            config.source = ConfigSource::Cli;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use tempfile::NamedTempFile;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_watch_duration, None);
        assert_eq!(config.color, "green");
        assert_eq!(config.tick_interval, Duration::from_millis(100));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("podcast-studio/studio.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let file = write_config(
            r##"
[service]
base_url = "https://studio.example.com"
request_timeout_secs = 10

[polling]
interval_ms = 500
max_watch_secs = 600

[visualizer]
color = "#FF00FF"
tick_ms = 50
"##,
        );

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.service.base_url, "https://studio.example.com");
        assert_eq!(config.service.request_timeout, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert_eq!(config.max_watch_duration, Some(Duration::from_secs(600)));
        assert_eq!(config.color, "#FF00FF");
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.source(), ConfigSource::File);
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = write_config("[polling]\ninterval_ms = 750\n");

        let config = load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();
        assert_eq!(config.poll_interval, Duration::from_millis(750));
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.color, "green");
    }

    #[test]
    fn test_missing_file_graceful() {
        let config =
            load_config_with_env(Some(PathBuf::from("/nonexistent/studio.toml")), no_env).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_config("[polling\ninterval_ms = ");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_config("[service]\nbase_url = \"http://from-file:8000\"\n");
        let env: HashMap<&str, &str> = HashMap::from([
            ("STUDIO_BASE_URL", "http://from-env:9000"),
            ("STUDIO_POLL_INTERVAL_MS", "250"),
            ("STUDIO_MAX_WATCH_SECS", "0"),
            ("STUDIO_COLOR", "purple"),
        ]);

        let config = load_config_with_env(Some(file.path().to_path_buf()), |key| {
            env.get(key).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.service.base_url, "http://from-env:9000");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.max_watch_duration, None);
        assert_eq!(config.color, "purple");
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_bad_env_number_ignored() {
        let config = load_config_with_env(None, |key| {
            (key == "STUDIO_POLL_INTERVAL_MS").then(|| "soon".to_string())
        })
        .unwrap();
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = load_config_with_env(None, |key| {
            (key == "STUDIO_BASE_URL").then(|| "http://from-env:9000".to_string())
        })
        .unwrap();

        ConfigOverrides::new()
            .with_base_url("http://from-cli:7000")
            .with_max_watch_secs(30)
            .apply(&mut config);

        assert_eq!(config.service.base_url, "http://from-cli:7000");
        assert_eq!(config.max_watch_duration, Some(Duration::from_secs(30)));
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = StudioConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
        assert_eq!(config.service, ServiceConfig::default());
    }

    #[test]
    fn test_validation() {
        let mut config = StudioConfig::default();
        config.service.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let mut config = StudioConfig::default();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = StudioConfig::default();
        config.color = "#12".to_string();
        assert!(config.validate().is_err());

        // Unknown preset names fall back, they are not an error
        let mut config = StudioConfig::default();
        config.color = "teal".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_watch_options() {
        let mut config = StudioConfig::default();
        config.poll_interval = Duration::from_millis(300);
        config.max_watch_duration = Some(Duration::from_secs(5));

        let options = config.watch_options();
        assert_eq!(options.poll_interval, Duration::from_millis(300));
        assert_eq!(options.max_duration, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
