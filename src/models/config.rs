//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Pledge API and HTTP client settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Sync cadence and rate-limit handling
    #[serde(default)]
    pub sync: SyncConfig,

    /// Snapshot location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat command settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.base_url)
            .map_err(|e| AppError::validation(format!("source.base_url is invalid: {e}")))?;
        if self.sync.interval_secs == 0 {
            return Err(AppError::validation("sync.interval_secs must be > 0"));
        }
        self.sync.retry.validate()?;
        if self.storage.snapshot_path.as_os_str().is_empty() {
            return Err(AppError::validation("storage.snapshot_path is empty"));
        }
        if self.bot.command_prefix.trim().is_empty() {
            return Err(AppError::validation("bot.command_prefix is empty"));
        }
        Ok(())
    }
}

/// Pledge API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint without the `page` query parameter
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Sync cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between the start of consecutive cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Pause after each successfully fetched page, in milliseconds
    #[serde(default = "defaults::page_delay")]
    pub page_delay_ms: u64,

    /// Backoff policy for HTTP 429
    #[serde(default)]
    pub retry: RetryConfig,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            page_delay_ms: defaults::page_delay(),
            retry: RetryConfig::default(),
        }
    }
}

/// Rate-limit retry policy: bounded, exponential, jittered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Max requests per page, including the first
    #[serde(default = "defaults::max_attempts")]
    pub max_attempts: u32,

    /// Wait after the first 429, in milliseconds
    #[serde(default = "defaults::base_delay")]
    pub base_delay_ms: u64,

    /// Upper bound for any single wait, in milliseconds
    #[serde(default = "defaults::max_delay")]
    pub max_delay_ms: u64,

    /// Jitter fraction applied to each wait (0.0..=1.0)
    #[serde(default = "defaults::jitter_pct")]
    pub jitter_pct: f64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    /// Validate retry settings.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AppError::validation("sync.retry.max_attempts must be > 0"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(AppError::validation(
                "sync.retry.max_delay_ms must be >= base_delay_ms",
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter_pct) {
            return Err(AppError::validation(
                "sync.retry.jitter_pct must be within 0.0..=1.0",
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: defaults::max_attempts(),
            base_delay_ms: defaults::base_delay(),
            max_delay_ms: defaults::max_delay(),
            jitter_pct: defaults::jitter_pct(),
        }
    }
}

/// Snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: defaults::snapshot_path(),
        }
    }
}

/// Chat command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Command keyword that precedes the backer name
    #[serde(default = "defaults::command_prefix")]
    pub command_prefix: String,

    /// File holding the chat token; `BACKERLINE_TOKEN` takes precedence
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Image explaining how to set a public profile name
    #[serde(default = "defaults::help_image_url")]
    pub help_image_url: String,

    /// Disclaimer shown under a found backer's place in line
    #[serde(default = "defaults::found_note")]
    pub found_note: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            command_prefix: defaults::command_prefix(),
            token_file: None,
            help_image_url: defaults::help_image_url(),
            found_note: defaults::found_note(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "https://www.indiegogo.com/private_api/campaigns/2598099/pledges".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; backerline/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Sync defaults
    pub fn interval() -> u64 {
        60 * 60
    }
    pub fn page_delay() -> u64 {
        500
    }
    pub fn max_attempts() -> u32 {
        8
    }
    pub fn base_delay() -> u64 {
        10_000
    }
    pub fn max_delay() -> u64 {
        300_000
    }
    pub fn jitter_pct() -> f64 {
        0.2
    }

    // Storage defaults
    pub fn snapshot_path() -> PathBuf {
        PathBuf::from("backers.json")
    }

    // Bot defaults
    pub fn command_prefix() -> String {
        "!focus".into()
    }
    pub fn help_image_url() -> String {
        "https://i.imgur.com/OoqwIds.png".into()
    }
    pub fn found_note() -> String {
        "Your place in line does not guarantee delivery in that order, \
         this is for curiosity's sake only. Orders will likely ship by region."
            .into()
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
