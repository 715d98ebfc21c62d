//! Configuration management

use crate::ingester::{RedditSourceConfig, TelegramSourceConfig};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    pub telegram: Option<TelegramSourceConfig>,
    pub reddit: Option<RedditSourceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Quote currency assumed when a message names a bare asset
    #[serde(default = "default_quote")]
    pub default_quote: String,
    /// Maximum number of target prices kept per signal
    #[serde(default = "default_max_targets")]
    pub max_targets: usize,
    /// Signals scoring below this are dropped by the pipeline
    #[serde(default = "default_min_confidence")]
    pub min_confidence: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidationConfig {
    /// Per-symbol validation verdicts are cached this long
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: i64,
    /// Timeout applied to every outbound exchange call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_binance_url")]
    pub binance_url: String,
    #[serde(default = "default_bybit_url")]
    pub bybit_url: String,
    #[serde(default = "default_okx_url")]
    pub okx_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// SQLite database path
    #[serde(default = "default_db_path")]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Telegram bot token used for outbound alerts
    pub bot_token: String,
    /// Chat the alerts are delivered to
    pub chat_id: String,
}

fn default_quote() -> String {
    "USDT".to_string()
}

fn default_max_targets() -> usize {
    3
}

fn default_min_confidence() -> u8 {
    40
}

fn default_cache_ttl() -> i64 {
    300
}

fn default_request_timeout() -> u64 {
    10
}

fn default_binance_url() -> String {
    "https://api.binance.com".to_string()
}

fn default_bybit_url() -> String {
    "https://api.bybit.com".to_string()
}

fn default_okx_url() -> String {
    "https://www.okx.com".to_string()
}

fn default_db_path() -> String {
    "signalhound.db".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_quote: default_quote(),
            max_targets: default_max_targets(),
            min_confidence: default_min_confidence(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            request_timeout_secs: default_request_timeout(),
            binance_url: default_binance_url(),
            bybit_url: default_bybit_url(),
            okx_url: default_okx_url(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Config {
    /// Load configuration from file, with `SIGNALHOUND_` env overrides
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(
                path.as_ref().to_str().unwrap_or_default(),
            ))
            .add_source(config::Environment::with_prefix("SIGNALHOUND").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from the given path if it exists, otherwise fall back to
    /// default locations, otherwise defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }

        let fallbacks = ["config.toml", "~/.config/signalhound/config.toml"];
        for candidate in fallbacks {
            let expanded = shellexpand::tilde(candidate);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        Ok(Self::default())
    }
}
