//! Message ingestion from external sources
//!
//! Collects raw messages from:
//! - Telegram channels (Bot API long polling)
//! - Reddit (subreddit new-post polling)

pub mod reddit;
pub mod source;
pub mod telegram;


use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Raw scraped message from any platform.
///
/// Ephemeral: lives only until signal extraction has run over it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Source platform: "telegram", "reddit", "cli"
    pub source: String,
    /// Channel / chat / subreddit identifier
    pub channel: String,
    /// Platform message id
    pub message_id: String,
    /// Author identifier, if the platform exposes one
    pub author: Option<String>,
    /// Free text content
    pub text: String,
    /// Image bytes for callers that ran OCR upstream; sources leave this empty
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
    /// When the message was captured
    pub timestamp: DateTime<Utc>,
}

impl RawMessage {
    /// Build a message holding only text, for one-shot extraction.
    pub fn from_text(source: &str, channel: &str, text: &str) -> Self {
        Self {
            source: source.to_string(),
            channel: channel.to_string(),
            message_id: uuid::Uuid::new_v4().to_string(),
            author: None,
            text: text.to_string(),
            image: None,
            timestamp: Utc::now(),
        }
    }
}

/// Message source trait
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Source name
    fn name(&self) -> &str;

    /// Start polling and send captured messages to the channel
    async fn run(&self, tx: mpsc::Sender<RawMessage>) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSourceConfig {
    /// Bot API token
    pub bot_token: String,
    /// Chat IDs to monitor (empty = all chats the bot can see)
    #[serde(default)]
    pub watch_chats: Vec<i64>,
    /// Pause between polls when a long poll returns immediately
    #[serde(default = "default_telegram_poll_interval")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedditSourceConfig {
    /// Subreddits to monitor (without the r/ prefix)
    pub subreddits: Vec<String>,
    /// User-Agent required by the Reddit API
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_reddit_poll_interval")]
    pub poll_interval_secs: u64,
    /// Posts must contain one of these (empty = keep everything)
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_telegram_poll_interval() -> u64 {
    5
}

fn default_reddit_poll_interval() -> u64 {
    60
}

fn default_user_agent() -> String {
    "signalhound/0.1".to_string()
}

/// Case-insensitive keyword pre-filter. An empty list keeps everything.
pub(crate) fn matches_keywords(text: &str, keywords: &[String]) -> bool {
    if keywords.is_empty() {
        return true;
    }
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}
