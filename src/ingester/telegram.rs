//! Telegram channel scraping
//!
//! Long-polls the Bot API `getUpdates` endpoint and forwards channel posts
//! and group messages as raw messages.

use super::{MessageSource, RawMessage, TelegramSourceConfig};
use crate::error::{Result, SignalError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tokio::sync::mpsc;

const LONG_POLL_SECS: u64 = 25;

pub struct TelegramSource {
    config: TelegramSourceConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UpdatesResponse {
    ok: bool,
    result: Option<Vec<Update>>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<TgMessage>,
    channel_post: Option<TgMessage>,
}

#[derive(Debug, Deserialize)]
struct TgMessage {
    message_id: i64,
    chat: TgChat,
    from: Option<TgUser>,
    text: Option<String>,
    caption: Option<String>,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct TgChat {
    id: i64,
    title: Option<String>,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TgUser {
    username: Option<String>,
}

impl TelegramSource {
    pub fn new(config: TelegramSourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LONG_POLL_SECS + 10))
            .build()?;
        Ok(Self { config, http })
    }

    async fn fetch_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let url = format!(
            "https://api.telegram.org/bot{}/getUpdates",
            self.config.bot_token
        );

        let resp: UpdatesResponse = self
            .http
            .get(&url)
            .query(&[
                ("offset", offset.to_string()),
                ("timeout", LONG_POLL_SECS.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(SignalError::Api("getUpdates returned ok=false".into()));
        }

        Ok(resp.result.unwrap_or_default())
    }

    fn watched(&self, chat_id: i64) -> bool {
        self.config.watch_chats.is_empty() || self.config.watch_chats.contains(&chat_id)
    }

    fn to_raw(&self, msg: TgMessage) -> Option<RawMessage> {
        let text = msg.text.or(msg.caption)?;
        if text.trim().is_empty() {
            return None;
        }

        let channel = msg
            .chat
            .username
            .or(msg.chat.title)
            .unwrap_or_else(|| msg.chat.id.to_string());

        Some(RawMessage {
            source: "telegram".to_string(),
            channel,
            message_id: msg.message_id.to_string(),
            author: msg.from.and_then(|u| u.username),
            text,
            image: None,
            timestamp: DateTime::from_timestamp(msg.date, 0).unwrap_or_else(Utc::now),
        })
    }
}

#[async_trait]
impl MessageSource for TelegramSource {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn run(&self, tx: mpsc::Sender<RawMessage>) -> Result<()> {
        tracing::info!(
            "Telegram source starting, watching {} chats",
            if self.config.watch_chats.is_empty() {
                "all".to_string()
            } else {
                self.config.watch_chats.len().to_string()
            }
        );

        let mut offset: i64 = 0;

        loop {
            match self.fetch_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);

                        let msg = match update.channel_post.or(update.message) {
                            Some(m) => m,
                            None => continue,
                        };
                        if !self.watched(msg.chat.id) {
                            continue;
                        }

                        if let Some(raw) = self.to_raw(msg) {
                            if tx.send(raw).await.is_err() {
                                tracing::warn!("Failed to send message, channel closed");
                                return Ok(());
                            }
                        }
                    }

                    tokio::time::sleep(std::time::Duration::from_secs(
                        self.config.poll_interval_secs,
                    ))
                    .await;
                }
                Err(e) => {
                    // Back off with jitter so a flapping API is not hammered
                    let jitter = rand::rng().random_range(0..1000);
                    let backoff = std::time::Duration::from_secs(15)
                        + std::time::Duration::from_millis(jitter);
                    tracing::warn!("Telegram poll failed: {}, retrying in {:?}", e, backoff);
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}
