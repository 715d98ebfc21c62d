//! Reddit subreddit scraping
//!
//! Polls the public `new.json` listing of configured subreddits. No OAuth:
//! the read-only JSON endpoints only require a descriptive User-Agent.

use super::{matches_keywords, MessageSource, RawMessage, RedditSourceConfig};
use crate::error::{Result, SignalError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tokio::sync::mpsc;

pub struct RedditSource {
    config: RedditSourceConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    author: Option<String>,
    subreddit: String,
    created_utc: f64,
}

impl RedditSource {
    pub fn new(config: RedditSourceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(std::time::Duration::from_secs(15))
            .build()?;
        Ok(Self { config, http })
    }

    async fn fetch_new(&self, subreddit: &str) -> Result<Vec<Post>> {
        let url = format!("https://www.reddit.com/r/{}/new.json", subreddit);

        let resp = self
            .http
            .get(&url)
            .query(&[("limit", "25")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SignalError::Api(format!(
                "r/{} listing returned {}",
                subreddit,
                resp.status()
            )));
        }

        let listing: Listing = resp.json().await?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }

    fn to_raw(&self, post: Post) -> RawMessage {
        // Title and body as separate paragraphs; the extractor treats
        // paragraphs as candidate signal blocks.
        let text = if post.selftext.trim().is_empty() {
            post.title
        } else {
            format!("{}\n\n{}", post.title, post.selftext)
        };

        RawMessage {
            source: "reddit".to_string(),
            channel: post.subreddit,
            message_id: post.id,
            author: post.author,
            text,
            image: None,
            timestamp: DateTime::from_timestamp(post.created_utc as i64, 0)
                .unwrap_or_else(Utc::now),
        }
    }
}

#[async_trait]
impl MessageSource for RedditSource {
    fn name(&self) -> &str {
        "reddit"
    }

    async fn run(&self, tx: mpsc::Sender<RawMessage>) -> Result<()> {
        tracing::info!(
            "Reddit source starting, monitoring {} subreddits",
            self.config.subreddits.len()
        );

        let mut seen_ids: std::collections::HashSet<String> = std::collections::HashSet::new();
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            self.config.poll_interval_secs,
        ));

        loop {
            interval.tick().await;

            for subreddit in &self.config.subreddits {
                match self.fetch_new(subreddit).await {
                    Ok(posts) => {
                        for post in posts {
                            if seen_ids.contains(&post.id) {
                                continue;
                            }
                            seen_ids.insert(post.id.clone());

                            if !matches_keywords(
                                &format!("{} {}", post.title, post.selftext),
                                &self.config.keywords,
                            ) {
                                continue;
                            }

                            if tx.send(self.to_raw(post)).await.is_err() {
                                tracing::warn!("Failed to send message, channel closed");
                                return Ok(());
                            }
                        }
                    }
                    Err(e) => {
                        let jitter = rand::rng().random_range(0..500);
                        tracing::warn!("Failed to fetch r/{}: {}", subreddit, e);
                        tokio::time::sleep(std::time::Duration::from_millis(500 + jitter)).await;
                    }
                }
            }

            // Limit seen cache size
            if seen_ids.len() > 10000 {
                seen_ids.clear();
            }
        }
    }
}
