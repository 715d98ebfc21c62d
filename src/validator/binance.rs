//! Binance spot ticker client

use super::exchange::{Exchange, ExchangeTicker};
use crate::error::{Result, SignalError};
use crate::types::TradingPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub struct BinanceClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Ticker24h {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "quoteVolume")]
    quote_volume: String,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: String,
}

impl BinanceClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Exchange for BinanceClient {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> Result<Option<ExchangeTicker>> {
        let symbol = format!("{}{}", pair.base, pair.quote);
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?;

        // invalid symbols come back as 400 with code -1121
        if resp.status() == reqwest::StatusCode::BAD_REQUEST {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SignalError::Api(format!(
                "binance ticker returned {}",
                resp.status()
            )));
        }

        let ticker: Ticker24h = resp.json().await?;

        let last_price = ticker
            .last_price
            .parse()
            .map_err(|_| SignalError::Api(format!("bad lastPrice: {}", ticker.last_price)))?;
        let quote_volume_24h = ticker.quote_volume.parse().unwrap_or(0.0);
        let change_pct_24h = ticker.price_change_percent.parse().unwrap_or(0.0);

        Ok(Some(ExchangeTicker {
            last_price,
            quote_volume_24h,
            change_pct_24h,
        }))
    }
}
