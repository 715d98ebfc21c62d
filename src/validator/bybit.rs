//! Bybit spot ticker client

use super::exchange::{Exchange, ExchangeTicker};
use crate::error::{Result, SignalError};
use crate::types::TradingPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub struct BybitClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickersResponse {
    #[serde(rename = "retCode")]
    ret_code: i32,
    result: Option<TickersResult>,
}

#[derive(Debug, Deserialize)]
struct TickersResult {
    #[serde(default)]
    list: Vec<TickerItem>,
}

#[derive(Debug, Deserialize)]
struct TickerItem {
    #[serde(rename = "lastPrice")]
    last_price: String,
    /// 24h turnover in quote currency
    #[serde(rename = "turnover24h")]
    turnover_24h: String,
    /// 24h change as a fraction ("0.025" = +2.5%)
    #[serde(rename = "price24hPcnt")]
    price_24h_pcnt: String,
}

impl BybitClient {
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
impl Exchange for BybitClient {
    fn name(&self) -> &'static str {
        "bybit"
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> Result<Option<ExchangeTicker>> {
        let symbol = format!("{}{}", pair.base, pair.quote);
        let url = format!("{}/v5/market/tickers", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("category", "spot"), ("symbol", symbol.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SignalError::Api(format!(
                "bybit ticker returned {}",
                resp.status()
            )));
        }

        let body: TickersResponse = resp.json().await?;

        // unknown symbols come back as a non-zero retCode or an empty list
        if body.ret_code != 0 {
            return Ok(None);
        }
        let Some(item) = body.result.and_then(|r| r.list.into_iter().next()) else {
            return Ok(None);
        };

        let last_price = item
            .last_price
            .parse()
            .map_err(|_| SignalError::Api(format!("bad lastPrice: {}", item.last_price)))?;
        let quote_volume_24h = item.turnover_24h.parse().unwrap_or(0.0);
        let change_pct_24h = item.price_24h_pcnt.parse::<f64>().unwrap_or(0.0) * 100.0;

        Ok(Some(ExchangeTicker {
            last_price,
            quote_volume_24h,
            change_pct_24h,
        }))
    }
}
