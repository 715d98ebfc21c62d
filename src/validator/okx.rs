//! OKX spot ticker client

use super::exchange::{Exchange, ExchangeTicker};
use crate::error::{Result, SignalError};
use crate::types::TradingPair;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub struct OkxClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    code: String,
    #[serde(default)]
    data: Vec<TickerItem>,
}

#[derive(Debug, Deserialize)]
struct TickerItem {
    last: String,
    #[serde(rename = "open24h")]
    open_24h: String,
    /// 24h volume in quote currency
    #[serde(rename = "volCcy24h")]
    vol_ccy_24h: String,
}

impl OkxClient {
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
impl Exchange for OkxClient {
    fn name(&self) -> &'static str {
        "okx"
    }

    async fn fetch_ticker(&self, pair: &TradingPair) -> Result<Option<ExchangeTicker>> {
        let inst_id = format!("{}-{}", pair.base, pair.quote);
        let url = format!("{}/api/v5/market/ticker", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(&[("instId", inst_id.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(SignalError::Api(format!(
                "okx ticker returned {}",
                resp.status()
            )));
        }

        let body: TickerResponse = resp.json().await?;

        // unknown instruments come back with a non-zero code or no data
        if body.code != "0" {
            return Ok(None);
        }
        let Some(item) = body.data.into_iter().next() else {
            return Ok(None);
        };

        let last_price = item
            .last
            .parse()
            .map_err(|_| SignalError::Api(format!("bad last price: {}", item.last)))?;
        let quote_volume_24h = item.vol_ccy_24h.parse().unwrap_or(0.0);

        // OKX reports no 24h percent change; derive it from the open
        let open: f64 = item.open_24h.parse().unwrap_or(0.0);
        let last_f64: f64 = item.last.parse().unwrap_or(0.0);
        let change_pct_24h = if open > 0.0 {
            (last_f64 - open) / open * 100.0
        } else {
            0.0
        };

        Ok(Some(ExchangeTicker {
            last_price,
            quote_volume_24h,
            change_pct_24h,
        }))
    }
}
