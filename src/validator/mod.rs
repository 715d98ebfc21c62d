//! Exchange-data validation of extracted signals
//!
//! For a given symbol: existence across exchanges, banded liquidity score,
//! volatility bucket and cross-exchange price accuracy, aggregated from
//! parallel best-effort ticker fetches. Verdicts are cached briefly to
//! bound external call volume.

pub mod binance;
pub mod bybit;
pub mod exchange;
pub mod okx;

#[cfg(test)]
mod tests;

pub use exchange::{Exchange, ExchangeTicker};

use crate::config::ValidationConfig;
use crate::error::Result;
use crate::storage::cache::TtlCache;
use crate::types::TradingPair;
use binance::BinanceClient;
use bybit::BybitClient;
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use okx::OkxClient;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Banded 24h volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolatilityBucket {
    Extreme,
    High,
    Medium,
    Low,
    VeryLow,
}

impl VolatilityBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityBucket::Extreme => "extreme",
            VolatilityBucket::High => "high",
            VolatilityBucket::Medium => "medium",
            VolatilityBucket::Low => "low",
            VolatilityBucket::VeryLow => "very_low",
        }
    }
}

impl fmt::Display for VolatilityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cross-exchange price agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceAccuracyBucket {
    High,
    Medium,
    Low,
}

impl PriceAccuracyBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceAccuracyBucket::High => "high",
            PriceAccuracyBucket::Medium => "medium",
            PriceAccuracyBucket::Low => "low",
        }
    }
}

impl fmt::Display for PriceAccuracyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticker data that survived aggregation, per exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeQuote {
    pub exchange: String,
    pub last_price: Decimal,
    pub quote_volume_24h: f64,
    pub change_pct_24h: f64,
}

/// Per-symbol validation verdict.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub pair: TradingPair,
    pub quotes: Vec<ExchangeQuote>,
    pub liquidity_score: f64,
    pub volatility: VolatilityBucket,
    pub price_accuracy: PriceAccuracyBucket,
    pub is_valid: bool,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

impl ValidationResult {
    /// True when the pair is listed on at least one exchange.
    pub fn exists(&self) -> bool {
        !self.quotes.is_empty()
    }
}

pub struct SignalValidator {
    exchanges: Vec<Arc<dyn Exchange>>,
    cache: TtlCache<ValidationResult>,
}

impl SignalValidator {
    /// Build a validator backed by the public Binance, Bybit and OKX APIs.
    pub fn new(config: &ValidationConfig) -> Result<Self> {
        let timeout = config.request_timeout_secs;
        let exchanges: Vec<Arc<dyn Exchange>> = vec![
            Arc::new(BinanceClient::new(&config.binance_url, timeout)?),
            Arc::new(BybitClient::new(&config.bybit_url, timeout)?),
            Arc::new(OkxClient::new(&config.okx_url, timeout)?),
        ];
        Ok(Self::with_exchanges(exchanges, config.cache_ttl_secs))
    }

    /// Build with explicit exchange clients (tests, dry runs).
    pub fn with_exchanges(exchanges: Vec<Arc<dyn Exchange>>, cache_ttl_secs: i64) -> Self {
        Self {
            exchanges,
            cache: TtlCache::new(cache_ttl_secs),
        }
    }

    /// Validate a pair against all configured exchanges.
    ///
    /// Best-effort: an unreachable exchange only removes its data points,
    /// it never fails the validation.
    pub async fn validate(&self, pair: &TradingPair) -> ValidationResult {
        let key = pair.to_string();
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("Validation cache hit for {}", key);
            return cached;
        }

        let fetches = self.exchanges.iter().map(|ex| {
            let ex = Arc::clone(ex);
            let pair = pair.clone();
            async move { (ex.name(), ex.fetch_ticker(&pair).await) }
        });

        let mut quotes = Vec::new();
        for (name, outcome) in join_all(fetches).await {
            match outcome {
                Ok(Some(ticker)) => quotes.push(ExchangeQuote {
                    exchange: name.to_string(),
                    last_price: ticker.last_price,
                    quote_volume_24h: ticker.quote_volume_24h,
                    change_pct_24h: ticker.change_pct_24h,
                }),
                Ok(None) => {
                    tracing::debug!("{} not listed on {}", pair, name);
                }
                Err(e) => {
                    tracing::warn!("{} ticker fetch failed on {}: {}", pair, name, e);
                }
            }
        }

        let result = aggregate(pair.clone(), quotes);
        self.cache.set(&key, result.clone());
        result
    }
}

fn aggregate(pair: TradingPair, quotes: Vec<ExchangeQuote>) -> ValidationResult {
    let exists = !quotes.is_empty();

    let liquidity_score = if exists {
        let total_volume: f64 = quotes.iter().map(|q| q.quote_volume_24h).sum();
        liquidity_band(total_volume)
    } else {
        0.0
    };

    let volatility = if exists {
        let avg_abs_change =
            quotes.iter().map(|q| q.change_pct_24h.abs()).sum::<f64>() / quotes.len() as f64;
        volatility_band(avg_abs_change)
    } else {
        VolatilityBucket::VeryLow
    };

    let prices: Vec<Decimal> = quotes.iter().map(|q| q.last_price).collect();
    let price_accuracy = price_accuracy_band(&prices);

    let is_valid = exists && liquidity_score > 0.1 && volatility != VolatilityBucket::Extreme;

    let mut warnings = Vec::new();
    if !exists {
        warnings.push(format!("{} not found on any exchange", pair));
    }
    if exists && liquidity_score <= 0.1 {
        warnings.push("24h volume is very thin".to_string());
    }
    if volatility == VolatilityBucket::Extreme {
        warnings.push("extreme 24h volatility".to_string());
    }
    if price_accuracy == PriceAccuracyBucket::Low && quotes.len() >= 2 {
        warnings.push("exchanges disagree on price".to_string());
    }

    let mut recommendations = Vec::new();
    if !is_valid {
        recommendations.push("do not trade this signal".to_string());
    } else {
        if liquidity_score <= 0.4 {
            recommendations.push("low liquidity: reduce position size".to_string());
        }
        if volatility == VolatilityBucket::High {
            recommendations.push("high volatility: widen stops and reduce leverage".to_string());
        }
        if recommendations.is_empty() {
            recommendations.push("no concerns from exchange data".to_string());
        }
    }

    ValidationResult {
        pair,
        quotes,
        liquidity_score,
        volatility,
        price_accuracy,
        is_valid,
        warnings,
        recommendations,
        checked_at: Utc::now(),
    }
}

/// Banded score over aggregated 24h quote volume.
fn liquidity_band(total_quote_volume: f64) -> f64 {
    if total_quote_volume >= 50_000_000.0 {
        1.0
    } else if total_quote_volume >= 10_000_000.0 {
        0.7
    } else if total_quote_volume >= 1_000_000.0 {
        0.4
    } else if total_quote_volume >= 100_000.0 {
        0.2
    } else {
        0.1
    }
}

/// Bucket over the average absolute 24h change across exchanges.
fn volatility_band(avg_abs_change_pct: f64) -> VolatilityBucket {
    if avg_abs_change_pct >= 20.0 {
        VolatilityBucket::Extreme
    } else if avg_abs_change_pct >= 10.0 {
        VolatilityBucket::High
    } else if avg_abs_change_pct >= 5.0 {
        VolatilityBucket::Medium
    } else if avg_abs_change_pct >= 2.0 {
        VolatilityBucket::Low
    } else {
        VolatilityBucket::VeryLow
    }
}

/// Bucket over the relative spread between the lowest and highest
/// last-trade price across exchanges.
fn price_accuracy_band(prices: &[Decimal]) -> PriceAccuracyBucket {
    if prices.is_empty() {
        return PriceAccuracyBucket::Low;
    }
    if prices.len() == 1 {
        return PriceAccuracyBucket::High;
    }

    let min = prices.iter().min().copied().unwrap_or_default();
    let max = prices.iter().max().copied().unwrap_or_default();
    if min <= Decimal::ZERO {
        return PriceAccuracyBucket::Low;
    }

    let spread_pct = ((max - min) / min).to_f64().unwrap_or(1.0) * 100.0;
    if spread_pct <= 0.5 {
        PriceAccuracyBucket::High
    } else if spread_pct <= 2.0 {
        PriceAccuracyBucket::Medium
    } else {
        PriceAccuracyBucket::Low
    }
}
