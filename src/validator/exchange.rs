//! Exchange client trait

use crate::error::Result;
use crate::types::TradingPair;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 24h spot ticker statistics from one exchange.
#[derive(Debug, Clone)]
pub struct ExchangeTicker {
    pub last_price: Decimal,
    /// 24h traded volume in the quote currency
    pub quote_volume_24h: f64,
    /// 24h price change, percent
    pub change_pct_24h: f64,
}

/// Spot exchange REST client (allows mocking).
///
/// `Ok(None)` means the pair is not listed there; `Err` is reserved for
/// transport failures, which exclude the exchange from aggregation.
#[async_trait]
pub trait Exchange: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_ticker(&self, pair: &TradingPair) -> Result<Option<ExchangeTicker>>;
}
