//! Core domain types shared across the pipeline

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Trade direction of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// Normalized trading pair (BASE/QUOTE)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        }
    }

    /// Parse "BTC/USDT" or "btc-usdt". A bare symbol gets the given quote.
    pub fn parse(s: &str, default_quote: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        for sep in ['/', '-'] {
            if let Some((base, quote)) = s.split_once(sep) {
                if base.is_empty() || quote.is_empty() {
                    return None;
                }
                return Some(Self::new(base, quote));
            }
        }
        Some(Self::new(s, default_quote))
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Where a signal came from and which strategy produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    /// Source platform: "telegram", "reddit", "cli"
    pub source: String,
    /// Channel / chat / subreddit identifier
    pub channel: String,
    /// Platform message id
    pub message_id: String,
    /// Name of the extraction strategy that produced the prices
    pub strategy: String,
}

/// A structured trading signal extracted from free text.
///
/// Immutable once created: the extractor computes every field (including
/// the consistency flag) before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSignal {
    pub id: Uuid,
    pub pair: TradingPair,
    pub direction: Direction,
    pub entry: Option<Decimal>,
    /// 1-3 target prices in the order they were extracted
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub leverage: Option<u32>,
    /// Free-form horizon as written ("4h", "swing", ...)
    pub time_horizon: Option<String>,
    /// Heuristic completeness score, 0-100. Not a probability.
    pub confidence: u8,
    /// Set when the price ordering contradicts the direction
    pub price_inconsistent: bool,
    pub provenance: Provenance,
    pub extracted_at: DateTime<Utc>,
}

impl ExtractedSignal {
    /// Duplicate-suppression key: pair, direction and prices rounded to 2dp.
    pub fn dedup_key(&self) -> String {
        let fmt_price = |p: &Option<Decimal>| match p {
            Some(v) => v.round_dp(2).to_string(),
            None => "-".to_string(),
        };
        let targets: Vec<String> = self
            .targets
            .iter()
            .map(|t| t.round_dp(2).to_string())
            .collect();
        format!(
            "{}|{}|{}|{}|{}",
            self.pair,
            self.direction,
            fmt_price(&self.entry),
            targets.join(","),
            fmt_price(&self.stop_loss),
        )
    }
}

/// Checks that extracted prices are ordered consistently with the direction:
/// for LONG, targets above entry and stop below; for SHORT, the inverse.
/// Fields that were not extracted are not checked.
pub fn price_ordering_consistent(
    direction: Direction,
    entry: Option<&Decimal>,
    targets: &[Decimal],
    stop_loss: Option<&Decimal>,
) -> bool {
    let Some(entry) = entry else {
        return true;
    };
    match direction {
        Direction::Long => {
            targets.iter().all(|t| t > entry) && stop_loss.map_or(true, |sl| sl < entry)
        }
        Direction::Short => {
            targets.iter().all(|t| t < entry) && stop_loss.map_or(true, |sl| sl > entry)
        }
    }
}
