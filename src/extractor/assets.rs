//! Asset detection against a curated alias table
//!
//! Ordered allow-list: the first table entry with a hit wins, so BTC
//! aliases outrank everything else. Explicit BASE/QUOTE pair tokens take
//! precedence over bare aliases.

use crate::types::TradingPair;

/// Quote currencies accepted in explicit pair notation.
pub const KNOWN_QUOTES: &[&str] = &["USDT", "USD", "USDC", "BUSD", "BTC", "ETH"];

/// (canonical symbol, aliases), in priority order.
const ASSET_TABLE: &[(&str, &[&str])] = &[
    ("BTC", &["btc", "bitcoin", "xbt"]),
    ("ETH", &["eth", "ethereum", "ether"]),
    ("SOL", &["sol", "solana"]),
    ("BNB", &["bnb"]),
    ("XRP", &["xrp", "ripple"]),
    ("ADA", &["ada", "cardano"]),
    ("DOGE", &["doge", "dogecoin"]),
    ("DOT", &["dot", "polkadot"]),
    ("AVAX", &["avax", "avalanche"]),
    ("LINK", &["link", "chainlink"]),
    ("MATIC", &["matic", "polygon"]),
    ("LTC", &["ltc", "litecoin"]),
    ("TON", &["ton", "toncoin"]),
    ("ARB", &["arb", "arbitrum"]),
    ("PEPE", &["pepe"]),
];

pub struct AssetTable {
    entries: &'static [(&'static str, &'static [&'static str])],
}

impl AssetTable {
    pub fn new() -> Self {
        Self {
            entries: ASSET_TABLE,
        }
    }

    /// Detect the traded pair in a message block.
    pub fn detect(&self, text: &str, default_quote: &str) -> Option<TradingPair> {
        if let Some(pair) = self.detect_explicit_pair(text) {
            return Some(pair);
        }

        let tokens: Vec<String> = text
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .collect();

        for (symbol, aliases) in self.entries {
            if tokens
                .iter()
                .any(|t| aliases.contains(&t.as_str()))
            {
                return Some(TradingPair::new(symbol, default_quote));
            }
        }

        None
    }

    /// "BTC/USDT"-style tokens, with the base resolved through the alias
    /// table when possible.
    fn detect_explicit_pair(&self, text: &str) -> Option<TradingPair> {
        for word in text.split_whitespace() {
            let token = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '/');
            let Some((base, quote)) = token.split_once('/') else {
                continue;
            };
            let quote_upper = quote.to_uppercase();
            if !is_ticker(quote) || !KNOWN_QUOTES.contains(&quote_upper.as_str()) {
                continue;
            }
            let base_symbol = match self.resolve_alias(&base.to_lowercase()) {
                Some(symbol) => symbol.to_string(),
                None if is_ticker(base) => base.to_uppercase(),
                None => continue,
            };
            return Some(TradingPair::new(&base_symbol, &quote_upper));
        }
        None
    }

    fn resolve_alias(&self, raw: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(_, aliases)| aliases.contains(&raw))
            .map(|(symbol, _)| *symbol)
    }
}

impl Default for AssetTable {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ticker(s: &str) -> bool {
    (2..=6).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_detection() {
        let table = AssetTable::new();
        let pair = table.detect("Bitcoin is about to move", "USDT").unwrap();
        assert_eq!(pair.to_string(), "BTC/USDT");

        let pair = table.detect("loading up on solana", "USDT").unwrap();
        assert_eq!(pair.to_string(), "SOL/USDT");
    }

    #[test]
    fn test_all_aliases_resolve_to_canonical() {
        let table = AssetTable::new();
        for (symbol, aliases) in ASSET_TABLE {
            for alias in *aliases {
                let pair = table
                    .detect(&format!("signal for {} now", alias), "USDT")
                    .unwrap();
                assert_eq!(pair.base, *symbol, "alias {} failed", alias);
            }
        }
    }

    #[test]
    fn test_dollar_prefixed_ticker() {
        let table = AssetTable::new();
        let pair = table.detect("$BTC breaking out", "USDT").unwrap();
        assert_eq!(pair.base, "BTC");
    }

    #[test]
    fn test_table_order_priority() {
        // both assets present: the earlier table entry wins
        let table = AssetTable::new();
        let pair = table.detect("eth will follow btc", "USDT").unwrap();
        assert_eq!(pair.base, "BTC");
    }

    #[test]
    fn test_explicit_pair() {
        let table = AssetTable::new();
        let pair = table.detect("ETH/BTC looks ready", "USDT").unwrap();
        assert_eq!(pair, TradingPair::new("ETH", "BTC"));
    }

    #[test]
    fn test_explicit_pair_resolves_alias() {
        let table = AssetTable::new();
        let pair = table.detect("bitcoin/usdt setup", "USDT").unwrap();
        assert_eq!(pair, TradingPair::new("BTC", "USDT"));
    }

    #[test]
    fn test_unknown_asset() {
        let table = AssetTable::new();
        assert!(table.detect("buy my obscure token", "USDT").is_none());
    }

    #[test]
    fn test_substring_does_not_match() {
        // "solid" must not match SOL
        let table = AssetTable::new();
        assert!(table.detect("a solid plan here", "USDT").is_none());
    }
}
