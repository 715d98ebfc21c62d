//! Validator tests against mock exchanges

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::{Result, SignalError};
    use crate::types::TradingPair;
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MockExchange {
        name: &'static str,
        ticker: Option<ExchangeTicker>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl MockExchange {
        fn listed(
            name: &'static str,
            last_price: Decimal,
            quote_volume_24h: f64,
            change_pct_24h: f64,
        ) -> Arc<Self> {
            Arc::new(Self {
                name,
                ticker: Some(ExchangeTicker {
                    last_price,
                    quote_volume_24h,
                    change_pct_24h,
                }),
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn unlisted(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                ticker: None,
                fail: false,
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                ticker: None,
                fail: true,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Exchange for MockExchange {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_ticker(&self, _pair: &TradingPair) -> Result<Option<ExchangeTicker>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SignalError::Api("exchange down".into()));
            }
            Ok(self.ticker.clone())
        }
    }

    fn pair() -> TradingPair {
        TradingPair::new("BTC", "USDT")
    }

    #[tokio::test]
    async fn test_healthy_symbol_is_valid() {
        let validator = SignalValidator::with_exchanges(
            vec![
                MockExchange::listed("binance", dec!(45000), 80_000_000.0, 2.5),
                MockExchange::listed("bybit", dec!(45010), 30_000_000.0, 2.4),
                MockExchange::listed("okx", dec!(44990), 20_000_000.0, 2.6),
            ],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert!(result.is_valid);
        assert!(result.exists());
        assert_eq!(result.quotes.len(), 3);
        assert_eq!(result.liquidity_score, 1.0);
        assert_eq!(result.volatility, VolatilityBucket::Low);
        assert_eq!(result.price_accuracy, PriceAccuracyBucket::High);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_symbol_invalid_with_warning() {
        let validator = SignalValidator::with_exchanges(
            vec![
                MockExchange::unlisted("binance"),
                MockExchange::unlisted("bybit"),
            ],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert!(!result.is_valid);
        assert!(!result.exists());
        assert_eq!(result.liquidity_score, 0.0);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("not found on any exchange")));
    }

    #[tokio::test]
    async fn test_failing_exchange_is_excluded_not_fatal() {
        let validator = SignalValidator::with_exchanges(
            vec![
                MockExchange::listed("binance", dec!(45000), 80_000_000.0, 2.5),
                MockExchange::failing("bybit"),
            ],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert!(result.is_valid);
        assert_eq!(result.quotes.len(), 1);
        assert_eq!(result.quotes[0].exchange, "binance");
    }

    #[tokio::test]
    async fn test_extreme_volatility_invalidates() {
        let validator = SignalValidator::with_exchanges(
            vec![MockExchange::listed("binance", dec!(0.5), 60_000_000.0, -35.0)],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert!(!result.is_valid);
        assert_eq!(result.volatility, VolatilityBucket::Extreme);
        assert!(result.warnings.iter().any(|w| w.contains("volatility")));
    }

    #[tokio::test]
    async fn test_thin_volume_invalidates() {
        let validator = SignalValidator::with_exchanges(
            vec![MockExchange::listed("binance", dec!(0.002), 40_000.0, 1.0)],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert!(!result.is_valid);
        assert_eq!(result.liquidity_score, 0.1);
        assert!(result.warnings.iter().any(|w| w.contains("volume")));
    }

    #[tokio::test]
    async fn test_price_divergence_warns() {
        let validator = SignalValidator::with_exchanges(
            vec![
                MockExchange::listed("binance", dec!(100), 60_000_000.0, 1.0),
                MockExchange::listed("okx", dec!(110), 60_000_000.0, 1.0),
            ],
            300,
        );

        let result = validator.validate(&pair()).await;
        assert_eq!(result.price_accuracy, PriceAccuracyBucket::Low);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("disagree on price")));
        // divergence alone does not invalidate
        assert!(result.is_valid);
    }

    #[tokio::test]
    async fn test_verdicts_are_cached() {
        let exchange = MockExchange::listed("binance", dec!(45000), 80_000_000.0, 2.5);
        let validator = SignalValidator::with_exchanges(vec![exchange.clone()], 300);

        let first = validator.validate(&pair()).await;
        let second = validator.validate(&pair()).await;

        assert_eq!(exchange.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.checked_at, second.checked_at);
    }

    #[tokio::test]
    async fn test_cache_is_per_symbol() {
        let exchange = MockExchange::listed("binance", dec!(45000), 80_000_000.0, 2.5);
        let validator = SignalValidator::with_exchanges(vec![exchange.clone()], 300);

        validator.validate(&TradingPair::new("BTC", "USDT")).await;
        validator.validate(&TradingPair::new("ETH", "USDT")).await;

        assert_eq!(exchange.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_liquidity_bands() {
        assert_eq!(liquidity_band(60_000_000.0), 1.0);
        assert_eq!(liquidity_band(15_000_000.0), 0.7);
        assert_eq!(liquidity_band(2_000_000.0), 0.4);
        assert_eq!(liquidity_band(150_000.0), 0.2);
        assert_eq!(liquidity_band(5_000.0), 0.1);
    }

    #[test]
    fn test_volatility_bands() {
        assert_eq!(volatility_band(25.0), VolatilityBucket::Extreme);
        assert_eq!(volatility_band(12.0), VolatilityBucket::High);
        assert_eq!(volatility_band(7.0), VolatilityBucket::Medium);
        assert_eq!(volatility_band(3.0), VolatilityBucket::Low);
        assert_eq!(volatility_band(0.5), VolatilityBucket::VeryLow);
    }

    #[test]
    fn test_accuracy_bands() {
        assert_eq!(
            price_accuracy_band(&[dec!(100), dec!(100.2)]),
            PriceAccuracyBucket::High
        );
        assert_eq!(
            price_accuracy_band(&[dec!(100), dec!(101.5)]),
            PriceAccuracyBucket::Medium
        );
        assert_eq!(
            price_accuracy_band(&[dec!(100), dec!(110)]),
            PriceAccuracyBucket::Low
        );
        assert_eq!(price_accuracy_band(&[dec!(100)]), PriceAccuracyBucket::High);
        assert_eq!(price_accuracy_band(&[]), PriceAccuracyBucket::Low);
    }
}
