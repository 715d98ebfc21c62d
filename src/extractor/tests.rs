//! Fixture tests for the extraction pipeline

#[cfg(test)]
mod tests {
    use super::super::SignalExtractor;
    use crate::config::ExtractionConfig;
    use crate::ingester::RawMessage;
    use crate::types::Direction;
    use rust_decimal_macros::dec;

    fn extractor() -> SignalExtractor {
        SignalExtractor::new(ExtractionConfig::default())
    }

    fn msg(text: &str) -> RawMessage {
        RawMessage::from_text("telegram", "alpha_calls", text)
    }

    #[test]
    fn test_golden_path_signal() {
        let signals = extractor().extract(&msg(
            "🚀 BTC LONG Entry: $45,000 Target: $48,000 SL: $42,000",
        ));
        assert_eq!(signals.len(), 1);

        let signal = &signals[0];
        assert_eq!(signal.pair.to_string(), "BTC/USDT");
        assert_eq!(signal.direction, Direction::Long);
        assert_eq!(signal.entry, Some(dec!(45000)));
        assert_eq!(signal.targets, vec![dec!(48000)]);
        assert_eq!(signal.stop_loss, Some(dec!(42000)));
        assert!(signal.confidence >= 90);
        assert!(!signal.price_inconsistent);
        assert_eq!(signal.provenance.strategy, "labeled");
        assert_eq!(signal.provenance.source, "telegram");
    }

    #[test]
    fn test_clean_long_fixture_price_ordering() {
        let signals = extractor().extract(&msg(
            "ETH long setup. Entry: 3000, targets: 3200, 3400, SL: 2800",
        ));
        let signal = &signals[0];
        let entry = signal.entry.unwrap();
        assert!(signal.targets.iter().all(|t| *t > entry));
        assert!(signal.stop_loss.unwrap() < entry);
    }

    #[test]
    fn test_no_keywords_no_signal() {
        assert!(extractor()
            .extract(&msg("the price of bitcoin is at 50000"))
            .is_empty());
    }

    #[test]
    fn test_unknown_asset_no_signal() {
        assert!(extractor()
            .extract(&msg("LONG my favorite coin, entry 100"))
            .is_empty());
    }

    #[test]
    fn test_direction_tie_no_signal() {
        assert!(extractor()
            .extract(&msg("btc could go long or short from 45000"))
            .is_empty());
    }

    #[test]
    fn test_extraction_never_panics_on_garbage() {
        let ex = extractor();
        for text in ["", "🚀🚀🚀", "entry: ,,,", "........", "BTC LONG entry: 45.0.1"] {
            let _ = ex.extract(&msg(text));
        }
    }

    #[test]
    fn test_unlabeled_prices_fall_back_to_step() {
        let signals = extractor().extract(&msg("SOL long 130 150 110"));
        let signal = &signals[0];
        assert_eq!(signal.provenance.strategy, "step");
        assert_eq!(signal.entry, Some(dec!(130)));
        assert_eq!(signal.targets, vec![dec!(150)]);
        assert_eq!(signal.stop_loss, Some(dec!(110)));
    }

    #[test]
    fn test_step_extraction_short() {
        let signals = extractor().extract(&msg("shorting doge here 0.08 0.10 0.12"));
        let signal = &signals[0];
        assert_eq!(signal.direction, Direction::Short);
        assert_eq!(signal.entry, Some(dec!(0.10)));
        assert_eq!(signal.targets, vec![dec!(0.08)]);
        assert_eq!(signal.stop_loss, Some(dec!(0.12)));
    }

    #[test]
    fn test_leverage_and_horizon() {
        let signals = extractor().extract(&msg(
            "ETH LONG 10x entry 3000 tp 3500 sl 2800, 4h play",
        ));
        let signal = &signals[0];
        assert_eq!(signal.leverage, Some(10));
        assert_eq!(signal.time_horizon.as_deref(), Some("4h"));
        assert_eq!(signal.confidence, 100);
    }

    #[test]
    fn test_confidence_monotone_in_fields() {
        let ex = extractor();
        let fixtures = [
            "btc long entry 45000",
            "btc long entry 45000 target 48000",
            "btc long entry 45000 target 48000 sl 42000",
            "btc long entry 45000 target 48000 sl 42000 10x",
            "btc long entry 45000 target 48000 sl 42000 10x swing",
        ];
        let mut last = 0u8;
        for text in fixtures {
            let signals = ex.extract(&msg(text));
            assert_eq!(signals.len(), 1, "fixture produced no signal: {}", text);
            let confidence = signals[0].confidence;
            assert!(
                confidence >= last,
                "confidence dropped from {} to {} at: {}",
                last,
                confidence,
                text
            );
            last = confidence;
        }
    }

    #[test]
    fn test_inconsistent_long_is_flagged_not_rejected() {
        let signals = extractor().extract(&msg("BTC LONG entry 45000 target 43000 sl 42000"));
        assert_eq!(signals.len(), 1);
        assert!(signals[0].price_inconsistent);
    }

    #[test]
    fn test_multiple_signals_per_message() {
        let text = "BTC long entry 45000 tp 48000 sl 42000\n\n\
                    ETH short entry 3000 tp 2800 sl 3200";
        let signals = extractor().extract(&msg(text));
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].pair.base, "BTC");
        assert_eq!(signals[1].pair.base, "ETH");
        assert_eq!(signals[1].direction, Direction::Short);
        assert!(!signals[1].price_inconsistent);
    }

    #[test]
    fn test_batch_dedup_exact() {
        let ex = extractor();
        let a = msg("BTC LONG entry 45000 target 48000 sl 42000");
        let b = msg("BTC LONG entry 45000 target 48000 sl 42000");
        let signals = ex.extract_batch(&[a, b]);
        assert_eq!(signals.len(), 1);
    }

    #[test]
    fn test_batch_dedup_rounded_prices() {
        let ex = extractor();
        let a = msg("BTC LONG entry 45000.001 target 48000 sl 42000");
        let b = msg("BTC LONG entry 45000.004 target 48000 sl 42000");
        assert_eq!(ex.extract_batch(&[a, b]).len(), 1);
    }

    #[test]
    fn test_batch_keeps_distinct_signals() {
        let ex = extractor();
        let a = msg("BTC LONG entry 45000 target 48000 sl 42000");
        let b = msg("BTC SHORT entry 45000 target 42000 sl 48000");
        let c = msg("BTC LONG entry 45100 target 48000 sl 42000");
        assert_eq!(ex.extract_batch(&[a, b, c]).len(), 3);
    }

    #[test]
    fn test_alias_normalization_end_to_end() {
        for (alias, symbol) in [
            ("bitcoin", "BTC"),
            ("ethereum", "ETH"),
            ("ripple", "XRP"),
            ("dogecoin", "DOGE"),
        ] {
            let signals = extractor().extract(&msg(&format!(
                "{} long entry 100 target 120 sl 90",
                alias
            )));
            assert_eq!(signals[0].pair.base, symbol, "alias {}", alias);
        }
    }

    #[test]
    fn test_explicit_pair_kept() {
        let signals = extractor().extract(&msg("ETH/BTC long entry 0.05 target 0.06 sl 0.045"));
        assert_eq!(signals[0].pair.to_string(), "ETH/BTC");
    }
}
