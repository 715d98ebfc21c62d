//! Trading-signal extraction from free text
//!
//! Layered heuristics: allow-list asset detection, lexicon direction
//! scoring, labeled price extraction with a positional fallback, additive
//! confidence scoring and batch-level duplicate suppression.
//!
//! Extraction never fails: a message that yields nothing produces an
//! empty list, and malformed numeric tokens are skipped silently.

pub mod assets;
pub mod direction;
pub mod prices;
pub mod strategy;

#[cfg(test)]
mod tests;

use crate::config::ExtractionConfig;
use crate::ingester::RawMessage;
use crate::types::{price_ordering_consistent, ExtractedSignal, Provenance};
use assets::AssetTable;
use chrono::Utc;
use direction::DirectionDetector;
use std::collections::HashSet;
use strategy::{ExtractionStrategy, LabeledPriceStrategy, PriceFields, StepPriceStrategy};
use uuid::Uuid;

pub struct SignalExtractor {
    assets: AssetTable,
    direction: DirectionDetector,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    config: ExtractionConfig,
}

impl SignalExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        let strategies: Vec<Box<dyn ExtractionStrategy>> = vec![
            Box::new(LabeledPriceStrategy::new(config.max_targets)),
            Box::new(StepPriceStrategy),
        ];
        Self {
            assets: AssetTable::new(),
            direction: DirectionDetector::new(),
            strategies,
            config,
        }
    }

    /// Extract all signals from one message; empty when nothing matches.
    ///
    /// Paragraphs are treated as candidate signal blocks so one message
    /// can carry several signals.
    pub fn extract(&self, msg: &RawMessage) -> Vec<ExtractedSignal> {
        let blocks: Vec<&str> = msg
            .text
            .split("\n\n")
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .collect();

        let mut out: Vec<ExtractedSignal> = blocks
            .iter()
            .filter_map(|block| self.extract_block(block, msg))
            .collect();

        // a signal spread across paragraphs is only visible on the whole text
        if out.is_empty() && blocks.len() > 1 {
            out.extend(self.extract_block(&msg.text, msg));
        }

        out
    }

    /// Extract from a batch of messages with duplicate suppression:
    /// structurally identical signals keep only their first occurrence.
    pub fn extract_batch(&self, msgs: &[RawMessage]) -> Vec<ExtractedSignal> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::new();

        for msg in msgs {
            for signal in self.extract(msg) {
                if seen.insert(signal.dedup_key()) {
                    out.push(signal);
                } else {
                    tracing::debug!("Dropping duplicate signal {}", signal.dedup_key());
                }
            }
        }

        out
    }

    fn extract_block(&self, text: &str, msg: &RawMessage) -> Option<ExtractedSignal> {
        let pair = self.assets.detect(text, &self.config.default_quote)?;
        let direction = self.direction.detect(text)?;

        let (strategy_name, fields) = self
            .strategies
            .iter()
            .find_map(|s| s.extract(text, direction).map(|f| (s.name(), f)))?;

        let lower = text.to_lowercase();
        let numbers = prices::scan_numbers(&lower);
        let leverage = prices::detect_leverage(&lower, &numbers);
        let time_horizon = detect_time_horizon(&lower);

        let price_inconsistent = !price_ordering_consistent(
            direction,
            fields.entry.as_ref(),
            &fields.targets,
            fields.stop_loss.as_ref(),
        );
        if price_inconsistent {
            tracing::warn!(
                "{} {} signal from {}/{} has inconsistent price ordering",
                pair,
                direction,
                msg.source,
                msg.channel
            );
        }

        let confidence = confidence_score(&fields, leverage.is_some(), time_horizon.is_some());

        Some(ExtractedSignal {
            id: Uuid::new_v4(),
            pair,
            direction,
            entry: fields.entry,
            targets: fields.targets,
            stop_loss: fields.stop_loss,
            leverage,
            time_horizon,
            confidence,
            price_inconsistent,
            provenance: Provenance {
                source: msg.source.clone(),
                channel: msg.channel.clone(),
                message_id: msg.message_id.clone(),
                strategy: strategy_name.to_string(),
            },
            extracted_at: Utc::now(),
        })
    }
}

/// Additive completeness score, capped at 100. Asset and direction are
/// guaranteed present by construction and contribute the 40-point base.
fn confidence_score(fields: &PriceFields, has_leverage: bool, has_horizon: bool) -> u8 {
    let mut score: u8 = 40;
    if fields.entry.is_some() {
        score += 20;
    }
    if !fields.targets.is_empty() {
        score += 15;
    }
    if fields.stop_loss.is_some() {
        score += 15;
    }
    if has_leverage {
        score += 5;
    }
    if has_horizon {
        score += 5;
    }
    score.min(100)
}

/// Time horizon: timeframe shorthand ("4h", "1d") or trading-style words.
fn detect_time_horizon(lower: &str) -> Option<String> {
    const HORIZON_WORDS: &[&str] = &[
        "scalp",
        "intraday",
        "daytrade",
        "swing",
        "short-term",
        "mid-term",
        "long-term",
    ];

    for word in lower.split_whitespace() {
        let w = word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-');
        if w.is_empty() {
            continue;
        }
        if HORIZON_WORDS.contains(&w) {
            return Some(w.to_string());
        }
        if w.len() >= 2 {
            let (digits, unit) = w.split_at(w.len() - 1);
            if digits.chars().all(|c| c.is_ascii_digit())
                && matches!(unit, "m" | "h" | "d" | "w")
            {
                return Some(w.to_string());
            }
        }
    }

    None
}
