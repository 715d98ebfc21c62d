//! Direction detection
//!
//! Lexicon approach over keywords and emojis: the side with strictly more
//! hits wins; a tie or zero hits yields no direction and therefore no
//! signal.

use crate::types::Direction;
use std::collections::HashSet;

const LONG_TERMS: &[&str] = &[
    "long",
    "longing",
    "buy",
    "buying",
    "bull",
    "bullish",
    "moon",
    "mooning",
    "pump",
    "pumping",
    "breakout",
    "accumulate",
    "accumulating",
    "calls",
];

const SHORT_TERMS: &[&str] = &[
    "short",
    "shorting",
    "sell",
    "selling",
    "bear",
    "bearish",
    "dump",
    "dumping",
    "crash",
    "crashing",
    "breakdown",
    "puts",
];

const LONG_EMOJI: &[char] = &['🚀', '📈', '🟢', '💎', '🐂', '⬆'];
const SHORT_EMOJI: &[char] = &['📉', '🔴', '🐻', '⬇'];

pub struct DirectionDetector {
    long_terms: HashSet<&'static str>,
    short_terms: HashSet<&'static str>,
    long_emoji: HashSet<char>,
    short_emoji: HashSet<char>,
}

impl DirectionDetector {
    pub fn new() -> Self {
        Self {
            long_terms: LONG_TERMS.iter().copied().collect(),
            short_terms: SHORT_TERMS.iter().copied().collect(),
            long_emoji: LONG_EMOJI.iter().copied().collect(),
            short_emoji: SHORT_EMOJI.iter().copied().collect(),
        }
    }

    /// Detect the trade direction of a message block, if any.
    pub fn detect(&self, text: &str) -> Option<Direction> {
        let lower = text.to_lowercase();
        let mut long_hits = 0usize;
        let mut short_hits = 0usize;

        for word in lower.split_whitespace() {
            let cleaned: String = word.chars().filter(|c| c.is_alphanumeric()).collect();
            if self.long_terms.contains(cleaned.as_str()) {
                long_hits += 1;
            } else if self.short_terms.contains(cleaned.as_str()) {
                short_hits += 1;
            }
        }

        for c in text.chars() {
            if self.long_emoji.contains(&c) {
                long_hits += 1;
            } else if self.short_emoji.contains(&c) {
                short_hits += 1;
            }
        }

        match long_hits.cmp(&short_hits) {
            std::cmp::Ordering::Greater => Some(Direction::Long),
            std::cmp::Ordering::Less => Some(Direction::Short),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl Default for DirectionDetector {
    fn default() -> Self {
        Self::new()
    }
}
