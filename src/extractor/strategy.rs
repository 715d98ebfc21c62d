//! Ordered, named extraction strategies
//!
//! Price extraction precedence is explicit: strategies are applied in
//! order and the first one to produce any price field wins. The strategy
//! name is recorded in the signal's provenance.

use super::prices::{
    self, scan_numbers, ENTRY_LABELS, STOP_LABELS, TARGET_LABELS,
};
use crate::types::Direction;
use rust_decimal::Decimal;

/// Price fields extracted by one strategy from one message block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFields {
    pub entry: Option<Decimal>,
    pub targets: Vec<Decimal>,
    pub stop_loss: Option<Decimal>,
}

impl PriceFields {
    pub fn is_empty(&self) -> bool {
        self.entry.is_none() && self.targets.is_empty() && self.stop_loss.is_none()
    }
}

/// One price-extraction heuristic.
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy name recorded in signal provenance.
    fn name(&self) -> &'static str;

    /// Try to extract price fields; `None` when this strategy finds nothing.
    /// `text` is the raw message block; case is handled internally.
    fn extract(&self, text: &str, direction: Direction) -> Option<PriceFields>;
}

/// Labeled extraction: per-field ordered label lists ("Entry:", "TP",
/// "SL") with the first matching label determining the value.
pub struct LabeledPriceStrategy {
    max_targets: usize,
}

impl LabeledPriceStrategy {
    pub fn new(max_targets: usize) -> Self {
        Self { max_targets }
    }
}

impl ExtractionStrategy for LabeledPriceStrategy {
    fn name(&self) -> &'static str {
        "labeled"
    }

    fn extract(&self, text: &str, _direction: Direction) -> Option<PriceFields> {
        let lower = text.to_lowercase();
        let numbers = scan_numbers(&lower);

        let fields = PriceFields {
            entry: prices::labeled_number(&lower, ENTRY_LABELS, &numbers),
            targets: prices::labeled_numbers(&lower, TARGET_LABELS, &numbers, self.max_targets),
            stop_loss: prices::labeled_number(&lower, STOP_LABELS, &numbers),
        };

        if fields.is_empty() {
            None
        } else {
            Some(fields)
        }
    }
}

/// Positional fallback: collect every plausible price token, sort, and
/// assign entry/target/stop by direction-dependent position. Raises recall
/// at the cost of precision; only runs when labeled extraction found
/// nothing.
pub struct StepPriceStrategy;

impl ExtractionStrategy for StepPriceStrategy {
    fn name(&self) -> &'static str {
        "step"
    }

    fn extract(&self, text: &str, direction: Direction) -> Option<PriceFields> {
        let lower = text.to_lowercase();
        let mut values: Vec<Decimal> = scan_numbers(&lower)
            .iter()
            .filter(|n| n.is_price())
            .map(|n| n.value)
            .collect();

        if values.is_empty() {
            return None;
        }

        values.sort();
        values.dedup();

        let (entry, targets, stop_loss) = prices::step_assign(direction, &values);
        Some(PriceFields {
            entry,
            targets,
            stop_loss,
        })
    }
}
