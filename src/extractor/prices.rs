//! Numeric field extraction from free text
//!
//! Prices are pulled out with plain string scanning: field labels are
//! located by substring search on word boundaries, and numbers are parsed
//! from the characters that follow. Thousands separators, currency sigils
//! and "45k" shorthand are normalized before parsing. Malformed numeric
//! tokens are skipped silently.

use crate::types::Direction;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Labels announcing an entry price, highest priority first.
pub const ENTRY_LABELS: &[&str] = &[
    "entry zone",
    "buy zone",
    "entry price",
    "entry",
    "long at",
    "short at",
    "buy",
    "open",
    "@",
];

/// Labels announcing target prices, highest priority first.
pub const TARGET_LABELS: &[&str] = &["take profit", "take-profit", "targets", "target", "tp"];

/// Labels announcing a stop-loss, highest priority first.
pub const STOP_LABELS: &[&str] = &["stop loss", "stop-loss", "stoploss", "stop", "sl"];

/// Max bytes between a label and its first number.
const MAX_LABEL_GAP: usize = 16;
/// Max bytes between consecutive numbers of a price list.
const MAX_LIST_GAP: usize = 8;

/// Characters that may separate a label from its numbers, or list entries
/// from each other. Anything else (in particular letters) ends the field.
const SEPARATOR_CHARS: &str = " \t\r\n,:;/\\-\u{2013}\u{2014}&+()$@=*#~>|";

/// A numeric token located in text.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedNumber {
    pub value: Decimal,
    /// Byte offset of the first digit
    pub start: usize,
    /// Byte offset one past the token (including a consumed k-suffix)
    pub end: usize,
    /// Leverage notation ("10x", "x20")
    pub leverage: bool,
    /// Percentage ("5%")
    pub percent: bool,
    /// Glued to a word ("tp1", "4h")
    pub attached: bool,
    /// List index ("target 1:", "2)")
    pub ordinal: bool,
}

impl ScannedNumber {
    /// Token is usable as a price.
    pub fn is_price(&self) -> bool {
        !self.leverage
            && !self.percent
            && !self.attached
            && !self.ordinal
            && self.value > Decimal::ZERO
    }
}

/// Parse a human-formatted number: "45,000", "$45000", "45k", "0.00012".
pub fn parse_number(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let (digits, multiplier) = match cleaned.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, Decimal::from(1000)),
        None => (cleaned.as_str(), Decimal::ONE),
    };
    digits.parse::<Decimal>().ok().map(|v| v * multiplier)
}

/// Scan all numeric tokens in `text`, classifying leverage / percent /
/// attached / ordinal tokens so callers can filter price candidates.
pub fn scan_numbers(text: &str) -> Vec<ScannedNumber> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let len = chars.len();
    let mut out = Vec::new();
    let mut i = 0;

    while i < len {
        if !chars[i].1.is_ascii_digit() {
            i += 1;
            continue;
        }

        let run_start = i;
        let mut j = i;
        while j < len && (chars[j].1.is_ascii_digit() || chars[j].1 == ',' || chars[j].1 == '.') {
            j += 1;
        }
        // trailing separators belong to the sentence, not the number
        let mut run_end = j;
        while run_end > run_start && !chars[run_end - 1].1.is_ascii_digit() {
            run_end -= 1;
        }

        let start_byte = chars[run_start].0;
        let end_byte = if run_end < len {
            chars[run_end].0
        } else {
            text.len()
        };
        let raw = &text[start_byte..end_byte];

        let prev = if run_start > 0 {
            Some(chars[run_start - 1].1)
        } else {
            None
        };
        let next = if run_end < len {
            Some(chars[run_end].1)
        } else {
            None
        };

        // "45k" shorthand
        let mut token_end = end_byte;
        let mut multiplier = Decimal::ONE;
        let mut consumed_suffix = false;
        if matches!(next, Some('k') | Some('K')) {
            let after = chars.get(run_end + 1).map(|(_, c)| *c);
            if !after.is_some_and(|c| c.is_alphanumeric()) {
                multiplier = Decimal::from(1000);
                token_end = chars
                    .get(run_end + 1)
                    .map(|(p, _)| *p)
                    .unwrap_or(text.len());
                consumed_suffix = true;
            }
        }

        let mut leverage = false;
        let mut percent = false;
        let mut attached = prev.is_some_and(|c| c.is_alphanumeric());
        if !consumed_suffix {
            match next {
                Some('%') => percent = true,
                Some('x') | Some('X') => {
                    let after = chars.get(run_end + 1).map(|(_, c)| *c);
                    if after.is_some_and(|c| c.is_alphanumeric()) {
                        attached = true;
                    } else {
                        leverage = true;
                    }
                }
                Some(c) if c.is_alphabetic() => attached = true,
                _ => {}
            }
        }
        // "x10" prefix form
        if matches!(prev, Some('x') | Some('X')) {
            let before = if run_start >= 2 {
                Some(chars[run_start - 2].1)
            } else {
                None
            };
            if !before.is_some_and(|c| c.is_alphanumeric()) {
                leverage = true;
                attached = false;
            }
        }

        if let Some(value) = parse_number(raw).map(|v| v * multiplier) {
            let next_visible = chars[run_end..]
                .iter()
                .map(|(_, c)| *c)
                .find(|c| *c != ' ');
            let small_int = value.is_integer() && value <= Decimal::TEN;
            let ordinal = small_int && matches!(next_visible, Some(':') | Some(')'));

            out.push(ScannedNumber {
                value,
                start: start_byte,
                end: token_end,
                leverage,
                percent,
                attached,
                ordinal,
            });
        }

        i = if consumed_suffix { run_end + 1 } else { run_end };
    }

    out
}

/// Byte offsets just past each word-boundary occurrence of `label`.
fn label_positions(text: &str, label: &str) -> Vec<usize> {
    let mut out = Vec::new();
    for (pos, _) in text.match_indices(label) {
        let before_ok = text[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        // digits after the label are fine: "tp1", "target2"
        let after_ok = text[pos + label.len()..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphabetic());
        if before_ok && after_ok {
            out.push(pos + label.len());
        }
    }
    out
}

/// True when the span holds only list separators (or the word "and").
fn list_separated(text: &str, from: usize, to: usize) -> bool {
    if to < from {
        return false;
    }
    let Some(slice) = text.get(from..to) else {
        return false;
    };
    slice
        .split_whitespace()
        .all(|w| w == "and" || w.chars().all(|c| SEPARATOR_CHARS.contains(c)))
}

/// Walk the numbers following a label position, skipping list ordinals and
/// stopping at the first token that is not part of the price list.
fn collect_after(
    text: &str,
    label_end: usize,
    numbers: &[ScannedNumber],
    max: usize,
) -> Vec<Decimal> {
    let mut out = Vec::new();
    let mut cursor = label_end;
    let mut limit = MAX_LABEL_GAP;

    for n in numbers.iter().filter(|n| n.start >= label_end) {
        if n.start - cursor > limit || !list_separated(text, cursor, n.start) {
            break;
        }
        if n.ordinal {
            cursor = n.end;
            continue;
        }
        if !n.is_price() {
            break;
        }
        out.push(n.value);
        cursor = n.end;
        limit = MAX_LIST_GAP;
        if out.len() == max {
            break;
        }
    }

    out
}

/// First number following any of the labels, labels tried in priority order.
pub fn labeled_number(text: &str, labels: &[&str], numbers: &[ScannedNumber]) -> Option<Decimal> {
    labeled_numbers(text, labels, numbers, 1).first().copied()
}

/// Up to `max` list-separated numbers following any of the labels.
pub fn labeled_numbers(
    text: &str,
    labels: &[&str],
    numbers: &[ScannedNumber],
    max: usize,
) -> Vec<Decimal> {
    for label in labels {
        for label_end in label_positions(text, label) {
            let found = collect_after(text, label_end, numbers, max);
            if !found.is_empty() {
                return found;
            }
        }
    }
    Vec::new()
}

/// Leverage from "10x" / "x10" notation or a "leverage: 10" label.
pub fn detect_leverage(text: &str, numbers: &[ScannedNumber]) -> Option<u32> {
    let value = numbers
        .iter()
        .find(|n| n.leverage)
        .map(|n| n.value)
        .or_else(|| labeled_number(text, &["leverage", "lev"], numbers))?;

    if value.is_integer() && value >= Decimal::ONE && value <= Decimal::from(125) {
        value.to_u32()
    } else {
        None
    }
}

/// Direction-dependent positional assignment over sorted price tokens:
/// the median is taken as entry and the extremes as target and stop.
pub fn step_assign(
    direction: Direction,
    sorted: &[Decimal],
) -> (Option<Decimal>, Vec<Decimal>, Option<Decimal>) {
    match sorted.len() {
        0 => (None, Vec::new(), None),
        1 => (Some(sorted[0]), Vec::new(), None),
        2 => match direction {
            Direction::Long => (Some(sorted[0]), vec![sorted[1]], None),
            Direction::Short => (Some(sorted[1]), vec![sorted[0]], None),
        },
        n => {
            let median = sorted[n / 2];
            match direction {
                Direction::Long => (Some(median), vec![sorted[n - 1]], Some(sorted[0])),
                Direction::Short => (Some(median), vec![sorted[0]], Some(sorted[n - 1])),
            }
        }
    }
}
