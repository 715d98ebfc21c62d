//! Telegram notification module
//!
//! Sends validated signal alerts to a configured chat.

use crate::error::Result;
use crate::types::{Direction, ExtractedSignal};
use crate::validator::ValidationResult;
use reqwest::Client;
use serde::Serialize;

/// Telegram notifier
#[derive(Clone)]
pub struct Notifier {
    http: Client,
    bot_token: String,
    chat_id: String,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct TelegramMessage {
    chat_id: String,
    text: String,
    parse_mode: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            http: Client::new(),
            bot_token,
            chat_id,
            enabled: true,
        }
    }

    /// Create a disabled notifier (for when Telegram is not configured)
    pub fn disabled() -> Self {
        Self {
            http: Client::new(),
            bot_token: String::new(),
            chat_id: String::new(),
            enabled: false,
        }
    }

    /// Send a raw message (HTML format)
    pub async fn send(&self, text: &str) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.bot_token
        );

        let msg = TelegramMessage {
            chat_id: self.chat_id.clone(),
            text: text.to_string(),
            parse_mode: "HTML".to_string(),
        };

        let response = self.http.post(&url).json(&msg).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Telegram send failed: {}", error_text);
        }

        Ok(())
    }

    /// Notify about an extracted signal and its validation verdict
    pub async fn signal_alert(
        &self,
        signal: &ExtractedSignal,
        validation: &ValidationResult,
    ) -> Result<()> {
        self.send(&format_signal_alert(signal, validation)).await
    }
}

fn format_signal_alert(signal: &ExtractedSignal, validation: &ValidationResult) -> String {
    let side_emoji = match signal.direction {
        Direction::Long => "🟢",
        Direction::Short => "🔴",
    };

    let fmt_price = |p: &Option<rust_decimal::Decimal>| match p {
        Some(v) => v.to_string(),
        None => "-".to_string(),
    };
    let targets = if signal.targets.is_empty() {
        "-".to_string()
    } else {
        signal
            .targets
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut text = format!(
        "{} <b>{} {}</b>\n\n\
        Entry: <code>{}</code>\n\
        Targets: <code>{}</code>\n\
        Stop-loss: <code>{}</code>\n\
        Confidence: <code>{}</code>\n\
        Source: {} / {}\n\n\
        Liquidity: <code>{:.1}</code> | Volatility: <code>{}</code> | Valid: {}",
        side_emoji,
        signal.pair,
        signal.direction,
        fmt_price(&signal.entry),
        targets,
        fmt_price(&signal.stop_loss),
        signal.confidence,
        signal.provenance.source,
        truncate(&signal.provenance.channel, 40),
        validation.liquidity_score,
        validation.volatility,
        if validation.is_valid { "✅" } else { "❌" },
    );

    if let Some(leverage) = signal.leverage {
        text.push_str(&format!("\nLeverage: <code>{}x</code>", leverage));
    }
    if signal.price_inconsistent {
        text.push_str("\n⚠ price ordering does not match direction");
    }
    for warning in &validation.warnings {
        text.push_str(&format!("\n⚠ {}", warning));
    }

    text
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    } else {
        s.to_string()
    }
}
