//! End-to-end pipeline
//!
//! Wires ingestion into extraction, per-batch duplicate suppression,
//! exchange validation, persistence and notification. Single-process
//! async; no ordering guarantees between messages beyond batch-level
//! duplicate suppression.

use crate::error::Result;
use crate::extractor::SignalExtractor;
use crate::ingester::RawMessage;
use crate::notify::Notifier;
use crate::storage::Database;
use crate::types::ExtractedSignal;
use crate::validator::{SignalValidator, ValidationResult};
use std::sync::Arc;
use tokio::sync::mpsc;

const BATCH_SIZE: usize = 32;

pub struct SignalPipeline {
    extractor: SignalExtractor,
    validator: Arc<SignalValidator>,
    db: Option<Database>,
    notifier: Notifier,
    min_confidence: u8,
    dry_run: bool,
}

impl SignalPipeline {
    pub fn new(
        extractor: SignalExtractor,
        validator: Arc<SignalValidator>,
        db: Option<Database>,
        notifier: Notifier,
        min_confidence: u8,
        dry_run: bool,
    ) -> Self {
        Self {
            extractor,
            validator,
            db,
            notifier,
            min_confidence,
            dry_run,
        }
    }

    /// Consume messages in batches until the channel closes.
    pub async fn run(&self, mut rx: mpsc::Receiver<RawMessage>) -> Result<()> {
        let mut buf = Vec::with_capacity(BATCH_SIZE);

        loop {
            buf.clear();
            let received = rx.recv_many(&mut buf, BATCH_SIZE).await;
            if received == 0 {
                // all senders dropped
                break;
            }
            self.process_batch(&buf).await;
        }

        tracing::info!("Pipeline shutting down, message channel closed");
        Ok(())
    }

    /// Extract, deduplicate, validate and fan out one batch of messages.
    ///
    /// Best-effort all the way down: storage or notification failures are
    /// logged and the batch keeps going.
    pub async fn process_batch(
        &self,
        messages: &[RawMessage],
    ) -> Vec<(ExtractedSignal, ValidationResult)> {
        let signals = self.extractor.extract_batch(messages);
        if signals.is_empty() {
            return Vec::new();
        }
        tracing::info!(
            "Extracted {} signals from {} messages",
            signals.len(),
            messages.len()
        );

        let mut out = Vec::new();
        for signal in signals {
            if signal.confidence < self.min_confidence {
                tracing::debug!(
                    "Skipping low-confidence ({}) signal for {}",
                    signal.confidence,
                    signal.pair
                );
                continue;
            }

            let validation = self.validator.validate(&signal.pair).await;
            tracing::info!(
                "{} {} | confidence {} | liquidity {:.1} | valid: {}",
                signal.pair,
                signal.direction,
                signal.confidence,
                validation.liquidity_score,
                validation.is_valid
            );

            if !self.dry_run {
                if let Some(db) = &self.db {
                    if let Err(e) = db.save_signal(&signal).await {
                        tracing::warn!("Failed to store signal: {}", e);
                    }
                    if let Err(e) = db.save_validation(&validation).await {
                        tracing::warn!("Failed to store validation: {}", e);
                    }
                }
                if validation.is_valid {
                    if let Err(e) = self.notifier.signal_alert(&signal, &validation).await {
                        tracing::warn!("Failed to send alert: {}", e);
                    }
                }
            }

            out.push((signal, validation));
        }

        out
    }
}
