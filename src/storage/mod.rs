//! Signal persistence
//!
//! Extracted signals and their validation verdicts are stored in SQLite.
//! Raw messages are deliberately not persisted: they only live until
//! extraction has run over them.

pub mod cache;

use crate::error::Result;
use crate::types::{Direction, ExtractedSignal, Provenance, TradingPair};
use crate::validator::ValidationResult;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use uuid::Uuid;

/// Database for storing extracted signals and validation verdicts
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to SQLite database (creates if not exists)
    pub async fn connect<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", path.as_ref().display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// In-memory database for tests and dry runs
    pub async fn in_memory() -> Result<Self> {
        // one connection: each sqlite :memory: connection is its own db
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS signals (
                id TEXT PRIMARY KEY,
                pair TEXT NOT NULL,
                direction TEXT NOT NULL,
                entry TEXT,
                targets TEXT NOT NULL,
                stop_loss TEXT,
                leverage INTEGER,
                time_horizon TEXT,
                confidence INTEGER NOT NULL,
                price_inconsistent INTEGER NOT NULL,
                source TEXT NOT NULL,
                channel TEXT NOT NULL,
                message_id TEXT NOT NULL,
                strategy TEXT NOT NULL,
                extracted_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_signals_extracted_at
            ON signals(extracted_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS validations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                pair TEXT NOT NULL,
                is_valid INTEGER NOT NULL,
                liquidity_score REAL NOT NULL,
                volatility TEXT NOT NULL,
                price_accuracy TEXT NOT NULL,
                warnings TEXT NOT NULL,
                checked_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save an extracted signal
    pub async fn save_signal(&self, signal: &ExtractedSignal) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO signals (
                id, pair, direction, entry, targets, stop_loss, leverage,
                time_horizon, confidence, price_inconsistent,
                source, channel, message_id, strategy, extracted_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(signal.id.to_string())
        .bind(signal.pair.to_string())
        .bind(signal.direction.as_str())
        .bind(signal.entry.map(|d| d.to_string()))
        .bind(serde_json::to_string(&signal.targets)?)
        .bind(signal.stop_loss.map(|d| d.to_string()))
        .bind(signal.leverage.map(|l| l as i64))
        .bind(signal.time_horizon.as_deref())
        .bind(signal.confidence as i64)
        .bind(signal.price_inconsistent as i64)
        .bind(&signal.provenance.source)
        .bind(&signal.provenance.channel)
        .bind(&signal.provenance.message_id)
        .bind(&signal.provenance.strategy)
        .bind(signal.extracted_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Save a validation verdict
    pub async fn save_validation(&self, result: &ValidationResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO validations (
                pair, is_valid, liquidity_score, volatility, price_accuracy,
                warnings, checked_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(result.pair.to_string())
        .bind(result.is_valid as i64)
        .bind(result.liquidity_score)
        .bind(result.volatility.as_str())
        .bind(result.price_accuracy.as_str())
        .bind(serde_json::to_string(&result.warnings)?)
        .bind(result.checked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get most recently extracted signals
    pub async fn recent_signals(&self, limit: i64) -> Result<Vec<ExtractedSignal>> {
        let rows = sqlx::query_as::<_, SignalRow>(
            r#"
            SELECT id, pair, direction, entry, targets, stop_loss, leverage,
                   time_horizon, confidence, price_inconsistent,
                   source, channel, message_id, strategy, extracted_at
            FROM signals
            ORDER BY extracted_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(|r| r.try_into().ok()).collect())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SignalRow {
    id: String,
    pair: String,
    direction: String,
    entry: Option<String>,
    targets: String,
    stop_loss: Option<String>,
    leverage: Option<i64>,
    time_horizon: Option<String>,
    confidence: i64,
    price_inconsistent: i64,
    source: String,
    channel: String,
    message_id: String,
    strategy: String,
    extracted_at: String,
}

impl TryFrom<SignalRow> for ExtractedSignal {
    type Error = String;

    fn try_from(row: SignalRow) -> std::result::Result<Self, Self::Error> {
        let parse_price = |s: Option<String>| -> std::result::Result<Option<Decimal>, String> {
            match s {
                Some(raw) => raw
                    .parse::<Decimal>()
                    .map(Some)
                    .map_err(|e| format!("bad price {}: {}", raw, e)),
                None => Ok(None),
            }
        };

        let targets: Vec<Decimal> =
            serde_json::from_str(&row.targets).map_err(|e| e.to_string())?;

        Ok(ExtractedSignal {
            id: Uuid::parse_str(&row.id).map_err(|e| e.to_string())?,
            pair: TradingPair::parse(&row.pair, "USDT").ok_or("bad pair")?,
            direction: row.direction.parse::<Direction>()?,
            entry: parse_price(row.entry)?,
            targets,
            stop_loss: parse_price(row.stop_loss)?,
            leverage: row.leverage.map(|l| l as u32),
            time_horizon: row.time_horizon,
            confidence: row.confidence as u8,
            price_inconsistent: row.price_inconsistent != 0,
            provenance: Provenance {
                source: row.source,
                channel: row.channel,
                message_id: row.message_id,
                strategy: row.strategy,
            },
            extracted_at: DateTime::parse_from_rfc3339(&row.extracted_at)
                .map_err(|e| e.to_string())?
                .with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_signal() -> ExtractedSignal {
        ExtractedSignal {
            id: Uuid::new_v4(),
            pair: TradingPair::new("BTC", "USDT"),
            direction: Direction::Long,
            entry: Some(dec!(45000)),
            targets: vec![dec!(48000), dec!(50000)],
            stop_loss: Some(dec!(42000)),
            leverage: Some(10),
            time_horizon: Some("4h".to_string()),
            confidence: 100,
            price_inconsistent: false,
            provenance: Provenance {
                source: "telegram".to_string(),
                channel: "alpha_calls".to_string(),
                message_id: "42".to_string(),
                strategy: "labeled".to_string(),
            },
            extracted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_read_signal() {
        let db = Database::in_memory().await.unwrap();
        let signal = sample_signal();
        db.save_signal(&signal).await.unwrap();

        let stored = db.recent_signals(10).await.unwrap();
        assert_eq!(stored.len(), 1);

        let read = &stored[0];
        assert_eq!(read.id, signal.id);
        assert_eq!(read.pair, signal.pair);
        assert_eq!(read.direction, Direction::Long);
        assert_eq!(read.entry, Some(dec!(45000)));
        assert_eq!(read.targets, vec![dec!(48000), dec!(50000)]);
        assert_eq!(read.stop_loss, Some(dec!(42000)));
        assert_eq!(read.leverage, Some(10));
        assert_eq!(read.confidence, 100);
        assert_eq!(read.provenance.channel, "alpha_calls");
    }

    #[tokio::test]
    async fn test_signal_without_prices_roundtrips() {
        let db = Database::in_memory().await.unwrap();
        let mut signal = sample_signal();
        signal.entry = None;
        signal.targets = vec![];
        signal.stop_loss = None;
        signal.leverage = None;
        signal.time_horizon = None;

        db.save_signal(&signal).await.unwrap();
        let stored = db.recent_signals(10).await.unwrap();
        assert_eq!(stored[0].entry, None);
        assert!(stored[0].targets.is_empty());
        assert_eq!(stored[0].leverage, None);
    }

    #[tokio::test]
    async fn test_save_validation() {
        use crate::validator::{PriceAccuracyBucket, VolatilityBucket};

        let db = Database::in_memory().await.unwrap();
        let result = ValidationResult {
            pair: TradingPair::new("BTC", "USDT"),
            quotes: vec![],
            liquidity_score: 0.0,
            volatility: VolatilityBucket::VeryLow,
            price_accuracy: PriceAccuracyBucket::Low,
            is_valid: false,
            warnings: vec!["BTC/USDT not found on any exchange".to_string()],
            recommendations: vec!["do not trade this signal".to_string()],
            checked_at: Utc::now(),
        };
        db.save_validation(&result).await.unwrap();
    }

    #[tokio::test]
    async fn test_recent_signals_respects_limit() {
        let db = Database::in_memory().await.unwrap();
        for _ in 0..5 {
            let mut signal = sample_signal();
            signal.id = Uuid::new_v4();
            db.save_signal(&signal).await.unwrap();
        }
        assert_eq!(db.recent_signals(3).await.unwrap().len(), 3);
    }
}
