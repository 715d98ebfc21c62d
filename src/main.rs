//! Signalhound CLI
//!
//! Scrapes trading calls from Telegram and Reddit, extracts structured
//! signals and validates them against live exchange data.

use clap::{Parser, Subcommand};
use signalhound::{
    config::Config,
    extractor::SignalExtractor,
    ingester::{reddit::RedditSource, source::SourceAggregator, telegram::TelegramSource, RawMessage},
    notify::Notifier,
    pipeline::SignalPipeline,
    storage::Database,
    types::TradingPair,
    validator::SignalValidator,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "signalhound")]
#[command(about = "Trading-signal extraction and validation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scraping pipeline
    Run {
        /// Dry run mode (no persistence, no alerts)
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract signals from a message given on the command line
    Extract {
        /// Message text
        text: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a symbol against the exchanges
    Validate {
        /// Symbol or pair, e.g. BTC or ETH/BTC
        symbol: String,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show recently stored signals
    Recent {
        /// Number of signals to show
        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run { dry_run } => run_pipeline(config, dry_run).await,
        Commands::Extract { text, json } => extract_once(config, &text, json),
        Commands::Validate { symbol, json } => validate_once(config, &symbol, json).await,
        Commands::Recent { limit } => show_recent(config, limit).await,
    }
}

async fn run_pipeline(config: Config, dry_run: bool) -> anyhow::Result<()> {
    tracing::info!("Starting signal pipeline");
    if dry_run {
        tracing::warn!("Running in DRY RUN mode - nothing will be stored or sent");
    }

    let mut aggregator = SourceAggregator::new();
    if let Some(telegram) = config.sources.telegram.clone() {
        aggregator.add_source(Arc::new(TelegramSource::new(telegram)?));
    }
    if let Some(reddit) = config.sources.reddit.clone() {
        aggregator.add_source(Arc::new(RedditSource::new(reddit)?));
    }
    if aggregator.is_empty() {
        anyhow::bail!(
            "no sources configured; add [sources.telegram] or [sources.reddit] to the config"
        );
    }

    let extractor = SignalExtractor::new(config.extraction.clone());
    let validator = Arc::new(SignalValidator::new(&config.validation)?);
    let db = if dry_run {
        None
    } else {
        Some(Database::connect(&config.storage.path).await?)
    };
    let notifier = match &config.notify {
        Some(notify) => Notifier::new(notify.bot_token.clone(), notify.chat_id.clone()),
        None => Notifier::disabled(),
    };

    let pipeline = SignalPipeline::new(
        extractor,
        validator,
        db,
        notifier,
        config.extraction.min_confidence,
        dry_run,
    );

    let (tx, rx) = tokio::sync::mpsc::channel(256);
    tokio::spawn(async move {
        let _ = aggregator.run(tx).await;
    });

    pipeline.run(rx).await?;
    Ok(())
}

fn extract_once(config: Config, text: &str, json: bool) -> anyhow::Result<()> {
    let extractor = SignalExtractor::new(config.extraction);
    let msg = RawMessage::from_text("cli", "cli", text);
    let signals = extractor.extract(&msg);

    if json {
        println!("{}", serde_json::to_string_pretty(&signals)?);
        return Ok(());
    }

    if signals.is_empty() {
        println!("No signals found.");
        return Ok(());
    }

    for signal in &signals {
        println!(
            "{} {} | entry {} | targets [{}] | stop {} | confidence {}{}",
            signal.pair,
            signal.direction,
            fmt_opt_price(&signal.entry),
            signal
                .targets
                .iter()
                .map(|t| t.to_string())
                .collect::<Vec<_>>()
                .join(", "),
            fmt_opt_price(&signal.stop_loss),
            signal.confidence,
            if signal.price_inconsistent {
                " (inconsistent prices)"
            } else {
                ""
            },
        );
    }

    Ok(())
}

async fn validate_once(config: Config, symbol: &str, json: bool) -> anyhow::Result<()> {
    let pair = TradingPair::parse(symbol, &config.extraction.default_quote)
        .ok_or_else(|| anyhow::anyhow!("invalid symbol: {}", symbol))?;

    let validator = SignalValidator::new(&config.validation)?;
    let result = validator.validate(&pair).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\n📊 Validation for {}\n", result.pair);
    if result.quotes.is_empty() {
        println!("Not listed on any configured exchange.");
    }
    for quote in &result.quotes {
        println!(
            "  {:<8} last {:>14} | 24h vol ${:>14.0} | 24h change {:>+7.2}%",
            quote.exchange, quote.last_price, quote.quote_volume_24h, quote.change_pct_24h
        );
    }
    println!("\nLiquidity score: {:.1}", result.liquidity_score);
    println!("Volatility:      {}", result.volatility);
    println!("Price accuracy:  {}", result.price_accuracy);
    println!("Valid:           {}", if result.is_valid { "yes" } else { "no" });

    for warning in &result.warnings {
        println!("⚠ {}", warning);
    }
    for recommendation in &result.recommendations {
        println!("- {}", recommendation);
    }

    Ok(())
}

async fn show_recent(config: Config, limit: i64) -> anyhow::Result<()> {
    let db = Database::connect(&config.storage.path).await?;
    let signals = db.recent_signals(limit).await?;

    if signals.is_empty() {
        println!("No stored signals.");
        return Ok(());
    }

    println!(
        "{:<12} {:<6} {:>12} {:>12} {:>12} {:>6}  {}",
        "Pair", "Dir", "Entry", "Target", "Stop", "Conf", "Source"
    );
    println!("{}", "-".repeat(80));

    for signal in &signals {
        println!(
            "{:<12} {:<6} {:>12} {:>12} {:>12} {:>6}  {}/{}",
            signal.pair.to_string(),
            signal.direction.as_str(),
            fmt_opt_price(&signal.entry),
            signal
                .targets
                .first()
                .map(|t| t.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fmt_opt_price(&signal.stop_loss),
            signal.confidence,
            signal.provenance.source,
            signal.provenance.channel,
        );
    }

    Ok(())
}

fn fmt_opt_price(price: &Option<rust_decimal::Decimal>) -> String {
    price
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string())
}
