//! sentibot: news-sentiment trading bot with ATR/VaR-based risk sizing.
//!
//! Once per cycle the bot fetches daily bars, the latest price, account
//! cash, and a news-sentiment signal, then decides whether to open a
//! bracketed position, halt and liquidate, or do nothing.

mod api;
mod bot;
mod error;
mod models;
mod risk;
mod trading;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::api::{AlpacaBrokerClient, AlpacaCredentials, AlpacaDataClient, SentimentClient};
use crate::bot::{Bot, BotConfig};
use crate::trading::RiskConfig;

/// Sentiment-driven trading bot CLI.
#[derive(Parser)]
#[command(name = "sentibot")]
#[command(about = "Trade a symbol on news sentiment with risk-bounded bracket orders", long_about = None)]
struct Cli {
    /// Symbol to trade
    #[arg(short, long, default_value = "SPY")]
    symbol: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Sentiment inference endpoint
    #[arg(long, env = "SENTIMENT_URL", default_value = "http://localhost:8000/sentiment")]
    sentiment_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the trading loop
    Run {
        /// Seconds between decision cycles
        #[arg(short, long, default_value = "21600")]
        interval: u64,

        /// Days of daily bars per cycle
        #[arg(long, default_value = "365")]
        lookback: i64,

        /// Dry run (don't submit orders)
        #[arg(long)]
        dry_run: bool,
    },

    /// Evaluate a single cycle and print the decision (never submits)
    Decide {
        /// Days of daily bars to evaluate
        #[arg(long, default_value = "365")]
        lookback: i64,
    },

    /// Show the risk configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Run {
            interval,
            lookback,
            dry_run,
        } => {
            let mut bot = build_bot(&cli, interval, lookback, dry_run).await?;

            println!("\n=== sentibot ===");
            println!("Symbol:   {}", cli.symbol);
            println!("Interval: {}s", interval);
            println!(
                "Mode:     {}",
                if dry_run { "DRY RUN (no orders)" } else { "LIVE TRADING" }
            );
            println!("\nPress Ctrl+C to stop.\n");

            if let Err(e) = bot.run().await {
                tracing::error!(error = %e, "Bot error");
            }

            println!("\n{}", bot.stats());
        }

        Commands::Decide { lookback } => {
            info!(symbol = %cli.symbol, "Evaluating one cycle");

            let mut bot = build_bot(&cli, 1, lookback, true).await?;
            let decision = bot.run_once().await.context("Cycle failed")?;

            println!("\nDecision: {decision:?}");
        }

        Commands::Config => {
            let config = RiskConfig::default();

            println!("\n=== Risk Configuration ===\n");
            println!("Risk cap:                {}", config.risk_cap);
            println!("Take-profit ATR mult:    {}", config.atr_multiple_tp);
            println!("Stop-loss ATR mult:      {}", config.atr_multiple_sl);
            println!("Max loss per trade:      {}%", config.max_loss_per_trade * 100.0);
            println!("Probability threshold:   {}", config.probability_threshold);
            println!("Conservative threshold:  {}", config.conservative_threshold);
            println!("Turbulence threshold:    {}", config.turbulence_threshold);
            println!("Kelly reward/risk:       {}", config.kelly_reward_risk);
            println!("VaR confidence level:    {}", config.confidence_level);
            println!("ATR period:              {} bars", config.atr_period);
        }
    }

    Ok(())
}

/// Wire the Alpaca clients and sentiment service into a bot.
async fn build_bot(
    cli: &Cli,
    interval: u64,
    lookback: i64,
    dry_run: bool,
) -> Result<Bot<AlpacaDataClient, SentimentClient, AlpacaBrokerClient>> {
    let credentials = AlpacaCredentials::from_env()?;

    let market = AlpacaDataClient::new(credentials.clone())?;
    let sentiment = SentimentClient::new(
        AlpacaDataClient::new(credentials.clone())?,
        cli.sentiment_url.clone(),
    )?;
    let broker = AlpacaBrokerClient::new(credentials)?;

    let config = BotConfig {
        symbol: cli.symbol.clone(),
        poll_interval_secs: interval,
        dry_run,
        lookback_days: lookback,
        ..BotConfig::default()
    };

    Bot::new(config, market, sentiment, broker).await
}
