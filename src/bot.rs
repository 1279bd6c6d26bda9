//! Bot runner: the scheduling driver around the decision engine.
//!
//! Each cycle fetches fresh bars, price, cash, and sentiment, hands
//! them to the pure decision engine, and acts on the outcome. All I/O
//! and waiting lives here; the engine itself never blocks. A failed
//! cycle is logged and dropped; the next tick starts clean.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::api::{Broker, MarketData, NewsSentiment};
use crate::models::AccountSnapshot;
use crate::trading::{Decision, DecisionEngine, RiskConfig};

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Symbol to trade
    pub symbol: String,

    /// Seconds between decision cycles
    pub poll_interval_secs: u64,

    /// Log decisions instead of submitting orders
    pub dry_run: bool,

    /// Days of daily bars fetched per cycle
    pub lookback_days: i64,

    /// Days of news fed to the sentiment model per cycle
    pub sentiment_window_days: i64,

    /// Risk parameters for the decision engine
    pub risk: RiskConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "SPY".to_string(),
            poll_interval_secs: 21_600, // 6 hours
            dry_run: true,
            lookback_days: 365,
            sentiment_window_days: 3,
            risk: RiskConfig::default(),
        }
    }
}

/// Counters for a bot session.
#[derive(Debug, Clone, Copy, Default)]
pub struct BotStats {
    pub cycles: u64,
    pub orders_submitted: u64,
    pub liquidations: u64,
    pub holds: u64,
    pub failed_cycles: u64,
}

impl std::fmt::Display for BotStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Bot Statistics ===")?;
        writeln!(f, "Cycles:        {}", self.cycles)?;
        writeln!(f, "Orders:        {}", self.orders_submitted)?;
        writeln!(f, "Liquidations:  {}", self.liquidations)?;
        writeln!(f, "Holds:         {}", self.holds)?;
        writeln!(f, "Failed cycles: {}", self.failed_cycles)?;
        Ok(())
    }
}

/// Driver that serializes decision cycles for one symbol.
pub struct Bot<M, N, B> {
    config: BotConfig,
    engine: DecisionEngine,
    market: M,
    sentiment: N,
    broker: B,
    stats: BotStats,
    shutdown: Arc<AtomicBool>,
}

impl<M, N, B> Bot<M, N, B>
where
    M: MarketData,
    N: NewsSentiment,
    B: Broker,
{
    /// Create a bot, anchoring the engine's drawdown baseline at the
    /// account's current cash.
    pub async fn new(config: BotConfig, market: M, sentiment: N, broker: B) -> Result<Self> {
        let initial_cash = broker
            .get_cash()
            .await
            .context("Failed to read initial cash")?;

        let engine = DecisionEngine::new(config.symbol.clone(), config.risk.clone(), initial_cash)?;

        info!(
            symbol = %config.symbol,
            %initial_cash,
            dry_run = config.dry_run,
            "Bot created"
        );

        Ok(Self {
            config,
            engine,
            market,
            sentiment,
            broker,
            stats: BotStats::default(),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get shutdown signal for external control.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn stats(&self) -> BotStats {
        self.stats
    }

    /// Main run loop: one decision cycle per poll interval until
    /// shutdown.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            poll_interval = self.config.poll_interval_secs,
            "Starting bot run loop"
        );

        let mut poll_interval = interval(Duration::from_secs(self.config.poll_interval_secs));

        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
            shutdown.store(true, Ordering::SeqCst);
        });

        while !self.shutdown.load(Ordering::SeqCst) {
            poll_interval.tick().await;

            self.stats.cycles += 1;
            if let Err(e) = self.run_once().await {
                self.stats.failed_cycles += 1;
                error!(error = %e, "Cycle failed, no order emitted");
            }
        }

        info!("Bot stopped");
        Ok(())
    }

    /// One decision cycle: fetch, decide, act.
    ///
    /// Any fetch or engine error aborts the cycle before an order can
    /// be built; the decision core is never run on partial inputs.
    pub async fn run_once(&mut self) -> Result<Decision> {
        let now = Utc::now();

        let bars = self
            .market
            .get_bars(
                &self.config.symbol,
                "1Day",
                now - chrono::Duration::days(self.config.lookback_days),
                now,
            )
            .await
            .context("Market data fetch failed")?;

        let last_price = self
            .market
            .get_last_price(&self.config.symbol)
            .await
            .context("Last price fetch failed")?;

        let cash = self.broker.get_cash().await.context("Cash fetch failed")?;

        let signal = self
            .sentiment
            .get_sentiment(
                &self.config.symbol,
                now - chrono::Duration::days(self.config.sentiment_window_days),
                now,
            )
            .await
            .context("Sentiment fetch failed")?;

        let account = AccountSnapshot { cash, last_price };

        debug!(
            bars = bars.len(),
            %cash,
            %last_price,
            probability = signal.probability,
            label = signal.label.as_str(),
            "Cycle inputs ready"
        );

        let decision = self.engine.decide(&bars, &signal, &account)?;
        self.act(&decision).await?;

        Ok(decision)
    }

    /// Carry out a decision against the broker.
    async fn act(&mut self, decision: &Decision) -> Result<()> {
        match decision {
            Decision::Hold { reason } => {
                self.stats.holds += 1;
                debug!(?reason, "Holding");
            }
            Decision::Liquidate { turbulence } => {
                self.stats.liquidations += 1;
                warn!(turbulence, "Halting and liquidating");

                if self.config.dry_run {
                    info!(symbol = %self.config.symbol, "[DRY RUN] Would liquidate");
                } else {
                    self.broker.liquidate_all(&self.config.symbol).await?;
                }
            }
            Decision::Enter(intent) => {
                if self.config.dry_run {
                    info!(
                        symbol = %intent.symbol,
                        side = intent.side.as_str(),
                        quantity = intent.quantity,
                        take_profit = %intent.take_profit,
                        stop_loss = %intent.stop_loss,
                        "[DRY RUN] Would submit bracket order"
                    );
                } else {
                    let ack = self.broker.submit_order(intent).await?;
                    info!(order_id = %ack.order_id, status = %ack.status, "Order submitted");
                }
                self.stats.orders_submitted += 1;
            }
        }

        Ok(())
    }
}
