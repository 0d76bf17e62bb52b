use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use tokio::sync::broadcast::error::RecvError;

use tradeguard::api::{JupiterClient, PriceFeed, StaticPriceFeed};
use tradeguard::config::SessionConfig;
use tradeguard::models::{Signal, StrategyConfig, StrategyKind, TradeSide};
use tradeguard::session::{Session, SessionEvent};
use tradeguard::strategy::{preset, SignalGenerator, TechnicalEvaluator};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    MeanReversion,
    BreakoutMomentum,
    RangeScalping,
    MultiIndicator,
}

impl From<StrategyArg> for StrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::MeanReversion => StrategyKind::MeanReversion,
            StrategyArg::BreakoutMomentum => StrategyKind::BreakoutMomentum,
            StrategyArg::RangeScalping => StrategyKind::RangeScalping,
            StrategyArg::MultiIndicator => StrategyKind::MultiIndicator,
        }
    }
}

#[derive(Parser)]
#[command(name = "tradeguard")]
#[command(about = "Market safety monitor and signal bot for a single trading pair", long_about = None)]
struct Cli {
    /// Trading pair, BASE/QUOTE
    #[arg(short, long, default_value = "SOL/USDC")]
    pair: String,

    /// Strategy family
    #[arg(short, long, value_enum, default_value_t = StrategyArg::MeanReversion)]
    strategy: StrategyArg,

    /// Strategy JSON file (overrides --strategy and --amount)
    #[arg(long)]
    strategy_file: Option<PathBuf>,

    /// Trade amount in base units
    #[arg(short, long, default_value_t = 1.0)]
    amount: f64,

    /// Use the live Jupiter quote API instead of demo prices
    #[arg(long)]
    live: bool,

    /// Seed for reproducible signals
    #[arg(long)]
    seed: Option<u64>,

    /// Vote with the strategy's indicators instead of the plain policy
    #[arg(long)]
    informed: bool,

    /// Execute simulated trades on generated signals
    #[arg(long)]
    auto_trade: bool,

    /// Minimum signal confidence for auto-trading
    #[arg(long, default_value_t = 80)]
    min_confidence: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = SessionConfig::load()?;

    tracing::info!("🚀 TradeGuard starting");

    let feed: Arc<dyn PriceFeed> = if cli.live {
        tracing::info!("  Mode: LIVE (Jupiter quotes, simulated execution)");
        Arc::new(JupiterClient::new())
    } else {
        tracing::info!("  Mode: DEMO (static prices)");
        Arc::new(StaticPriceFeed::new())
    };

    let mut generator = match cli.seed {
        Some(seed) => SignalGenerator::seeded(seed),
        None => SignalGenerator::from_entropy(),
    };
    if cli.informed {
        generator = generator.with_evaluator(TechnicalEvaluator);
    }

    let mut session = Session::new(&cli.pair, feed, config)?.with_generator(generator);
    let strategy = load_strategy(&cli, &session)?;
    let amount = strategy.amount;
    session.set_strategy(strategy);

    log_configuration(&session, &cli);

    let mut events = session.subscribe();
    session.start().await?;

    tracing::info!("\nPress Ctrl+C to stop...\n");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("\n⚠️  Received Ctrl+C, shutting down...");
                break;
            }
            received = events.recv() => match received {
                Ok(SessionEvent::SignalGenerated(signal)) => {
                    log_event(&SessionEvent::SignalGenerated(signal.clone()));
                    if cli.auto_trade {
                        auto_trade(&session, &signal, amount, cli.min_confidence).await;
                    }
                }
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event receiver lagged, some events were dropped");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    session.stop();
    log_summary(&session);
    tracing::info!("👋 TradeGuard stopped");
    Ok(())
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tradeguard=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_strategy(cli: &Cli, session: &Session) -> anyhow::Result<StrategyConfig> {
    let Some(path) = &cli.strategy_file else {
        if !(cli.amount.is_finite() && cli.amount > 0.0) {
            bail!("--amount must be positive, got {}", cli.amount);
        }
        return Ok(preset(cli.strategy.into(), session.pair().clone(), cli.amount));
    };

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read strategy file {}", path.display()))?;
    let strategy: StrategyConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid strategy file {}", path.display()))?;

    if !(strategy.amount.is_finite() && strategy.amount > 0.0) {
        bail!("strategy amount must be positive, got {}", strategy.amount);
    }
    Ok(strategy)
}

fn log_configuration(session: &Session, cli: &Cli) {
    let thresholds = session.thresholds();
    let strategy = session.strategy();

    tracing::info!("\n📊 Configuration:");
    tracing::info!("  Pair: {}", session.pair());
    tracing::info!("  Strategy: {} ({} indicators)", strategy.kind, strategy.indicators.len());
    tracing::info!("  Amount: {}", strategy.amount);
    tracing::info!("  Max Price Change: {}%", thresholds.max_price_change_percent);
    tracing::info!("  Max Slippage: {}%", thresholds.max_slippage_percent);
    tracing::info!("  Max Trade Size: {}", thresholds.max_trade_size_sol);
    tracing::info!(
        "  Breaker Timeout: {} min",
        thresholds.circuit_breaker_timeout().as_secs() / 60
    );
    tracing::info!("  Execution Gate: {:?}", session.config().execution_gate);
    if cli.auto_trade {
        tracing::info!("  Auto-trade: on (min confidence {}%)", cli.min_confidence);
    }
}

fn log_event(event: &SessionEvent) {
    match event {
        SessionEvent::PriceUpdated { price } => {
            tracing::debug!(price, "Price updated");
        }
        SessionEvent::ConditionChanged {
            previous,
            current,
            change_pct,
        } => {
            tracing::info!(%previous, %current, change_pct = ?change_pct, "📈 Market condition changed");
        }
        SessionEvent::WarningAdded(warning) => {
            tracing::warn!("⚠️  {}", warning.message);
        }
        SessionEvent::BreakerTripped { reason, reset_in } => {
            tracing::warn!(reason = %reason, reset_in_secs = reset_in.as_secs(), "🛑 Trading halted");
        }
        SessionEvent::BreakerReset => tracing::info!("✅ Trading resumed"),
        SessionEvent::SignalGenerated(signal) => {
            tracing::info!(
                action = %signal.action,
                confidence = signal.confidence,
                reason = %signal.reason,
                "🎯 Signal"
            );
        }
        SessionEvent::TradeRecorded(trade) => {
            tracing::info!(
                side = %trade.side,
                amount = trade.amount,
                pnl = trade.pnl,
                "💰 Trade recorded"
            );
        }
        other => tracing::debug!(event = other.kind(), "Session event"),
    }
}

/// Execute a signal if it clears the confidence bar and the safety checks
async fn auto_trade(session: &Session, signal: &Signal, amount: f64, min_confidence: u8) {
    let Ok(side) = TradeSide::try_from(signal.action) else {
        return;
    };
    if signal.confidence < min_confidence {
        tracing::debug!(confidence = signal.confidence, min_confidence, "Signal below confidence bar");
        return;
    }
    if session.is_circuit_breaker_triggered() {
        tracing::info!("Skipping trade: circuit breaker active");
        return;
    }
    if !session.is_trade_size_safe(amount) {
        tracing::warn!(amount, "Skipping trade: size exceeds maximum");
        return;
    }

    if !session.execute_trade(side, amount).await {
        tracing::warn!(side = %side, amount, "Auto-trade failed");
    }
}

fn log_summary(session: &Session) {
    let trades = session.trades();
    tracing::info!("\n📋 Session summary:");
    tracing::info!("  Trades: {}", trades.len());
    tracing::info!("  Realized P&L: {:.4}", session.pnl());
    tracing::info!("  Safety warnings: {}", session.safety_warnings().len());
    if let Some(signal) = session.last_signal() {
        tracing::info!("  Last executed: {} ({})", signal.action, signal.reason);
    }
}
