use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::api::PriceFeed;
use crate::errors::FeedError;
use crate::models::{
    Pair, Quote, Signal, SignalAction, StrategyKind, Trade, TradeSide, TradeStatus,
};

/// Confidence attached to the signal documenting an executed trade
pub const EXECUTION_SIGNAL_CONFIDENCE: u8 = 75;

/// Everything a successful simulated execution produced
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub trade: Trade,
    pub quote: Quote,
    /// Quote-token price per base unit implied by the quote
    pub execution_price: f64,
    /// "Last signal" documenting the executed action
    pub signal: Signal,
}

/// Simulates trade execution against feed quotes
///
/// Execution never touches session state: it awaits a quote and returns a report,
/// and the caller records it. A quote failure produces no trade.
pub struct TradeExecutor {
    feed: Arc<dyn PriceFeed>,
    pair: Pair,
    strategy: StrategyKind,
    fee_rate: f64,
    slippage_bps: u16,
}

impl TradeExecutor {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        pair: Pair,
        strategy: StrategyKind,
        fee_rate: f64,
        slippage_bps: u16,
    ) -> Self {
        Self {
            feed,
            pair,
            strategy,
            fee_rate,
            slippage_bps,
        }
    }

    /// Buying spends the quote token for the base token; selling spends the base
    fn swap_direction(&self, side: TradeSide) -> (&str, &str) {
        match side {
            TradeSide::Buy => (&self.pair.quote, &self.pair.base),
            TradeSide::Sell => (&self.pair.base, &self.pair.quote),
        }
    }

    /// Simulated realized P&L: a flat fee-rate gain on sells, nothing on buys
    pub fn trade_pnl(&self, side: TradeSide, amount: f64) -> f64 {
        match side {
            TradeSide::Buy => 0.0,
            TradeSide::Sell => amount * self.fee_rate,
        }
    }

    pub fn execution_signal(&self, side: TradeSide) -> Signal {
        let verb = match side {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        };
        Signal {
            action: SignalAction::from(side),
            confidence: EXECUTION_SIGNAL_CONFIDENCE,
            reason: format!("{} signal generated based on {} strategy", verb, self.strategy),
        }
    }

    /// Request a quote and build the resulting trade
    ///
    /// `current_price` is the last sampled pair price and is recorded on the trade
    /// as-is (None if nothing has been sampled yet).
    pub async fn execute(
        &self,
        side: TradeSide,
        amount: f64,
        current_price: Option<f64>,
    ) -> Result<ExecutionReport, FeedError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(FeedError::InvalidResponse(format!(
                "trade amount must be positive, got {}",
                amount
            )));
        }

        let (input, output) = self.swap_direction(side);
        let quote = self
            .feed
            .quote(input, output, amount, self.slippage_bps)
            .await?;

        let execution_price = match side {
            TradeSide::Sell => quote.price,
            TradeSide::Buy if quote.price > 0.0 => 1.0 / quote.price,
            TradeSide::Buy => 0.0,
        };

        let trade = Trade {
            id: Uuid::new_v4(),
            pair: self.pair.clone(),
            side,
            amount,
            price: current_price,
            timestamp: Utc::now(),
            status: TradeStatus::Completed,
            pnl: self.trade_pnl(side, amount),
        };

        tracing::info!(
            pair = %self.pair,
            side = %side,
            amount,
            execution_price,
            pnl = trade.pnl,
            "💹 Simulated trade executed"
        );

        Ok(ExecutionReport {
            signal: self.execution_signal(side),
            trade,
            quote,
            execution_price,
        })
    }
}
