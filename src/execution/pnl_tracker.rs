use std::collections::VecDeque;

use crate::models::{Signal, Trade};

/// Session trade history and running realized P&L
///
/// History is newest-first and never truncated within a session.
#[derive(Debug, Default)]
pub struct PnLTracker {
    trades: VecDeque<Trade>,
    total_pnl: f64,
    last_signal: Option<Signal>,
}

impl PnLTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, trade: Trade, signal: Signal) {
        self.total_pnl += trade.pnl;
        tracing::info!(
            trade_id = %trade.id,
            pnl = trade.pnl,
            total_pnl = self.total_pnl,
            "Trade recorded"
        );
        self.trades.push_front(trade);
        self.last_signal = Some(signal);
    }

    /// Newest first
    pub fn trades(&self) -> Vec<Trade> {
        self.trades.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Trade> {
        self.trades.front()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    pub fn total_pnl(&self) -> f64 {
        self.total_pnl
    }

    pub fn last_signal(&self) -> Option<&Signal> {
        self.last_signal.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pair, SignalAction, TradeSide, TradeStatus};
    use chrono::Utc;
    use uuid::Uuid;

    fn trade(side: TradeSide, pnl: f64) -> Trade {
        Trade {
            id: Uuid::new_v4(),
            pair: Pair::new("SOL", "USDC"),
            side,
            amount: 1.0,
            price: Some(150.0),
            timestamp: Utc::now(),
            status: TradeStatus::Completed,
            pnl,
        }
    }

    fn signal(action: SignalAction) -> Signal {
        Signal {
            action,
            confidence: 75,
            reason: "test".to_string(),
        }
    }

    #[test]
    fn test_history_is_newest_first() {
        let mut tracker = PnLTracker::new();
        let first = trade(TradeSide::Buy, 0.0);
        let second = trade(TradeSide::Sell, 0.02);
        let (first_id, second_id) = (first.id, second.id);

        tracker.record(first, signal(SignalAction::Buy));
        tracker.record(second, signal(SignalAction::Sell));

        let ids: Vec<_> = tracker.trades().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second_id, first_id]);
        assert_eq!(tracker.latest().unwrap().id, second_id);
        assert_eq!(tracker.last_signal().unwrap().action, SignalAction::Sell);
    }

    #[test]
    fn test_pnl_accumulates() {
        let mut tracker = PnLTracker::new();
        tracker.record(trade(TradeSide::Sell, 0.04), signal(SignalAction::Sell));
        tracker.record(trade(TradeSide::Buy, 0.0), signal(SignalAction::Buy));
        tracker.record(trade(TradeSide::Sell, 0.02), signal(SignalAction::Sell));

        assert!((tracker.total_pnl() - 0.06).abs() < 1e-12);
        assert_eq!(tracker.trade_count(), 3);
    }

    #[test]
    fn test_empty_tracker() {
        let tracker = PnLTracker::new();
        assert_eq!(tracker.total_pnl(), 0.0);
        assert!(tracker.latest().is_none());
        assert!(tracker.last_signal().is_none());
    }
}
