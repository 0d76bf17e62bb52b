use std::time::Duration;

use crate::models::{MarketCondition, Pair, SafetyWarning, Signal, Trade};

/// State-change notifications published by a running session
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SessionStarted {
        pair: Pair,
    },
    SessionStopped {
        pair: Pair,
    },
    PriceUpdated {
        price: f64,
    },
    ConditionChanged {
        previous: MarketCondition,
        current: MarketCondition,
        change_pct: Option<f64>,
    },
    WarningAdded(SafetyWarning),
    BreakerTripped {
        reason: String,
        reset_in: Duration,
    },
    BreakerReset,
    SignalGenerated(Signal),
    TradeRecorded(Trade),
}

impl SessionEvent {
    /// Short name for log lines
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::SessionStopped { .. } => "session_stopped",
            SessionEvent::PriceUpdated { .. } => "price_updated",
            SessionEvent::ConditionChanged { .. } => "condition_changed",
            SessionEvent::WarningAdded(_) => "warning_added",
            SessionEvent::BreakerTripped { .. } => "breaker_tripped",
            SessionEvent::BreakerReset => "breaker_reset",
            SessionEvent::SignalGenerated(_) => "signal_generated",
            SessionEvent::TradeRecorded(_) => "trade_recorded",
        }
    }
}
