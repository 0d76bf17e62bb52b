// Market condition monitoring
pub mod market_condition;

pub use market_condition::{
    classify_change, ConditionUpdate, MarketConditionMonitor, EXTREME_VOLATILITY_REASON,
    FEED_FAILURE_REASON, VOLATILITY_WARNING,
};
